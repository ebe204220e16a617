use crate::models::Story;
use common::{ScraperError, ScraperResult};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

struct Selectors {
    item: Selector,
    title: Selector,
    subtext: Selector,
    score: Selector,
    user: Selector,
    span: Selector,
    anchor: Selector,
}

impl Selectors {
    fn new() -> ScraperResult<Self> {
        let parse = |css: &str| {
            Selector::parse(css).map_err(|e| {
                ScraperError::HtmlParse(format!("Failed to parse selector '{}': {}", css, e))
            })
        };

        Ok(Self {
            item: parse(".athing")?,
            title: parse(".titleline a")?,
            subtext: parse(".subtext")?,
            score: parse(".score")?,
            user: parse(".hnuser")?,
            span: parse("span")?,
            anchor: parse("a")?,
        })
    }
}

/// Parses one listing page into stories, in the order they appear.
///
/// Rows without a title link or without a metadata row are skipped.
pub fn extract_stories(html: &str) -> ScraperResult<Vec<Story>> {
    let selectors = Selectors::new()?;
    let document = Html::parse_document(html);

    let mut stories = Vec::new();
    let mut skipped = 0usize;

    for item in document.select(&selectors.item) {
        match extract_story(item, &selectors) {
            Some(story) => stories.push(story),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!("Skipped {} incomplete items", skipped);
    }
    Ok(stories)
}

fn extract_story(item: ElementRef<'_>, selectors: &Selectors) -> Option<Story> {
    let title_link = item.select(&selectors.title).next()?;
    let subtext = next_row(item)?.select(&selectors.subtext).next()?;
    let url = title_link.attr("href")?.to_string();

    let points = subtext
        .select(&selectors.score)
        .next()
        .map(|score| parse_points(&text_of(score)))
        .unwrap_or(0);

    let sent_by = subtext
        .select(&selectors.user)
        .next()
        .map(|user| text_of(user).trim().to_string());

    let published = subtext
        .select(&selectors.span)
        .last()
        .map(|span| text_of(span).trim().to_string());

    let comments = subtext
        .select(&selectors.anchor)
        .last()
        .map(|anchor| parse_comments(&text_of(anchor)))
        .unwrap_or(0);

    Some(Story {
        title: text_of(title_link),
        url,
        points,
        sent_by,
        published,
        comments,
    })
}

/// The metadata for an item lives in the next `tr` after it.
fn next_row(item: ElementRef<'_>) -> Option<ElementRef<'_>> {
    item.next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| sibling.value().name() == "tr")
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

/// "123 points" -> 123. Anything without a leading number is 0.
pub(crate) fn parse_points(text: &str) -> u32 {
    let digits = text
        .trim()
        .trim_end_matches(|c: char| !c.is_ascii_digit());
    parse_count(digits)
}

/// "42&nbsp;comments" -> 42, "discuss" -> 0.
pub(crate) fn parse_comments(text: &str) -> u32 {
    if !text.contains("comment") {
        return 0;
    }

    let cleaned = text
        .replace("comments", "")
        .replace("comment", "")
        .replace('\u{a0}', "");
    parse_count(cleaned.trim())
}

fn parse_count(text: &str) -> u32 {
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return 0;
    }
    text.parse().unwrap_or(0)
}
