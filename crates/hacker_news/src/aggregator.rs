use std::collections::BTreeMap;
use std::sync::Arc;

use common::{PageSource, ScraperError, ScraperResult};
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::cache::{Page, PageCache};
use crate::extractor::extract_stories;
use crate::models::Story;

/// Collects pages `1..=count`, serving from the cache where it can and
/// fetching the rest concurrently.
pub struct Aggregator {
    source: Arc<dyn PageSource>,
    cache: Arc<PageCache>,
}

impl Aggregator {
    pub fn new(source: Arc<dyn PageSource>) -> Self {
        Self::with_cache(source, Arc::new(PageCache::new()))
    }

    pub fn with_cache(source: Arc<dyn PageSource>, cache: Arc<PageCache>) -> Self {
        Self { source, cache }
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    /// `count` is not capped: every missing page gets its own task up front, so
    /// a request like `count = u32::MAX` allocates billions of page numbers and
    /// tasks before any fetch completes. Callers exposed to untrusted input are
    /// responsible for bounding it.
    pub async fn get_pages(&self, count: u32) -> ScraperResult<Vec<Story>> {
        let mut pages: BTreeMap<u32, Page> = BTreeMap::new();
        let mut missing = Vec::new();

        for page in 1..=count {
            match self.cache.get(page) {
                Some(stories) => {
                    pages.insert(page, stories);
                }
                None => missing.push(page),
            }
        }

        if !missing.is_empty() {
            info!(
                "Fetching {} of {} pages from {} ({} cached)",
                missing.len(),
                count,
                self.source.name(),
                pages.len()
            );

            // Each task returns the page number it was launched for; completion order is irrelevant.
            let mut tasks = JoinSet::new();
            for page in missing {
                let source = Arc::clone(&self.source);
                tasks.spawn(async move { (page, fetch_and_extract(source.as_ref(), page).await) });
            }

            // Returning early drops the JoinSet, which aborts the fetches still in flight.
            while let Some(joined) = tasks.join_next().await {
                let (page, result) = joined.map_err(|e| {
                    ScraperError::Upstream(format!("page fetch task failed: {}", e))
                })?;

                let stories = result.map_err(|e| {
                    warn!("Page {} failed: {}", page, e);
                    e
                })?;

                let cached = self.cache.put(page, Arc::new(stories));
                pages.insert(page, cached);
            }
        }

        let mut stories = Vec::with_capacity(pages.values().map(|p| p.len()).sum());
        for page in pages.values() {
            stories.extend(page.iter().cloned());
        }
        Ok(stories)
    }
}

async fn fetch_and_extract(source: &dyn PageSource, page: u32) -> ScraperResult<Vec<Story>> {
    let html = source.fetch_page(page).await?;
    let stories = extract_stories(&html)?;
    info!("Extracted {} stories from page {}", stories.len(), page);
    Ok(stories)
}
