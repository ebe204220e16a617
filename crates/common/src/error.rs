use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Error while loading Hacker News: {0}")]
    Upstream(String),

    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    #[error("HTML parsing failed: {0}")]
    HtmlParse(String),

    #[error("Classification failed: {0}")]
    Classification(String),
}

impl ScraperError {
    /// Transport failures talking to the listing site count as upstream errors.
    pub fn upstream(err: impl std::fmt::Display) -> Self {
        ScraperError::Upstream(err.to_string())
    }
}

pub type ScraperResult<T> = Result<T, ScraperError>;
