use axum::{
    extract::rejection::PathRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::ScraperError;
use serde::Serialize;

pub const UPSTREAM_DETAIL: &str = "Error while loading Hacker News";

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Everything a handler can fail with. Each variant renders as `{"detail": ..}`.
#[derive(Debug)]
pub enum ApiError {
    InvalidRequest(String),
    Scraper(ScraperError),
}

impl From<ScraperError> for ApiError {
    fn from(err: ScraperError) -> Self {
        ApiError::Scraper(err)
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Scraper(
                ScraperError::Upstream(_) | ScraperError::HttpRequest(_) | ScraperError::HtmlParse(_),
            ) => (StatusCode::INTERNAL_SERVER_ERROR, UPSTREAM_DETAIL.to_string()),
            ApiError::Scraper(ScraperError::Classification(msg)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(ErrorBody::new(detail))).into_response()
    }
}
