pub mod error;

use std::sync::Arc;

use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use classifier::{Classification, ClassificationForwarder};
use common::{CompletionClient, PageSource};
use hacker_news::{Aggregator, Story};
use tower_http::trace::TraceLayer;

use crate::error::{ApiError, ErrorBody};

pub const SERVICE_TITLE: &str = "Hacker News Scraper API";

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
    pub forwarder: Arc<ClassificationForwarder>,
}

impl AppState {
    pub fn new(
        source: Arc<dyn PageSource>,
        client: Arc<dyn CompletionClient>,
        temperature: f32,
    ) -> Self {
        let aggregator = Arc::new(Aggregator::new(source));
        let forwarder = Arc::new(ClassificationForwarder::new(
            Arc::clone(&aggregator),
            client,
            temperature,
        ));
        Self {
            aggregator,
            forwarder,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(front_page))
        .route("/:number", get(pages))
        .route("/ai/classify/:pages", get(classify))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn front_page(State(state): State<AppState>) -> Result<Json<Vec<Story>>, ApiError> {
    Ok(Json(state.aggregator.get_pages(1).await?))
}

async fn pages(
    State(state): State<AppState>,
    number: Result<Path<u32>, PathRejection>,
) -> Result<Json<Vec<Story>>, ApiError> {
    let Path(number) = number?;
    Ok(Json(state.aggregator.get_pages(number).await?))
}

async fn classify(
    State(state): State<AppState>,
    pages: Result<Path<u32>, PathRejection>,
) -> Result<Json<Classification>, ApiError> {
    let Path(pages) = pages?;
    Ok(Json(state.forwarder.classify(pages).await?))
}

async fn not_found() -> (StatusCode, Json<ErrorBody>) {
    (StatusCode::NOT_FOUND, Json(ErrorBody::new("Not Found")))
}
