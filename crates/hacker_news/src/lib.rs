pub mod aggregator;
pub mod api;
pub mod cache;
pub mod extractor;
pub mod models;

pub use aggregator::Aggregator;
pub use api::HackerNewsAPI;
pub use cache::{Page, PageCache};
pub use extractor::extract_stories;
pub use models::Story;
