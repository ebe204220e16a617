pub mod config;
pub mod error;
pub mod source;

pub use config::Config;
pub use error::{ScraperError, ScraperResult};
pub use source::{ChatMessage, CompletionClient, PageSource};
