use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ScraperResult;

/// Something that can hand back the raw markup of a numbered listing page.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, page: u32) -> ScraperResult<String>;
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A chat-completion capability: role-tagged messages and a temperature in,
/// the first returned message out, untouched.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    fn model(&self) -> &str;

    async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> ScraperResult<serde_json::Value>;
}
