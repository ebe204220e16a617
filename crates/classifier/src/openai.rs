use async_trait::async_trait;
use common::config::OpenAiConfig;
use common::{ChatMessage, CompletionClient, ScraperError, ScraperResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: serde_json::Value,
}

/// Chat-completions client for OpenAI-compatible endpoints.
pub struct OpenAiClient {
    http_client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    /// A missing key is allowed here; requests fail until one is configured.
    pub fn new(config: &OpenAiConfig) -> Self {
        Self {
            http_client: Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> ScraperResult<serde_json::Value> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ScraperError::Classification("OPENAI_API_KEY must be set".to_string()))?;

        let body = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature,
        };

        info!("Requesting completion from {} ({} messages)", self.model, messages.len());
        let res = self
            .http_client
            .post(self.completions_url())
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| ScraperError::Classification(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            warn!("Completion request failed: {} - {}", status, text);
            return Err(ScraperError::Classification(format!(
                "Request failed: {} - {}",
                status, text
            )));
        }

        let resp: ChatCompletionResponse = res
            .json()
            .await
            .map_err(|e| ScraperError::Classification(e.to_string()))?;

        resp.choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| ScraperError::Classification("completion returned no choices".to_string()))
    }
}
