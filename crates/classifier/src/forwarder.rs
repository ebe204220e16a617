use std::sync::Arc;

use common::{ChatMessage, CompletionClient, ScraperResult};
use hacker_news::{Aggregator, Story};
use serde::Serialize;
use tracing::{info, warn};

pub const SAMPLE_SIZE: usize = 5;
pub const SCHEMA_VERSION: u32 = 1;
pub const SYSTEM_PROMPT: &str = "Classify Hacker News articles by category.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub model: String,
    pub total: usize,
    pub schema_version: u32,
    pub items: serde_json::Value,
}

/// Sends the top stories of an aggregation to a completion model.
pub struct ClassificationForwarder {
    aggregator: Arc<Aggregator>,
    client: Arc<dyn CompletionClient>,
    temperature: f32,
}

impl ClassificationForwarder {
    pub fn new(aggregator: Arc<Aggregator>, client: Arc<dyn CompletionClient>, temperature: f32) -> Self {
        Self {
            aggregator,
            client,
            temperature,
        }
    }

    pub async fn classify(&self, pages: u32) -> ScraperResult<Classification> {
        let stories = self.aggregator.get_pages(pages).await?;
        let sample = &stories[..stories.len().min(SAMPLE_SIZE)];
        let prompt = build_prompt(sample);

        info!(
            "Classifying {} of {} stories with {}",
            sample.len(),
            stories.len(),
            self.client.model()
        );

        let items = self
            .client
            .complete(&prompt, self.temperature)
            .await
            .map_err(|e| {
                warn!("Classification request failed: {}", e);
                e
            })?;

        Ok(Classification {
            model: self.client.model().to_string(),
            total: sample.len(),
            schema_version: SCHEMA_VERSION,
            items,
        })
    }
}

pub fn build_prompt(stories: &[Story]) -> Vec<ChatMessage> {
    std::iter::once(ChatMessage::system(SYSTEM_PROMPT))
        .chain(
            stories
                .iter()
                .enumerate()
                .map(|(index, story)| ChatMessage::user(story.to_prompt_entry(index))),
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use common::{PageSource, ScraperError};
    use std::sync::Mutex;

    struct FixedSource {
        per_page: usize,
    }

    #[async_trait]
    impl PageSource for FixedSource {
        async fn fetch_page(&self, page: u32) -> ScraperResult<String> {
            let rows: String = (0..self.per_page)
                .map(|i| {
                    format!(
                        r#"<tr class="athing"><td><span class="titleline"><a href="https://example.com/{page}/{i}">Story {page}.{i}</a></span></td></tr>
                           <tr><td class="subtext"><span class="score">{i}0 points</span> <a>{i}&nbsp;comments</a></td></tr>"#
                    )
                })
                .collect();
            Ok(format!("<table>{}</table>", rows))
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    #[derive(Default)]
    struct RecordingClient {
        fail: bool,
        seen: Mutex<Vec<(Vec<ChatMessage>, f32)>>,
    }

    #[async_trait]
    impl CompletionClient for RecordingClient {
        fn model(&self) -> &str {
            "fake-model"
        }

        async fn complete(
            &self,
            messages: &[ChatMessage],
            temperature: f32,
        ) -> ScraperResult<serde_json::Value> {
            self.seen.lock().unwrap().push((messages.to_vec(), temperature));
            if self.fail {
                return Err(ScraperError::Classification("Request failed: 401".to_string()));
            }
            Ok(serde_json::json!({"role": "assistant", "content": "Mocked classification"}))
        }
    }

    fn forwarder(per_page: usize, client: Arc<RecordingClient>) -> ClassificationForwarder {
        let aggregator = Arc::new(Aggregator::new(Arc::new(FixedSource { per_page })));
        ClassificationForwarder::new(aggregator, client, 0.3)
    }

    #[tokio::test]
    async fn sends_top_five_and_returns_raw_message() {
        let client = Arc::new(RecordingClient::default());
        let forwarder = forwarder(4, client.clone());

        let result = forwarder.classify(2).await.unwrap();
        assert_eq!(result.model, "fake-model");
        assert_eq!(result.total, 5);
        assert_eq!(result.schema_version, 1);
        assert_eq!(result.items["content"], "Mocked classification");

        let seen = client.seen.lock().unwrap();
        let (messages, temperature) = &seen[0];
        assert_eq!(*temperature, 0.3);
        assert_eq!(messages.len(), 6);
        assert_eq!(messages[0], ChatMessage::system(SYSTEM_PROMPT));

        let fifth: serde_json::Value = serde_json::from_str(&messages[5].content).unwrap();
        assert_eq!(messages[5].role, "user");
        assert_eq!(fifth["index"], 4);
        assert_eq!(fifth["title"], "Story 2.0");
        assert_eq!(fifth["url"], "https://example.com/2/0");
    }

    #[tokio::test]
    async fn small_aggregations_send_what_there_is() {
        let client = Arc::new(RecordingClient::default());
        let forwarder = forwarder(3, client.clone());

        let result = forwarder.classify(1).await.unwrap();
        assert_eq!(result.total, 3);
        assert_eq!(client.seen.lock().unwrap()[0].0.len(), 4);
    }

    #[tokio::test]
    async fn completion_failure_is_surfaced() {
        let client = Arc::new(RecordingClient {
            fail: true,
            ..Default::default()
        });
        let forwarder = forwarder(2, client);

        let err = forwarder.classify(1).await.unwrap_err();
        assert!(matches!(err, ScraperError::Classification(_)));
    }

    #[test]
    fn prompt_for_no_stories_is_just_the_instruction() {
        assert_eq!(build_prompt(&[]), vec![ChatMessage::system(SYSTEM_PROMPT)]);
    }
}
