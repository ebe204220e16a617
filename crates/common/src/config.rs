use std::env;
use anyhow::{Context, Result};

pub const DEFAULT_HN_BASE_URL: &str = "https://news.ycombinator.com";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

#[derive(Debug, Clone)]
pub struct HackerNewsConfig {
    pub base_url: String,
    pub user_agent: Option<String>,
}

impl Default for HackerNewsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_HN_BASE_URL.to_string(),
            user_agent: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            temperature: 0.3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub hacker_news: HackerNewsConfig,
    pub openai: OpenAiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            hacker_news: HackerNewsConfig::default(),
            openai: OpenAiConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let hacker_news = HackerNewsConfig {
            base_url: non_empty("HN_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_HN_BASE_URL.to_string()),
            user_agent: non_empty("HN_USER_AGENT"),
        };

        let temperature = match non_empty("CLASSIFY_TEMPERATURE") {
            Some(raw) => raw
                .parse::<f32>()
                .with_context(|| format!("CLASSIFY_TEMPERATURE must be a number, got {:?}", raw))?,
            None => 0.3,
        };

        let openai = OpenAiConfig {
            api_key: non_empty("OPENAI_API_KEY"),
            base_url: non_empty("OPENAI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            model: non_empty("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            temperature,
        };

        Ok(Config {
            bind_addr: non_empty("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            hacker_news,
            openai,
        })
    }

    pub fn require_openai_api_key(&self) -> Result<&String> {
        self.openai
            .api_key
            .as_ref()
            .context("OPENAI_API_KEY must be set")
    }
}
