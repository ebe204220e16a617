use async_trait::async_trait;
use common::config::HackerNewsConfig;
use common::{PageSource, ScraperError, ScraperResult};
use reqwest::Client;
use tracing::{info, warn};

/// Fetches listing pages from the Hacker News front page.
#[derive(Clone)]
pub struct HackerNewsAPI {
    client: Client,
    base_url: String,
}

impl HackerNewsAPI {
    pub fn new(config: &HackerNewsConfig) -> ScraperResult<Self> {
        let mut builder = Client::builder();
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn page_url(&self, page: u32) -> String {
        format!("{}/news?p={}", self.base_url, page)
    }
}

#[async_trait]
impl PageSource for HackerNewsAPI {
    async fn fetch_page(&self, page: u32) -> ScraperResult<String> {
        let url = self.page_url(page);
        info!("Fetching listing page: {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!("Request to {} failed: {}", url, e);
            ScraperError::upstream(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("{} responded with {}", url, status);
            return Err(ScraperError::Upstream(format!("{} responded with {}", url, status)));
        }

        response.text().await.map_err(ScraperError::upstream)
    }

    fn name(&self) -> &'static str {
        "Hacker News"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answers a single HTTP request on a local port with `response`, then closes.
    async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                    let headers = String::from_utf8_lossy(&request[..end]).to_lowercase();
                    let body_len = headers
                        .lines()
                        .find_map(|line| line.strip_prefix("content-length:"))
                        .and_then(|len| len.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if request.len() >= end + 4 + body_len {
                        break;
                    }
                }
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{}", addr)
    }

    #[test]
    fn page_url_appends_query() {
        let api = HackerNewsAPI::new(&HackerNewsConfig::default()).unwrap();
        assert_eq!(api.page_url(1), "https://news.ycombinator.com/news?p=1");
        assert_eq!(api.page_url(12), "https://news.ycombinator.com/news?p=12");
    }

    #[test]
    fn trailing_slash_on_base_is_ignored() {
        let config = HackerNewsConfig {
            base_url: "http://127.0.0.1:9999/".to_string(),
            user_agent: Some("hn-scraper-test".to_string()),
        };
        let api = HackerNewsAPI::new(&config).unwrap();
        assert_eq!(api.page_url(2), "http://127.0.0.1:9999/news?p=2");
    }

    fn api_for(base_url: String) -> HackerNewsAPI {
        HackerNewsAPI::new(&HackerNewsConfig {
            base_url,
            user_agent: None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn error_status_is_an_upstream_error_with_the_status() {
        let base_url = serve_once(
            "HTTP/1.1 503 Service Unavailable\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
        )
        .await;
        let api = api_for(base_url);

        let err = api.fetch_page(3).await.unwrap_err();
        match err {
            ScraperError::Upstream(detail) => {
                assert!(detail.contains("503"), "{}", detail);
                assert!(detail.contains("/news?p=3"), "{}", detail);
            }
            other => panic!("expected upstream error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn success_returns_the_body() {
        let base_url = serve_once(
            "HTTP/1.1 200 OK\r\ncontent-type: text/html\r\ncontent-length: 22\r\nconnection: close\r\n\r\n<table>listing</table>",
        )
        .await;
        let api = api_for(base_url);

        assert_eq!(api.fetch_page(1).await.unwrap(), "<table>listing</table>");
    }

    #[tokio::test]
    async fn unreachable_upstream_is_an_upstream_error() {
        let config = HackerNewsConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            user_agent: None,
        };
        let api = HackerNewsAPI::new(&config).unwrap();

        let err = api.fetch_page(1).await.unwrap_err();
        assert!(matches!(err, ScraperError::Upstream(_)));
    }
}
