use analysis_core::{AnalysisError, ArticleSource, RawArticle};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

const DEFAULT_RSS_URL: &str = "https://news.google.com/rss/search";
const MAX_ATTEMPTS: u32 = 3;
const SLOT_SLACK: Duration = Duration::from_millis(50);

/// Send times of recent feed requests; admits at most `capacity` per `window`.
struct RequestWindow {
    sent: Mutex<VecDeque<Instant>>,
    capacity: usize,
    window: Duration,
}

impl RequestWindow {
    fn new(capacity: usize, window: Duration) -> Self {
        Self {
            sent: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity: capacity.max(1),
            window,
        }
    }

    /// Records a send and returns `None`, or returns how long until a slot frees up.
    async fn try_claim(&self) -> Option<Duration> {
        let mut sent = self.sent.lock().await;
        let now = Instant::now();
        sent.retain(|&at| now.duration_since(at) < self.window);

        if sent.len() < self.capacity {
            sent.push_back(now);
            return None;
        }
        let oldest = sent.front().copied().unwrap_or(now);
        Some((oldest + self.window).saturating_duration_since(now) + SLOT_SLACK)
    }

    async fn wait_turn(&self) {
        while let Some(wait) = self.try_claim().await {
            tracing::debug!("News feed window full, waiting {:.1}s", wait.as_secs_f64());
            tokio::time::sleep(wait).await;
        }
    }
}

/// Settings for the RSS news search
#[derive(Debug, Clone)]
pub struct NewsClientConfig {
    pub base_url: String,
    /// Interface language, region and edition query parameters
    pub hl: String,
    pub gl: String,
    pub ceid: String,
    /// Requests per minute
    pub rate_limit: usize,
    pub timeout: Duration,
    /// Pause before retrying a 429 response
    pub retry_wait: Duration,
}

impl Default for NewsClientConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var("NEWS_RSS_BASE_URL").unwrap_or_else(|_| DEFAULT_RSS_URL.to_string()),
            hl: std::env::var("NEWS_HL").unwrap_or_else(|_| "en-IN".to_string()),
            gl: std::env::var("NEWS_GL").unwrap_or_else(|_| "IN".to_string()),
            ceid: std::env::var("NEWS_CEID").unwrap_or_else(|_| "IN:en".to_string()),
            rate_limit: std::env::var("NEWS_RATE_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            timeout: Duration::from_secs(15),
            retry_wait: Duration::from_secs(5),
        }
    }
}

/// Company news from the Google News RSS search feed
pub struct GoogleNewsClient {
    config: NewsClientConfig,
    client: Client,
    window: RequestWindow,
}

impl GoogleNewsClient {
    pub fn new(config: NewsClientConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        let window = RequestWindow::new(config.rate_limit, Duration::from_secs(60));

        Self {
            config,
            client,
            window,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(NewsClientConfig::default())
    }

    /// Issue `request` inside the request window, retrying on 429.
    async fn execute(&self, request: reqwest::Request) -> Result<reqwest::Response, AnalysisError> {
        let mut attempt = 1;
        loop {
            self.window.wait_turn().await;
            let pending = request
                .try_clone()
                .ok_or_else(|| AnalysisError::ApiError("News feed request is not retryable".to_string()))?;
            let response = self
                .client
                .execute(pending)
                .await
                .map_err(|e| AnalysisError::ApiError(e.to_string()))?;

            if response.status() != StatusCode::TOO_MANY_REQUESTS {
                return Ok(response);
            }
            if attempt == MAX_ATTEMPTS {
                return Err(AnalysisError::ApiError(format!(
                    "News feed still rate limited after {} attempts",
                    MAX_ATTEMPTS
                )));
            }

            tracing::warn!(
                "News feed returned 429 (attempt {}/{}), retrying in {:?}",
                attempt,
                MAX_ATTEMPTS,
                self.config.retry_wait
            );
            tokio::time::sleep(self.config.retry_wait).await;
            attempt += 1;
        }
    }

    fn search_request(&self, company: &str) -> Result<reqwest::Request, AnalysisError> {
        let query = format!("{} stock", company.trim());
        self.client
            .get(&self.config.base_url)
            .query(&[
                ("q", query.as_str()),
                ("hl", self.config.hl.as_str()),
                ("gl", self.config.gl.as_str()),
                ("ceid", self.config.ceid.as_str()),
            ])
            .build()
            .map_err(|e| AnalysisError::ApiError(e.to_string()))
    }

    /// Latest `limit` articles mentioning `company`
    pub async fn get_news(&self, company: &str, limit: usize) -> Result<Vec<RawArticle>, AnalysisError> {
        let response = self.execute(self.search_request(company)?).await?;

        if !response.status().is_success() {
            return Err(AnalysisError::ApiError(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AnalysisError::ApiError(e.to_string()))?;

        let articles = parse_feed(&body, limit)?;
        tracing::info!("Fetched {} articles for {}", articles.len(), company);
        Ok(articles)
    }
}

#[async_trait]
impl ArticleSource for GoogleNewsClient {
    async fn fetch_company_news(&self, company: &str, limit: usize) -> Result<Vec<RawArticle>, AnalysisError> {
        self.get_news(company, limit).await
    }
}

/// Parse an RSS document into at most `limit` articles, in feed order.
pub fn parse_feed(body: &[u8], limit: usize) -> Result<Vec<RawArticle>, AnalysisError> {
    let channel = rss::Channel::read_from(body)
        .map_err(|e| AnalysisError::InvalidData(format!("Malformed RSS feed: {}", e)))?;

    Ok(channel
        .items()
        .iter()
        .take(limit)
        .map(|item| RawArticle {
            title: clean_text(item.title().unwrap_or("")),
            link: item.link().map(|l| l.trim().to_string()),
            summary: Some(clean_text(item.description().unwrap_or(""))),
            published: item.pub_date().map(|d| d.to_string()),
        })
        .collect())
}

/// Collapse runs of whitespace (including line breaks) and trim.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex as StdMutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>"TCS stock" - Google News</title>
    <link>https://news.google.com</link>
    <description>Google News</description>
    <item>
      <title>TCS shares   rise after
        strong quarter</title>
      <link>https://example.com/a</link>
      <description>Revenue beat estimates</description>
      <pubDate>Mon, 06 Jan 2025 10:00:00 GMT</pubDate>
    </item>
    <item>
      <title>TCS wins large deal</title>
      <link>https://example.com/b</link>
    </item>
    <item>
      <title>Third story</title>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_feed_respects_limit_and_order() {
        let articles = parse_feed(FEED.as_bytes(), 2).unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "TCS shares rise after strong quarter");
        assert_eq!(articles[0].link.as_deref(), Some("https://example.com/a"));
        assert_eq!(articles[0].summary.as_deref(), Some("Revenue beat estimates"));
        assert_eq!(articles[0].published.as_deref(), Some("Mon, 06 Jan 2025 10:00:00 GMT"));
        assert_eq!(articles[1].title, "TCS wins large deal");
        assert_eq!(articles[1].summary.as_deref(), Some(""));
        assert!(articles[1].published.is_none());
    }

    #[test]
    fn test_parse_feed_limit_above_item_count() {
        let articles = parse_feed(FEED.as_bytes(), 20).unwrap();
        assert_eq!(articles.len(), 3);
    }

    #[test]
    fn test_parse_feed_rejects_garbage() {
        let result = parse_feed(b"<html>not a feed</html>", 5);
        assert!(matches!(result, Err(AnalysisError::InvalidData(_))));
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  a\n\n b\t c  "), "a b c");
        assert_eq!(clean_text(""), "");
    }

    #[tokio::test]
    async fn test_request_window_admits_capacity_then_waits() {
        let window = RequestWindow::new(2, Duration::from_secs(60));
        assert!(window.try_claim().await.is_none());
        assert!(window.try_claim().await.is_none());

        let wait = window.try_claim().await.unwrap();
        assert!(wait > Duration::from_secs(59));
        assert!(wait <= Duration::from_secs(60) + SLOT_SLACK);
    }

    fn test_config(base_url: String, retry_wait: Duration) -> NewsClientConfig {
        NewsClientConfig {
            base_url,
            hl: "en-IN".to_string(),
            gl: "IN".to_string(),
            ceid: "IN:en".to_string(),
            rate_limit: 10,
            timeout: Duration::from_secs(2),
            retry_wait,
        }
    }

    /// Serves one scripted status per connection and records each request line.
    async fn scripted_feed(statuses: Vec<u16>) -> (String, Arc<StdMutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let log = Arc::clone(&seen);

        tokio::spawn(async move {
            for status in statuses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = socket.read(&mut chunk).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                }
                let head = String::from_utf8_lossy(&buf);
                log.lock().unwrap().push(head.lines().next().unwrap_or("").to_string());

                let (reason, body) = if status == 200 { ("OK", FEED) } else { ("Too Many Requests", "") };
                let response = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: application/rss+xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    reason,
                    body.len(),
                    body
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.ok();
            }
        });

        (format!("http://{}/rss/search", addr), seen)
    }

    #[tokio::test]
    async fn test_retries_after_429_and_sends_locale_query() {
        let (url, seen) = scripted_feed(vec![429, 429, 200]).await;
        let client = GoogleNewsClient::new(test_config(url, Duration::from_millis(10)));

        let articles = client.fetch_company_news("TCS", 2).await.unwrap();
        assert_eq!(articles.len(), 2);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        for line in seen.iter() {
            assert!(line.starts_with("GET /rss/search?"), "{}", line);
            assert!(line.contains("q=TCS+stock&hl=en-IN&gl=IN&ceid=IN%3Aen"), "{}", line);
        }
    }

    #[tokio::test]
    async fn test_gives_up_after_three_429s_without_trailing_wait() {
        let (url, seen) = scripted_feed(vec![429, 429, 429]).await;
        let client = GoogleNewsClient::new(test_config(url, Duration::from_millis(400)));

        let started = std::time::Instant::now();
        let result = client.fetch_company_news("TCS", 5).await;

        assert!(matches!(result, Err(AnalysisError::ApiError(_))));
        assert_eq!(seen.lock().unwrap().len(), 3);
        // two retry pauses, none after the final attempt
        assert!(started.elapsed() < Duration::from_millis(1100));
    }

    #[tokio::test]
    async fn test_unreachable_feed_is_an_error() {
        let mut config = test_config("http://127.0.0.1:9/rss".to_string(), Duration::from_millis(10));
        config.timeout = Duration::from_millis(200);
        let client = GoogleNewsClient::new(config);
        assert!(client.fetch_company_news("TCS", 5).await.is_err());
    }
}
