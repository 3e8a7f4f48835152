use anyhow::{Context, Result};
use ml_client::NerConfig;
use news_client::NewsClientConfig;
use std::env;
use std::time::Duration;

/// Runtime configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// CORS allow-list; empty means any origin
    pub allowed_origins: Vec<String>,
    pub json_logging: bool,
    pub ner: NerConfig,
    pub news: NewsClientConfig,
    pub news_cache_ttl_secs: i64,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8001".to_string())
                .parse()
                .context("PORT must be a valid port number")?,
            allowed_origins: parse_origins(&env::var("ALLOWED_ORIGINS").unwrap_or_default()),
            json_logging: env::var("RUST_LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
            ner: NerConfig {
                timeout: Duration::from_secs(
                    env::var("NER_TIMEOUT_SECS")
                        .unwrap_or_else(|_| "10".to_string())
                        .parse()
                        .context("NER_TIMEOUT_SECS must be a whole number of seconds")?,
                ),
                ..NerConfig::default()
            },
            news: NewsClientConfig::default(),
            news_cache_ttl_secs: env::var("NEWS_CACHE_TTL_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .context("NEWS_CACHE_TTL_SECS must be an integer")?,
        };

        if config.news_cache_ttl_secs < 0 {
            anyhow::bail!("NEWS_CACHE_TTL_SECS must not be negative");
        }

        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Comma-separated origins; blanks dropped, `*` means any.
pub fn parse_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(|o| o.trim().trim_end_matches('/').to_string())
        .filter(|o| !o.is_empty())
        .collect();

    if origins.iter().any(|o| o == "*") {
        Vec::new()
    } else {
        origins
    }
}
