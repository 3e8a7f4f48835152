use async_trait::async_trait;
use crate::{AnalysisError, RawArticle, SentimentScore};

/// Trait for per-text sentiment scorers.
///
/// Implementations must be pure: the same text always yields the same score,
/// and malformed or empty input yields a neutral score instead of an error.
pub trait TextScorer: Send + Sync {
    fn score(&self, text: &str) -> SentimentScore;
}

/// Trait for named-entity extraction backends
#[async_trait]
pub trait EntityExtractor: Send + Sync {
    /// Whether the backing model is loaded and usable.
    fn is_available(&self) -> bool;

    /// Organization/location surface strings in first-seen order, without duplicates.
    async fn extract_entities(&self, text: &str) -> Result<Vec<String>, AnalysisError>;

    fn backend_name(&self) -> &'static str;
}

/// Trait for company news sources
#[async_trait]
pub trait ArticleSource: Send + Sync {
    async fn fetch_company_news(&self, company: &str, limit: usize) -> Result<Vec<RawArticle>, AnalysisError>;
}
