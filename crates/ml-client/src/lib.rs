pub mod entity;
pub mod error;
pub mod provider;

pub use entity::{EntityMention, NerClient};
pub use error::{MLError, MLResult};
pub use provider::{connect_entity_extractor, NoopEntityExtractor};

use std::time::Duration;

/// Entity labels kept from the NER model: organizations and geopolitical places
pub const ENTITY_LABELS: &[&str] = &["ORG", "GPE"];

/// Configuration for the entity-extraction model service
#[derive(Debug, Clone)]
pub struct NerConfig {
    /// Base URL of the NER service; `None` disables entity extraction.
    pub service_url: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

impl Default for NerConfig {
    fn default() -> Self {
        Self {
            service_url: std::env::var("NER_SERVICE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            model: std::env::var("NER_MODEL").unwrap_or_else(|_| "en_core_web_sm".to_string()),
            timeout: Duration::from_secs(10),
        }
    }
}
