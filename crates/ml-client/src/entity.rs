use analysis_core::{dedup_entities, AnalysisError, EntityExtractor};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{MLError, MLResult};
use crate::ENTITY_LABELS;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityMention {
    pub text: String,
    pub label: String,
}

#[derive(Debug, Clone, Deserialize)]
struct EntitiesResponse {
    entities: Vec<EntityMention>,
}

#[derive(Debug, Clone, Serialize)]
struct EntitiesRequest<'a> {
    text: &'a str,
    model: &'a str,
    labels: &'a [&'a str],
}

/// HTTP client for a named-entity recognition model service.
///
/// The service owns the model; this client is a read-only handle and is
/// safe to share across concurrently processed articles.
#[derive(Clone)]
pub struct NerClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl NerClient {
    pub fn new(base_url: String, model: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Raw mentions for `text`, all labels
    pub async fn predict(&self, text: &str) -> MLResult<Vec<EntityMention>> {
        let request = EntitiesRequest {
            text,
            model: &self.model,
            labels: ENTITY_LABELS,
        };

        let response = self
            .client
            .post(format!("{}/entities", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MLError::ServiceUnavailable(format!(
                "Status: {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        let parsed: EntitiesResponse = serde_json::from_str(&body)
            .map_err(|e| MLError::InvalidResponse(e.to_string()))?;
        Ok(parsed.entities)
    }

    /// Succeeds once the service reports its model loaded.
    pub async fn health(&self) -> MLResult<()> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            tracing::debug!("NER health check returned {}", response.status());
            Err(MLError::ModelNotLoaded)
        }
    }
}

/// Keep organization/location mentions, first occurrence wins.
pub fn select_entities(mentions: Vec<EntityMention>) -> Vec<String> {
    dedup_entities(
        mentions
            .into_iter()
            .filter(|m| ENTITY_LABELS.contains(&m.label.as_str()))
            .map(|m| m.text.trim().to_string()),
    )
}

#[async_trait]
impl EntityExtractor for NerClient {
    fn is_available(&self) -> bool {
        true
    }

    async fn extract_entities(&self, text: &str) -> Result<Vec<String>, AnalysisError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let mentions = self.predict(text).await?;
        Ok(select_entities(mentions))
    }

    fn backend_name(&self) -> &'static str {
        "http"
    }
}
