use analysis_core::{AnalysisError, EntityExtractor};
use async_trait::async_trait;
use std::sync::Arc;

use crate::{NerClient, NerConfig};

/// Stand-in used when no entity model is loaded. Always returns an empty set.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEntityExtractor;

#[async_trait]
impl EntityExtractor for NoopEntityExtractor {
    fn is_available(&self) -> bool {
        false
    }

    async fn extract_entities(&self, _text: &str) -> Result<Vec<String>, AnalysisError> {
        Ok(Vec::new())
    }

    fn backend_name(&self) -> &'static str {
        "noop"
    }
}

/// One-time, startup-phase initialization of the entity extractor.
///
/// Probes the configured NER service once. A reachable service yields an
/// HTTP-backed extractor; anything else yields [`NoopEntityExtractor`].
pub async fn connect_entity_extractor(config: &NerConfig) -> Arc<dyn EntityExtractor> {
    let Some(url) = config.service_url.clone() else {
        tracing::warn!("NER_SERVICE_URL not set; entity extraction disabled");
        return Arc::new(NoopEntityExtractor);
    };

    let client = NerClient::new(url.clone(), config.model.clone(), config.timeout);
    match client.health().await {
        Ok(()) => {
            tracing::info!("Entity extraction ready: model {} at {}", client.model(), url);
            Arc::new(client)
        }
        Err(e) => {
            tracing::warn!("NER service at {} not usable ({}); entity extraction disabled", url, e);
            Arc::new(NoopEntityExtractor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use crate::MLError;

    /// Answers a single request with `status` and an empty JSON body.
    async fn health_stub(status: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: 2\r\nConnection: close\r\n\r\n{{}}",
                status
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });
        format!("http://{}", addr)
    }

    fn config_for(url: String) -> NerConfig {
        NerConfig {
            service_url: Some(url),
            model: "en_core_web_sm".to_string(),
            timeout: Duration::from_secs(2),
        }
    }

    #[tokio::test]
    async fn test_noop_extractor() {
        let extractor = NoopEntityExtractor;
        assert!(!extractor.is_available());
        assert!(extractor.extract_entities("Reliance in Mumbai").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_connect_without_url_falls_back() {
        let config = NerConfig {
            service_url: None,
            model: "en_core_web_sm".to_string(),
            timeout: Duration::from_millis(200),
        };
        let extractor = connect_entity_extractor(&config).await;
        assert!(!extractor.is_available());
        assert_eq!(extractor.backend_name(), "noop");
    }

    #[tokio::test]
    async fn test_connect_unreachable_falls_back() {
        let config = NerConfig {
            service_url: Some("http://127.0.0.1:9".to_string()),
            model: "en_core_web_sm".to_string(),
            timeout: Duration::from_millis(200),
        };
        let extractor = connect_entity_extractor(&config).await;
        assert!(!extractor.is_available());
    }

    #[tokio::test]
    async fn test_connect_healthy_service() {
        let url = health_stub("200 OK").await;
        let extractor = connect_entity_extractor(&config_for(url)).await;
        assert!(extractor.is_available());
        assert_eq!(extractor.backend_name(), "http");
    }

    #[tokio::test]
    async fn test_connect_model_not_loaded_falls_back() {
        let url = health_stub("503 Service Unavailable").await;
        let extractor = connect_entity_extractor(&config_for(url)).await;
        assert!(!extractor.is_available());
        assert_eq!(extractor.backend_name(), "noop");
    }

    #[tokio::test]
    async fn test_health_reports_model_not_loaded() {
        let url = health_stub("503 Service Unavailable").await;
        let client = NerClient::new(url, "en_core_web_trf".to_string(), Duration::from_secs(2));
        assert_eq!(client.model(), "en_core_web_trf");

        let err = client.health().await.unwrap_err();
        assert!(matches!(err, MLError::ModelNotLoaded));
        assert!(matches!(AnalysisError::from(err), AnalysisError::Unavailable(_)));
    }
}
