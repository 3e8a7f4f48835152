pub mod config;
pub mod nlp_routes;
pub mod request_id;
pub mod security_headers;

use analysis_orchestrator::AnalysisOrchestrator;
use anyhow::Context;
use axum::{
    extract::Request,
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::ServerConfig;
use request_id::request_id_middleware;
use security_headers::security_headers_middleware;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<AnalysisOrchestrator>,
}

/// Handler error: an `anyhow` error plus the status to answer with.
pub struct AppError {
    status: StatusCode,
    error: anyhow::Error,
}

impl AppError {
    pub fn with_status(status: StatusCode, error: anyhow::Error) -> Self {
        Self { status, error }
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: err.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("Request failed: {:#}", self.error);
        } else {
            tracing::debug!("Request rejected: {:#}", self.error);
        }
        (self.status, Json(json!({ "error": self.error.to_string() }))).into_response()
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "nlp-engine" }))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request| {
        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = tracing::field::Empty,
        )
    });

    Router::new()
        .route("/health", get(health))
        .merge(nlp_routes::nlp_routes())
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace)
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}

pub fn init_tracing(json_logging: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if json_logging {
        tracing_subscriber::fmt().json().with_env_filter(env_filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env()?;
    init_tracing(config.json_logging);

    tracing::info!("Starting NLP engine");

    // Load the entity model once, before serving
    let entity_extractor = ml_client::connect_entity_extractor(&config.ner).await;
    let news = news_client::GoogleNewsClient::new(config.news.clone());

    let orchestrator = AnalysisOrchestrator::new(entity_extractor)
        .with_article_source(Arc::new(news))
        .with_cache_ttl(chrono::Duration::seconds(config.news_cache_ttl_secs));

    tracing::info!("Entity extraction backend: {}", orchestrator.entity_backend());
    if config.allowed_origins.is_empty() {
        tracing::info!("CORS: any origin");
    } else {
        tracing::info!("CORS: {}", config.allowed_origins.join(", "));
    }

    let state = AppState {
        orchestrator: Arc::new(orchestrator),
    };
    let app = build_router(state, &config.allowed_origins);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
