//! NLP Routes
//!
//! News scraping, per-article sentiment/entity annotation, and the
//! rule-based move prediction, all under `/nlp`.

use analysis_core::{AnalysisResult, AnnotatedArticle, ArticleText, MoveDirection, Prediction, RawArticle};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use prediction_engine::predict_price_move;
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState};

pub const MIN_LIMIT: i64 = 1;
pub const MAX_LIMIT: i64 = 20;

/// Query parameters for scrape endpoints
#[derive(Deserialize)]
pub struct ScrapeQuery {
    /// Company name or ticker
    pub company: String,
    /// Number of articles to fetch (default: 5, 1..=20)
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    5
}

/// Request body for analyze endpoints
#[derive(Deserialize)]
pub struct AnalyzeRequest {
    pub company: String,
    pub articles: Vec<ArticleText>,
}

#[derive(Serialize)]
pub struct ScrapeResponse {
    pub company: String,
    pub count: usize,
    pub articles: Vec<RawArticle>,
}

/// Label-only analysis response
#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub company: String,
    pub article_count: usize,
    pub avg_compound: f64,
    pub predicted_move: MoveDirection,
    pub articles: Vec<AnnotatedArticle>,
}

/// Analysis response including the full prediction
#[derive(Serialize)]
pub struct AnalyzeFullResponse {
    #[serde(flatten)]
    pub summary: AnalyzeResponse,
    pub prediction: Prediction,
}

impl From<AnalysisResult> for AnalyzeResponse {
    fn from(result: AnalysisResult) -> Self {
        Self {
            predicted_move: predict_price_move(result.avg_compound, result.article_count),
            company: result.company,
            article_count: result.article_count,
            avg_compound: result.avg_compound,
            articles: result.articles,
        }
    }
}

impl From<AnalysisResult> for AnalyzeFullResponse {
    fn from(result: AnalysisResult) -> Self {
        let prediction = result.prediction.clone();
        Self {
            summary: AnalyzeResponse::from(result),
            prediction,
        }
    }
}

/// Create NLP routes
pub fn nlp_routes() -> Router<AppState> {
    Router::new()
        .route("/nlp/scrape", get(scrape_news))
        .route("/nlp/analyze", post(analyze_news))
        .route("/nlp/analyze-full", post(analyze_news_full))
        .route("/nlp/scrape-and-analyze", get(scrape_and_analyze))
        .route("/nlp/scrape-and-analyze-full", get(scrape_and_analyze_full))
}

fn validate_limit(limit: i64) -> Result<usize, AppError> {
    if !(MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
        return Err(AppError::with_status(
            StatusCode::UNPROCESSABLE_ENTITY,
            anyhow::anyhow!("limit must be between {} and {}, got {}", MIN_LIMIT, MAX_LIMIT, limit),
        ));
    }
    Ok(limit as usize)
}

fn validate_company(company: &str) -> Result<String, AppError> {
    let company = company.trim();
    if company.is_empty() {
        return Err(AppError::with_status(
            StatusCode::UNPROCESSABLE_ENTITY,
            anyhow::anyhow!("company must not be empty"),
        ));
    }
    Ok(company.to_string())
}

/// Raw scraped articles
async fn scrape_news(
    State(state): State<AppState>,
    Query(params): Query<ScrapeQuery>,
) -> Result<Json<ScrapeResponse>, AppError> {
    let company = validate_company(&params.company)?;
    let limit = validate_limit(params.limit)?;

    let articles = state.orchestrator.get_news(&company, limit).await;

    Ok(Json(ScrapeResponse {
        company,
        count: articles.len(),
        articles,
    }))
}

async fn analyze_news(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let company = validate_company(&req.company)?;
    let result = state.orchestrator.analyze(&company, req.articles).await;
    Ok(Json(result.into()))
}

async fn analyze_news_full(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeFullResponse>, AppError> {
    let company = validate_company(&req.company)?;
    let result = state.orchestrator.analyze(&company, req.articles).await;
    Ok(Json(result.into()))
}

/// End-to-end: scrape latest company news and analyze it
async fn scrape_and_analyze(
    State(state): State<AppState>,
    Query(params): Query<ScrapeQuery>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let company = validate_company(&params.company)?;
    let limit = validate_limit(params.limit)?;
    let result = state.orchestrator.scrape_and_analyze(&company, limit).await;
    Ok(Json(result.into()))
}

async fn scrape_and_analyze_full(
    State(state): State<AppState>,
    Query(params): Query<ScrapeQuery>,
) -> Result<Json<AnalyzeFullResponse>, AppError> {
    let company = validate_company(&params.company)?;
    let limit = validate_limit(params.limit)?;
    let result = state.orchestrator.scrape_and_analyze(&company, limit).await;
    Ok(Json(result.into()))
}
