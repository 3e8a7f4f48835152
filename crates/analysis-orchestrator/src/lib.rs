use analysis_core::{
    aggregate, dedup_entities, AnalysisResult, AnnotatedArticle, ArticleSource, ArticleText,
    EntityExtractor, RawArticle, SentimentScore, TextScorer,
};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use prediction_engine::PredictionEngine;
use sentiment_analysis::SentimentAnalysisEngine;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Internal cache entry with timestamp
struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
}

const CACHE_TTL_SECS: i64 = 300; // 5 minutes

/// Company names come from callers, so the cache is bounded
const MAX_CACHED_QUERIES: usize = 512;

/// Composes scoring, entity extraction, aggregation and prediction for a
/// batch of articles about one company.
pub struct AnalysisOrchestrator {
    scorer: Arc<dyn TextScorer>,
    entity_extractor: Arc<dyn EntityExtractor>,
    predictor: PredictionEngine,
    /// Optional news source for scrape endpoints
    article_source: Option<Arc<dyn ArticleSource>>,
    /// Cache fetched articles per (company, limit)
    news_cache: DashMap<String, CacheEntry<Vec<RawArticle>>>,
    cache_ttl: Duration,
}

impl AnalysisOrchestrator {
    /// Orchestrator with the VADER scorer and the given (already initialized) entity extractor.
    pub fn new(entity_extractor: Arc<dyn EntityExtractor>) -> Self {
        Self {
            scorer: Arc::new(SentimentAnalysisEngine::new()),
            entity_extractor,
            predictor: PredictionEngine::new(),
            article_source: None,
            news_cache: DashMap::new(),
            cache_ttl: Duration::seconds(CACHE_TTL_SECS),
        }
    }

    pub fn with_scorer(mut self, scorer: Arc<dyn TextScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_article_source(mut self, source: Arc<dyn ArticleSource>) -> Self {
        self.article_source = Some(source);
        self
    }

    /// Zero disables caching
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn entity_backend(&self) -> &'static str {
        self.entity_extractor.backend_name()
    }

    /// Fetch news for a company (cached). Source failures degrade to an empty list.
    pub async fn get_news(&self, company: &str, limit: usize) -> Vec<RawArticle> {
        let Some(source) = self.article_source.as_ref() else {
            tracing::warn!("No article source configured; returning no articles for {}", company);
            return Vec::new();
        };

        let key = format!("{}:{}", company.trim().to_lowercase(), limit);
        if let Some(entry) = self.news_cache.get(&key) {
            if Utc::now() - entry.cached_at < self.cache_ttl {
                tracing::debug!("News cache hit for {}", key);
                return entry.data.clone();
            }
        }

        match source.fetch_company_news(company, limit).await {
            Ok(articles) => {
                if self.cache_ttl > Duration::zero() {
                    self.store_news(key, articles.clone());
                }
                articles
            }
            Err(e) => {
                tracing::warn!("Failed to fetch news for {}: {}", company, e);
                Vec::new()
            }
        }
    }

    /// Insert into the news cache, dropping expired entries and, when
    /// still full, the oldest one.
    fn store_news(&self, key: String, data: Vec<RawArticle>) {
        let now = Utc::now();
        let ttl = self.cache_ttl;
        self.news_cache.retain(|_, entry| now - entry.cached_at < ttl);

        if self.news_cache.len() >= MAX_CACHED_QUERIES && !self.news_cache.contains_key(&key) {
            let oldest = self
                .news_cache
                .iter()
                .min_by_key(|entry| entry.value().cached_at)
                .map(|entry| entry.key().clone());
            if let Some(oldest) = oldest {
                self.news_cache.remove(&oldest);
            }
        }

        self.news_cache.insert(key, CacheEntry { data, cached_at: now });
    }

    /// Analyze a batch of articles. Never fails: every collaborator problem
    /// degrades per article.
    pub async fn analyze(&self, company: &str, articles: Vec<ArticleText>) -> AnalysisResult {
        let annotated = self.annotate_articles(articles).await;

        let compounds: Vec<f64> = annotated.iter().map(|a| a.sentiment.compound()).collect();
        let avg_compound = aggregate::mean_compound(&compounds);
        let article_count = annotated.len();
        let prediction = self.predictor.predict(avg_compound, article_count);

        tracing::info!(
            "Analyzed {} articles for {}: avg_compound={:.3}, move={} ({}, conf {:.3})",
            article_count,
            company,
            avg_compound,
            prediction.direction.as_str(),
            prediction.signal_strength,
            prediction.confidence
        );

        AnalysisResult {
            company: company.to_string(),
            article_count,
            avg_compound,
            prediction,
            articles: annotated,
        }
    }

    /// Fetch the latest news for `company` and analyze it.
    pub async fn scrape_and_analyze(&self, company: &str, limit: usize) -> AnalysisResult {
        let articles = self
            .get_news(company, limit)
            .await
            .into_iter()
            .map(ArticleText::from)
            .collect();
        self.analyze(company, articles).await
    }

    /// Annotate all articles concurrently; output order matches input order.
    async fn annotate_articles(&self, articles: Vec<ArticleText>) -> Vec<AnnotatedArticle> {
        let mut tasks = JoinSet::new();

        for (index, article) in articles.iter().cloned().enumerate() {
            let scorer = Arc::clone(&self.scorer);
            let extractor = Arc::clone(&self.entity_extractor);
            tasks.spawn(async move {
                let annotated = annotate_article(scorer.as_ref(), extractor.as_ref(), article).await;
                (index, annotated)
            });
        }

        let mut slots: Vec<Option<AnnotatedArticle>> = vec![None; articles.len()];

        while let Some(result) = tasks.join_next().await {
            match result {
                Ok((index, annotated)) => slots[index] = Some(annotated),
                Err(e) => tracing::error!("Article task error: {}", e),
            }
        }

        slots
            .into_iter()
            .zip(articles)
            .map(|(slot, article)| {
                slot.unwrap_or_else(|| AnnotatedArticle {
                    article,
                    sentiment: SentimentScore::empty(),
                    entities: Vec::new(),
                })
            })
            .collect()
    }
}

/// Score one article and attach its entities.
///
/// Extraction is skipped when the extractor reports no model, and an
/// extraction error leaves the article with an empty entity set.
pub async fn annotate_article(
    scorer: &dyn TextScorer,
    extractor: &dyn EntityExtractor,
    article: ArticleText,
) -> AnnotatedArticle {
    let text = article.scoring_text();
    let sentiment = scorer.score(&text);

    let entities = if extractor.is_available() {
        match extractor.extract_entities(&text).await {
            Ok(found) => dedup_entities(found),
            Err(e) => {
                tracing::warn!(
                    "Entity extraction failed for '{}', continuing without entities: {}",
                    article.title.as_deref().unwrap_or(""),
                    e
                );
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    AnnotatedArticle {
        article,
        sentiment,
        entities,
    }
}
