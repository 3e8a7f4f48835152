use serde::{Deserialize, Serialize};

/// Fixed label thresholds on the compound score
pub const POSITIVE_LABEL_THRESHOLD: f64 = 0.2;
pub const NEGATIVE_LABEL_THRESHOLD: f64 = -0.2;

/// Article as submitted for analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleText {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

impl ArticleText {
    pub fn new(title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            link: None,
            summary: Some(summary.into()),
        }
    }

    /// Single text unit fed to the scorer and the entity extractor.
    /// Absent fields are treated as empty strings.
    pub fn scoring_text(&self) -> String {
        format!(
            "{}. {}",
            self.title.as_deref().unwrap_or(""),
            self.summary.as_deref().unwrap_or("")
        )
    }
}

/// Article as returned by a news source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawArticle {
    pub title: String,
    pub link: Option<String>,
    pub summary: Option<String>,
    pub published: Option<String>,
}

impl From<RawArticle> for ArticleText {
    fn from(raw: RawArticle) -> Self {
        Self {
            title: Some(raw.title),
            link: raw.link,
            summary: raw.summary,
        }
    }
}

/// Discrete sentiment label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn from_compound(compound: f64) -> Self {
        if compound >= POSITIVE_LABEL_THRESHOLD {
            SentimentLabel::Positive
        } else if compound <= NEGATIVE_LABEL_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

/// Raw polarity proportions plus the composite score
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PolarityScores {
    pub neg: f64,
    pub neu: f64,
    pub pos: f64,
    pub compound: f64,
}

/// Sentiment of one text unit.
///
/// The label can only be derived from the compound score, so fields are
/// private and construction goes through [`SentimentScore::from_scores`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SentimentScore {
    label: SentimentLabel,
    scores: PolarityScores,
}

impl SentimentScore {
    /// Build a score, forcing `compound` into a finite value in [-1, 1].
    pub fn from_scores(mut scores: PolarityScores) -> Self {
        scores.compound = if scores.compound.is_finite() {
            scores.compound.clamp(-1.0, 1.0)
        } else {
            0.0
        };
        Self {
            label: SentimentLabel::from_compound(scores.compound),
            scores,
        }
    }

    /// Score for empty or unscorable text
    pub fn empty() -> Self {
        Self::from_scores(PolarityScores::default())
    }

    pub fn compound(&self) -> f64 {
        self.scores.compound
    }

    pub fn positive(&self) -> f64 {
        self.scores.pos
    }

    pub fn neutral(&self) -> f64 {
        self.scores.neu
    }

    pub fn negative(&self) -> f64 {
        self.scores.neg
    }

    pub fn label(&self) -> SentimentLabel {
        self.label
    }

    pub fn scores(&self) -> &PolarityScores {
        &self.scores
    }
}

/// Article plus its sentiment and entity annotations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedArticle {
    #[serde(flatten)]
    pub article: ArticleText,
    pub sentiment: SentimentScore,
    pub entities: Vec<String>,
}

/// Predicted directional move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
    Neutral,
}

impl MoveDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoveDirection::Up => "up",
            MoveDirection::Down => "down",
            MoveDirection::Neutral => "neutral",
        }
    }
}

/// Qualitative bucket for the magnitude of the aggregate score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalStrength {
    None,
    Weak,
    Medium,
    Strong,
}

impl SignalStrength {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalStrength::None => "none",
            SignalStrength::Weak => "weak",
            SignalStrength::Medium => "medium",
            SignalStrength::Strong => "strong",
        }
    }
}

impl std::fmt::Display for SignalStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directional call for a company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(rename = "move")]
    pub direction: MoveDirection,
    pub confidence: f64, // 0.0 to 0.98, rounded to 3 decimals
    pub signal_strength: SignalStrength,
    pub reason: String,
}

/// Result of analyzing one batch of articles for a company
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub company: String,
    pub article_count: usize,
    pub avg_compound: f64,
    pub prediction: Prediction,
    pub articles: Vec<AnnotatedArticle>,
}

/// De-duplicate entity strings keeping the first occurrence (case-sensitive).
pub fn dedup_entities<I, S>(entities: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for entity in entities {
        let entity: String = entity.into();
        if entity.is_empty() {
            continue;
        }
        if seen.insert(entity.clone()) {
            out.push(entity);
        }
    }
    out
}
