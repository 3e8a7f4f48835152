//! Rule-based market move prediction from aggregate news sentiment.
//!
//! Deterministic and auditable: the same `(avg_compound, article_count)`
//! always maps to the same [`Prediction`].

use analysis_core::{MoveDirection, Prediction, SignalStrength};

/// Intensity band floors, evaluated highest first
pub const STRONG_INTENSITY: f64 = 0.4;
pub const MEDIUM_INTENSITY: f64 = 0.2;
pub const WEAK_INTENSITY: f64 = 0.05;

const STRONG_BASE_CONFIDENCE: f64 = 0.9;
const MEDIUM_BASE_CONFIDENCE: f64 = 0.75;
const WEAK_BASE_CONFIDENCE: f64 = 0.6;
const NEAR_NEUTRAL_CONFIDENCE: f64 = 0.55;

/// Evidence-count adjustment
const FEW_ARTICLES: usize = 2;
const MANY_ARTICLES: usize = 8;
const FEW_ARTICLES_PENALTY: f64 = 0.1;
const MANY_ARTICLES_BONUS: f64 = 0.05;
const MIN_CONFIDENCE: f64 = 0.4;
const MAX_CONFIDENCE: f64 = 0.98;

pub const NO_ARTICLES_REASON: &str = "No recent news articles found for this company.";
pub const NEAR_NEUTRAL_REASON: &str = "Overall sentiment is near neutral.";

/// Maps aggregate sentiment and evidence count to a labeled call.
/// Holds no state between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct PredictionEngine;

impl PredictionEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn predict(&self, avg_compound: f64, article_count: usize) -> Prediction {
        rule_based_prediction(avg_compound, article_count)
    }
}

/// Signal band for an intensity, or `None` when the sentiment is near neutral.
fn intensity_band(intensity: f64) -> Option<(SignalStrength, f64)> {
    if intensity >= STRONG_INTENSITY {
        Some((SignalStrength::Strong, STRONG_BASE_CONFIDENCE))
    } else if intensity >= MEDIUM_INTENSITY {
        Some((SignalStrength::Medium, MEDIUM_BASE_CONFIDENCE))
    } else if intensity >= WEAK_INTENSITY {
        Some((SignalStrength::Weak, WEAK_BASE_CONFIDENCE))
    } else {
        // NaN also lands here
        None
    }
}

fn adjust_for_evidence(base_confidence: f64, article_count: usize) -> f64 {
    if article_count <= FEW_ARTICLES {
        (base_confidence - FEW_ARTICLES_PENALTY).max(MIN_CONFIDENCE)
    } else if article_count >= MANY_ARTICLES {
        (base_confidence + MANY_ARTICLES_BONUS).min(MAX_CONFIDENCE)
    } else {
        base_confidence
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Banded rule engine.
///
/// 1. No articles: neutral, zero confidence, no signal.
/// 2. `|avg_compound|` below 0.05: neutral at 0.55 with a weak signal.
/// 3. Otherwise the sign picks the direction, the band picks the base
///    confidence, and the article count nudges it.
pub fn rule_based_prediction(avg_compound: f64, article_count: usize) -> Prediction {
    if article_count == 0 {
        return Prediction {
            direction: MoveDirection::Neutral,
            confidence: 0.0,
            signal_strength: SignalStrength::None,
            reason: NO_ARTICLES_REASON.to_string(),
        };
    }

    let intensity = avg_compound.abs();

    let Some((strength, base_confidence)) = intensity_band(intensity) else {
        return Prediction {
            direction: MoveDirection::Neutral,
            confidence: NEAR_NEUTRAL_CONFIDENCE,
            signal_strength: SignalStrength::Weak,
            reason: NEAR_NEUTRAL_REASON.to_string(),
        };
    };

    let (direction, direction_text) = if avg_compound > 0.0 {
        (MoveDirection::Up, "positive")
    } else {
        (MoveDirection::Down, "negative")
    };

    let confidence = adjust_for_evidence(base_confidence, article_count);

    let reason = format!(
        "{} news articles with {} average sentiment (compound={:.3}), signal strength: {}.",
        article_count, direction_text, avg_compound, strength
    );

    tracing::debug!(
        "Prediction: avg={:.3} n={} -> {} ({}, conf {:.3})",
        avg_compound,
        article_count,
        direction.as_str(),
        strength,
        confidence
    );

    Prediction {
        direction,
        confidence: round3(confidence),
        signal_strength: strength,
        reason,
    }
}

/// Map any move label to the canonical domain; unknown labels become neutral.
pub fn normalize_move_label(label: &str) -> MoveDirection {
    match label.trim().to_ascii_lowercase().as_str() {
        "up" => MoveDirection::Up,
        "down" => MoveDirection::Down,
        _ => MoveDirection::Neutral,
    }
}

/// Label-only view of the banded engine, for consumers that only need up/down/neutral.
pub fn predict_price_move(avg_compound: f64, article_count: usize) -> MoveDirection {
    let prediction = rule_based_prediction(avg_compound, article_count);
    normalize_move_label(prediction.direction.as_str())
}
