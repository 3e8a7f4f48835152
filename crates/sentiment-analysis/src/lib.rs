//! Per-text sentiment scoring.
//!
//! Scores are produced by VADER (Valence Aware Dictionary and sEntiment
//! Reasoner), a lexicon and rule based composite-polarity algorithm. The
//! label is derived from the compound score by [`SentimentLabel::from_compound`]
//! and nothing downstream recomputes it.

use analysis_core::{PolarityScores, SentimentScore, TextScorer};
use vader_sentiment::SentimentIntensityAnalyzer;

pub use analysis_core::SentimentLabel;

pub struct SentimentAnalysisEngine {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl SentimentAnalysisEngine {
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }

    /// Score one text unit. Empty text and text without any word
    /// characters score as neutral with a zero compound.
    pub fn analyze_text(&self, text: &str) -> SentimentScore {
        if !text.chars().any(char::is_alphanumeric) {
            return SentimentScore::empty();
        }

        let raw = self.analyzer.polarity_scores(text);
        let get = |key: &str| raw.get(key).copied().unwrap_or(0.0);

        let score = SentimentScore::from_scores(PolarityScores {
            neg: get("neg"),
            neu: get("neu"),
            pos: get("pos"),
            compound: get("compound"),
        });

        tracing::debug!(
            "Scored text ({} chars): compound={:.3} label={}",
            text.len(),
            score.compound(),
            score.label().as_str()
        );

        score
    }
}

impl TextScorer for SentimentAnalysisEngine {
    fn score(&self, text: &str) -> SentimentScore {
        self.analyze_text(text)
    }
}

impl Default for SentimentAnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_headlines() {
        let engine = SentimentAnalysisEngine::new();

        let headlines = [
            "Great results and excellent growth make investors very happy",
            "Company wins award, shareholders love the impressive success",
        ];

        for headline in headlines {
            let score = engine.analyze_text(headline);
            assert!(score.compound() > 0.2, "Expected positive score for '{}', got {}", headline, score.compound());
            assert_eq!(score.label(), SentimentLabel::Positive);
        }
    }

    #[test]
    fn test_negative_headlines() {
        let engine = SentimentAnalysisEngine::new();

        let headlines = [
            "Terrible losses and an awful scandal leave shareholders angry",
            "Fraud lawsuit hurts company, investors fear disaster",
        ];

        for headline in headlines {
            let score = engine.analyze_text(headline);
            assert!(score.compound() < -0.2, "Expected negative score for '{}', got {}", headline, score.compound());
            assert_eq!(score.label(), SentimentLabel::Negative);
        }
    }

    #[test]
    fn test_empty_text() {
        let engine = SentimentAnalysisEngine::new();
        for text in ["", "   ", ". ", "..."] {
            let score = engine.analyze_text(text);
            assert_eq!(score.compound(), 0.0);
            assert_eq!(score.label(), SentimentLabel::Neutral);
        }
    }

    #[test]
    fn test_compound_is_bounded() {
        let engine = SentimentAnalysisEngine::new();
        let text = "best best best amazing wonderful fantastic excellent superb love love love!!!";
        let score = engine.analyze_text(text);
        assert!(score.compound().is_finite());
        assert!((-1.0..=1.0).contains(&score.compound()));
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let engine = SentimentAnalysisEngine::new();
        let text = "Profit rises but outlook remains uncertain";
        assert_eq!(engine.analyze_text(text), engine.analyze_text(text));
    }

    #[test]
    fn test_label_follows_compound() {
        let engine = SentimentAnalysisEngine::new();
        let score = engine.score("The board met on Tuesday to review the agenda");
        assert_eq!(score.label(), SentimentLabel::from_compound(score.compound()));
    }
}
