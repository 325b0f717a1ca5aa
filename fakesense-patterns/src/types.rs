use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// An overall score below this marks an analysis as suspicious.
pub const SUSPICIOUS_OVERALL_BELOW: f64 = 50.0;
/// An AI-origin probability above this marks an analysis as suspicious.
pub const SUSPICIOUS_AI_ORIGIN_ABOVE: f64 = 60.0;

/// Stylometric profile reported by the scoring oracle, each axis in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleSignature {
    pub sentence_rhythm: f64,
    pub punctuation_frequency: f64,
    pub vocabulary_spread: f64,
    pub token_transitions: f64,
}

impl StyleSignature {
    pub(crate) fn axes(&self) -> [f64; 4] {
        [
            self.sentence_rhythm,
            self.punctuation_frequency,
            self.vocabulary_spread,
            self.token_transitions,
        ]
    }
}

/// Scores produced by the scoring oracle for one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisScores {
    pub overall_score: f64,
    pub perplexity_score: f64,
    pub semantic_score: f64,
    pub watermark_score: f64,
    pub writing_style_score: f64,
    pub ai_origin_probability: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_signature: Option<StyleSignature>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoreError {
    #[error("{field} must be a number in [0, 100], got {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

impl AnalysisScores {
    /// Low authenticity or likely machine origin.
    pub fn is_suspicious(&self) -> bool {
        self.overall_score < SUSPICIOUS_OVERALL_BELOW
            || self.ai_origin_probability > SUSPICIOUS_AI_ORIGIN_ABOVE
    }

    /// The four metrics compared pairwise by the matcher.
    pub(crate) fn metrics(&self) -> [f64; 4] {
        [
            self.perplexity_score,
            self.semantic_score,
            self.watermark_score,
            self.writing_style_score,
        ]
    }

    /// Reject NaN, infinities and values outside `[0, 100]`.
    pub fn validate(&self) -> Result<(), ScoreError> {
        let mut fields = vec![
            ("overallScore", self.overall_score),
            ("perplexityScore", self.perplexity_score),
            ("semanticScore", self.semantic_score),
            ("watermarkScore", self.watermark_score),
            ("writingStyleScore", self.writing_style_score),
            ("aiOriginProbability", self.ai_origin_probability),
        ];
        if let Some(sig) = &self.style_signature {
            fields.extend([
                ("sentenceRhythm", sig.sentence_rhythm),
                ("punctuationFrequency", sig.punctuation_frequency),
                ("vocabularySpread", sig.vocabulary_spread),
                ("tokenTransitions", sig.token_transitions),
            ]);
        }
        match fields
            .into_iter()
            .find(|(_, v)| !(v.is_finite() && (0.0..=100.0).contains(v)))
        {
            Some((field, value)) => Err(ScoreError::OutOfRange { field, value }),
            None => Ok(()),
        }
    }
}

/// One persisted history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPattern {
    pub id: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    #[serde(flatten)]
    pub scores: AnalysisScores,
    pub text_fingerprint: String,
    pub is_suspicious: bool,
}

/// Named resemblance between a submission and a suspicious precedent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PatternCategory {
    #[serde(rename = "Low Perplexity")]
    LowPerplexity,
    #[serde(rename = "Semantic Drift")]
    SemanticDrift,
    #[serde(rename = "AI Watermark")]
    AiWatermark,
    #[serde(rename = "Uniform Style")]
    UniformStyle,
    #[serde(rename = "AI-Generated")]
    AiGenerated,
}

impl PatternCategory {
    pub const ALL: [PatternCategory; 5] = [
        Self::LowPerplexity,
        Self::SemanticDrift,
        Self::AiWatermark,
        Self::UniformStyle,
        Self::AiGenerated,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::LowPerplexity => "Low Perplexity",
            Self::SemanticDrift => "Semantic Drift",
            Self::AiWatermark => "AI Watermark",
            Self::UniformStyle => "Uniform Style",
            Self::AiGenerated => "AI-Generated",
        }
    }
}

impl fmt::Display for PatternCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternMatchResult {
    /// Highest composite similarity across suspicious entries, `[0, 100]`.
    pub similarity: f64,
    pub matched_patterns: BTreeSet<PatternCategory>,
    /// Suspicious entries whose own composite exceeded the match threshold.
    pub matched_article_count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternStats {
    pub total: usize,
    pub suspicious: usize,
}
