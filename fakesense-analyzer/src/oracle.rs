use std::sync::Arc;

use async_trait::async_trait;
use fakesense_patterns::AnalysisScores;

use crate::Submission;

/// Failures reported by a scoring backend. Messages are phrased so the
/// retry classifier maps them to the right user-facing text.
#[derive(thiserror::Error, Debug)]
pub enum OracleError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Too many requests: rate limit exceeded")]
    RateLimited,

    #[error("AI credits exhausted. Please add credits to continue.")]
    CreditsExhausted,

    #[error("Invalid response format from AI: {0}")]
    InvalidResponse(String),

    #[error("AI service error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// External service that scores a submission's authenticity.
#[async_trait]
pub trait ScoringOracle: Send + Sync {
    async fn score(&self, submission: &Submission) -> Result<AnalysisScores, OracleError>;

    /// Name used in logs
    fn name(&self) -> &str {
        "oracle"
    }
}

#[async_trait]
impl<T: ScoringOracle + ?Sized> ScoringOracle for Arc<T> {
    async fn score(&self, submission: &Submission) -> Result<AnalysisScores, OracleError> {
        (**self).score(submission).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Oracle that returns previously recorded scores for every submission.
///
/// Used to replay an earlier analysis through the pattern history without
/// contacting a scoring service.
#[derive(Debug, Clone)]
pub struct RecordedOracle {
    scores: AnalysisScores,
}

impl RecordedOracle {
    pub fn new(scores: AnalysisScores) -> Self {
        Self { scores }
    }
}

#[async_trait]
impl ScoringOracle for RecordedOracle {
    async fn score(&self, _submission: &Submission) -> Result<AnalysisScores, OracleError> {
        Ok(self.scores.clone())
    }

    fn name(&self) -> &str {
        "recorded"
    }
}
