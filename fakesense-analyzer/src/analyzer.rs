use fakesense_common::{FakesenseError, Result};
use fakesense_patterns::{
    AnalysisScores, KeyValueStore, PatternMatchResult, PatternStats, PatternStore, StoredPattern,
};
use fakesense_retry::{
    user_message, with_retry_cancellable, with_retry_notify, Interrupted, RetryOptions,
};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::oracle::{OracleError, ScoringOracle};
use crate::Submission;

/// Outcome of one analysis.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub submission: Submission,
    pub scores: AnalysisScores,
    pub is_suspicious: bool,
    /// Similarity to earlier suspicious analyses, when there is any.
    pub pattern_match: Option<PatternMatchResult>,
}

/// Scores submissions through an oracle and compares them with history.
pub struct Analyzer<O, S> {
    oracle: O,
    patterns: PatternStore<S>,
    retry: RetryOptions,
}

impl<O: ScoringOracle, S: KeyValueStore> Analyzer<O, S> {
    pub fn new(oracle: O, patterns: PatternStore<S>) -> Self {
        Self {
            oracle,
            patterns,
            retry: RetryOptions::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryOptions) -> Self {
        self.retry = retry;
        self
    }

    pub fn patterns(&self) -> &PatternStore<S> {
        &self.patterns
    }

    /// Score `submission` and match it against the pattern history.
    ///
    /// The oracle call is retried per the configured [`RetryOptions`]; the
    /// last failure is returned as [`FakesenseError::Oracle`] with its
    /// message unchanged. Nothing is persisted; see [`Analyzer::remember`].
    pub async fn analyze(&self, submission: Submission) -> Result<AnalysisReport> {
        let scores = with_retry_notify(
            || self.oracle.score(&submission),
            &self.retry,
            |attempt, err| self.log_retry(attempt, err),
        )
        .await
        .map_err(|err| self.oracle_failed(err))?;
        self.finish(submission, scores)
    }

    /// Like [`Analyzer::analyze`], abandoning the attempt or backoff in
    /// progress once `cancel` fires.
    pub async fn analyze_cancellable(
        &self,
        submission: Submission,
        cancel: &CancellationToken,
    ) -> Result<AnalysisReport> {
        let scores = with_retry_cancellable(
            || self.oracle.score(&submission),
            &self.retry,
            |attempt, err| self.log_retry(attempt, err),
            cancel,
        )
        .await
        .map_err(|err| match err {
            Interrupted::Cancelled => {
                tracing::info!(oracle = self.oracle.name(), "analyze.cancelled");
                FakesenseError::Cancelled
            }
            Interrupted::Failed(err) => self.oracle_failed(err),
        })?;
        self.finish(submission, scores)
    }

    /// Add a completed analysis to the history used by later matches.
    pub fn remember(&self, report: &AnalysisReport) -> Option<StoredPattern> {
        self.patterns.save(&report.scores, &report.submission.text)
    }

    pub fn pattern_stats(&self) -> PatternStats {
        self.patterns.stats()
    }

    pub fn forget_all(&self) -> Result<()> {
        self.patterns
            .clear()
            .map_err(|err| FakesenseError::Storage(err.to_string()))
    }

    fn finish(&self, submission: Submission, scores: AnalysisScores) -> Result<AnalysisReport> {
        if let Err(err) = scores.validate() {
            tracing::error!(oracle = self.oracle.name(), error = %err, "analyze.invalid_scores");
            return Err(FakesenseError::Oracle(
                anyhow::Error::new(OracleError::InvalidResponse(err.to_string())),
            ));
        }

        let pattern_match = self.patterns.match_patterns(&scores, &submission.text);
        let is_suspicious = scores.is_suspicious();
        tracing::info!(
            oracle = self.oracle.name(),
            overall = scores.overall_score,
            ai_origin = scores.ai_origin_probability,
            suspicious = is_suspicious,
            matched = pattern_match.is_some(),
            "analyze.complete"
        );

        Ok(AnalysisReport {
            submission,
            scores,
            is_suspicious,
            pattern_match,
        })
    }

    fn log_retry(&self, attempt: u32, err: &OracleError) {
        tracing::warn!(
            oracle = self.oracle.name(),
            attempt,
            error = %err,
            "analyze.oracle.retry"
        );
    }

    fn oracle_failed(&self, err: OracleError) -> FakesenseError {
        tracing::error!(
            oracle = self.oracle.name(),
            error = %err,
            shown = %user_message(&err),
            "analyze.oracle.failed"
        );
        FakesenseError::Oracle(anyhow::Error::new(err))
    }
}
