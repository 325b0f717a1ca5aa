//! Orchestration of one authenticity analysis.
//!
//! A [`Submission`] is validated locally, scored by a [`ScoringOracle`]
//! under the retry executor, and compared against the local pattern history.
//! Persisting the result for future comparisons is a separate, explicit
//! step ([`Analyzer::remember`]).
//!
//! ```no_run
//! use fakesense_analyzer::{Analyzer, RecordedOracle, Submission};
//! use fakesense_patterns::{AnalysisScores, MemoryStore, PatternStore};
//!
//! # #[tokio::main]
//! # async fn main() -> fakesense_common::Result<()> {
//! let scores = AnalysisScores {
//!     overall_score: 42.0,
//!     perplexity_score: 30.0,
//!     semantic_score: 55.0,
//!     watermark_score: 38.0,
//!     writing_style_score: 45.0,
//!     ai_origin_probability: 71.0,
//!     style_signature: None,
//! };
//! let analyzer = Analyzer::new(RecordedOracle::new(scores), PatternStore::new(MemoryStore::default()));
//!
//! let report = analyzer.analyze(Submission::new("Some article text", None)?).await?;
//! analyzer.remember(&report);
//! # Ok(())
//! # }
//! ```

mod analyzer;
pub mod oracle;
mod submission;

pub use analyzer::{AnalysisReport, Analyzer};
pub use fakesense_retry::user_message;
pub use oracle::{OracleError, RecordedOracle, ScoringOracle};
pub use submission::{Submission, DEFAULT_MAX_TEXT_CHARS};
