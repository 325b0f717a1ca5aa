//! Local "self-learning" pattern history for authenticity analyses.
//!
//! A [`PatternStore`] keeps a bounded, newest-first history of past
//! [`AnalysisScores`] under one key of a [`KeyValueStore`], and compares new
//! submissions against the entries that were flagged as suspicious.
//!
//! ```
//! use fakesense_patterns::{AnalysisScores, MemoryStore, PatternStore};
//!
//! let store = PatternStore::new(MemoryStore::default());
//! let scores = AnalysisScores {
//!     overall_score: 30.0,
//!     perplexity_score: 20.0,
//!     semantic_score: 20.0,
//!     watermark_score: 20.0,
//!     writing_style_score: 20.0,
//!     ai_origin_probability: 80.0,
//!     style_signature: None,
//! };
//! let text = "Breaking coverage: officials confirmed officials confirmed everything.";
//!
//! assert!(store.match_patterns(&scores, text).is_none());
//! store.save(&scores, text);
//!
//! let hit = store.match_patterns(&scores, text).expect("suspicious precedent");
//! assert_eq!(hit.matched_article_count, 1);
//! assert_eq!(hit.similarity, 70.0);
//! ```

pub mod fingerprint;
pub mod matcher;
pub mod storage;
mod store;
mod types;

pub use fingerprint::fingerprint;
pub use matcher::{match_history, CategoryScope};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use store::{PatternStore, PatternStoreConfig, DEFAULT_NAMESPACE, MAX_PATTERNS};
pub use types::{
    AnalysisScores, PatternCategory, PatternMatchResult, PatternStats, ScoreError,
    StoredPattern, StyleSignature,
};
