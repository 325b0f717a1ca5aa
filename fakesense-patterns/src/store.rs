use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fingerprint::fingerprint;
use crate::matcher::{match_history, CategoryScope};
use crate::storage::{KeyValueStore, StorageError};
use crate::types::{AnalysisScores, PatternMatchResult, PatternStats, StoredPattern};

/// Upper bound on retained history entries.
pub const MAX_PATTERNS: usize = 50;
/// Storage key the history lives under unless configured otherwise.
pub const DEFAULT_NAMESPACE: &str = "nexo-learned-patterns";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternStoreConfig {
    pub namespace: String,
    pub max_patterns: usize,
    pub category_scope: CategoryScope,
}

impl Default for PatternStoreConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            max_patterns: MAX_PATTERNS,
            category_scope: CategoryScope::default(),
        }
    }
}

/// Bounded, newest-first history of analyses kept in one storage slot.
///
/// Reads fail soft (unreadable history is an empty history) and writes are
/// best-effort (failures are logged, never returned), so the store cannot
/// break the analysis flow that feeds it. Read-modify-write cycles through
/// one `PatternStore` are serialised; give each tenant its own namespace.
pub struct PatternStore<S> {
    storage: S,
    config: PatternStoreConfig,
    write_lock: Mutex<()>,
}

impl<S: KeyValueStore> PatternStore<S> {
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, PatternStoreConfig::default())
    }

    pub fn with_config(storage: S, config: PatternStoreConfig) -> Self {
        Self {
            storage,
            config,
            write_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &PatternStoreConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Full history, newest first. Missing or corrupt data yields an empty list.
    pub fn load(&self) -> Vec<StoredPattern> {
        let raw = match self.storage.read(&self.config.namespace) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                tracing::warn!(
                    namespace = %self.config.namespace,
                    error = %err,
                    "patterns.load.read_failed"
                );
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<StoredPattern>>(&raw) {
            Ok(patterns) => patterns,
            Err(err) => {
                tracing::warn!(
                    namespace = %self.config.namespace,
                    error = %err,
                    bytes = raw.len(),
                    "patterns.load.corrupt"
                );
                Vec::new()
            }
        }
    }

    /// Record an analysis of `text`. Returns the stored entry, or `None` if
    /// it could not be persisted.
    pub fn save(&self, scores: &AnalysisScores, text: &str) -> Option<StoredPattern> {
        self.save_at(scores, text, Utc::now())
    }

    pub(crate) fn save_at(
        &self,
        scores: &AnalysisScores,
        text: &str,
        now: DateTime<Utc>,
    ) -> Option<StoredPattern> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut history = self.load();
        let timestamp = now.timestamp_millis();
        let pattern = StoredPattern {
            id: next_id(timestamp, history.first()),
            timestamp,
            scores: scores.clone(),
            text_fingerprint: fingerprint(text),
            is_suspicious: scores.is_suspicious(),
        };

        history.insert(0, pattern.clone());
        let evicted = history.len().saturating_sub(self.config.max_patterns);
        history.truncate(self.config.max_patterns);

        match self.persist(&history) {
            Ok(()) => {
                tracing::debug!(
                    id = %pattern.id,
                    suspicious = pattern.is_suspicious,
                    total = history.len(),
                    evicted,
                    "patterns.save"
                );
                Some(pattern)
            }
            Err(err) => {
                tracing::error!(
                    namespace = %self.config.namespace,
                    error = %err,
                    "patterns.save.failed"
                );
                None
            }
        }
    }

    /// Compare an analysis against stored suspicious entries.
    pub fn match_patterns(&self, scores: &AnalysisScores, text: &str) -> Option<PatternMatchResult> {
        let history = self.load();
        let result = match_history(&history, scores, text, self.config.category_scope);
        if let Some(hit) = &result {
            tracing::info!(
                similarity = hit.similarity,
                matched_articles = hit.matched_article_count,
                categories = ?hit.matched_patterns,
                "patterns.match"
            );
        }
        result
    }

    /// Drop the whole history.
    pub fn clear(&self) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.storage.remove(&self.config.namespace).inspect_err(|err| {
            tracing::error!(
                namespace = %self.config.namespace,
                error = %err,
                "patterns.clear.failed"
            );
        })?;
        tracing::info!(namespace = %self.config.namespace, "patterns.clear");
        Ok(())
    }

    pub fn stats(&self) -> PatternStats {
        let history = self.load();
        PatternStats {
            total: history.len(),
            suspicious: history.iter().filter(|p| p.is_suspicious).count(),
        }
    }

    fn persist(&self, history: &[StoredPattern]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(history)?;
        self.storage.write(&self.config.namespace, &raw)
    }
}

/// Millisecond id, bumped past the newest stored id when the clock has not moved.
fn next_id(timestamp: i64, newest: Option<&StoredPattern>) -> String {
    let floor = newest
        .and_then(|p| p.id.parse::<i64>().ok())
        .map(|id| id.saturating_add(1))
        .unwrap_or(i64::MIN);
    timestamp.max(floor).to_string()
}
