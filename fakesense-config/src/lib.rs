//! Loader for FakeSense configuration with YAML + environment overlays.
//!
//! Sources are merged in order: YAML files and inline snippets as added,
//! then `FAKESENSE_`-prefixed environment variables, which always win.
//! Nested keys use `__` in variable names, so `FAKESENSE_RETRY__MAX_ATTEMPTS=5`
//! sets `retry.max_attempts`. `${VAR}` placeholders inside string values are
//! expanded after merging. Every field has a default; an empty document is a
//! valid configuration.
//!
//! ```yaml
//! retry:
//!   max_attempts: 3
//!   delay_ms: 1000
//!   backoff_multiplier: 2.0
//! patterns:
//!   storage_dir: "${HOME}/.fakesense"
//!   namespace: nexo-learned-patterns
//!   max_patterns: 50
//!   category_scope: all_suspicious   # or matched_only
//! submission:
//!   max_text_chars: 50000
//! logging:
//!   filter: info
//!   format: text                     # or json
//!   emit_stderr: false
//! ```
use config::{Config, ConfigError, Environment, File, FileFormat};
use fakesense_common::observability::{LogConfig, LogFormat};
use fakesense_patterns::{CategoryScope, PatternStoreConfig, DEFAULT_NAMESPACE, MAX_PATTERNS};
use fakesense_retry::RetryOptions;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "FAKESENSE";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FakesenseConfig {
    pub version: Option<String>,
    pub retry: RetrySettings,
    pub patterns: PatternSettings,
    pub submission: SubmissionSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        let defaults = RetryOptions::default();
        Self {
            max_attempts: defaults.max_attempts,
            delay_ms: defaults.delay.as_millis() as u64,
            backoff_multiplier: defaults.backoff_multiplier,
        }
    }
}

impl RetrySettings {
    pub fn to_options(&self) -> RetryOptions {
        RetryOptions::default()
            .with_max_attempts(self.max_attempts)
            .with_delay(Duration::from_millis(self.delay_ms))
            .with_backoff_multiplier(self.backoff_multiplier)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternSettings {
    /// Directory holding the history files; platform data dir when unset.
    pub storage_dir: Option<PathBuf>,
    pub namespace: String,
    pub max_patterns: usize,
    pub category_scope: CategoryScope,
}

impl Default for PatternSettings {
    fn default() -> Self {
        Self {
            storage_dir: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
            max_patterns: MAX_PATTERNS,
            category_scope: CategoryScope::default(),
        }
    }
}

impl PatternSettings {
    /// Configured directory, or `<data dir>/fakesense`.
    pub fn storage_dir(&self) -> PathBuf {
        match &self.storage_dir {
            Some(dir) => PathBuf::from(shellexpand::tilde(&dir.to_string_lossy()).into_owned()),
            None => dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("fakesense"),
        }
    }

    pub fn store_config(&self) -> PatternStoreConfig {
        PatternStoreConfig {
            namespace: self.namespace.clone(),
            max_patterns: self.max_patterns,
            category_scope: self.category_scope,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionSettings {
    pub max_text_chars: usize,
}

impl Default for SubmissionSettings {
    fn default() -> Self {
        Self {
            max_text_chars: 50_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub filter: String,
    pub format: LogFormat,
    pub emit_stderr: bool,
    pub dir: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Text,
            emit_stderr: false,
            dir: None,
        }
    }
}

impl LoggingSettings {
    pub fn to_log_config(&self, app_name: &'static str) -> LogConfig {
        LogConfig {
            app_name,
            log_dir: self.dir.clone(),
            emit_stderr: self.emit_stderr,
            format: self.format,
            default_filter: self.filter.clone(),
        }
    }
}

impl FakesenseConfig {
    /// Reject values the runtime cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |msg: &str| Err(ConfigError::Message(msg.to_string()));
        if self.retry.max_attempts < 1 {
            return fail("retry.max_attempts must be at least 1");
        }
        if !self.retry.backoff_multiplier.is_finite() || self.retry.backoff_multiplier < 1.0 {
            return fail("retry.backoff_multiplier must be a finite number >= 1");
        }
        if self.patterns.max_patterns < 1 {
            return fail("patterns.max_patterns must be at least 1");
        }
        if self.patterns.namespace.trim().is_empty() {
            return fail("patterns.namespace must not be empty");
        }
        if self.submission.max_text_chars < 1 {
            return fail("submission.max_text_chars must be at least 1");
        }
        Ok(())
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring.
pub struct FakesenseConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for FakesenseConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl FakesenseConfigLoader {
    /// Start from defaults; `FAKESENSE_` environment overrides are applied at [`load`](Self::load).
    ///
    /// ```
    /// use fakesense_config::FakesenseConfigLoader;
    ///
    /// let config = FakesenseConfigLoader::new()
    ///     .with_yaml_str("version: '1'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.patterns.max_patterns, 50);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist; format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is skipped when missing.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    ///
    /// ```
    /// use fakesense_config::FakesenseConfigLoader;
    /// use fakesense_patterns::CategoryScope;
    ///
    /// let cfg = FakesenseConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// retry:
    ///   max_attempts: 5
    /// patterns:
    ///   category_scope: matched_only
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.retry.max_attempts, 5);
    /// assert_eq!(cfg.retry.delay_ms, 1000);
    /// assert_eq!(cfg.patterns.category_scope, CategoryScope::MatchedOnly);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Merge all sources, expand `${VAR}` placeholders and validate.
    pub fn load(self) -> Result<FakesenseConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: FakesenseConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        typed.validate()?;
        Ok(typed)
    }
}
