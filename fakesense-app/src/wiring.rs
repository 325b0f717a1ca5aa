use anyhow::{Context, Result};
use fakesense_config::{FakesenseConfig, FakesenseConfigLoader};
use fakesense_patterns::{AnalysisScores, FileStore, PatternStore};
use std::io::Read;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "fakesense.yaml";

/// `~/.config/fakesense/fakesense.yaml` (or the platform equivalent).
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("fakesense").join(CONFIG_FILE))
}

/// An explicit `--config` must exist; the default location is optional.
pub fn load_config(explicit: Option<&Path>) -> Result<FakesenseConfig> {
    let loader = match (explicit, default_config_path()) {
        (Some(path), _) => FakesenseConfigLoader::new().with_file(path),
        (None, Some(path)) => FakesenseConfigLoader::new().with_optional_file(path),
        (None, None) => FakesenseConfigLoader::new(),
    };
    let cfg = loader.load().context("loading configuration")?;
    Ok(cfg)
}

pub fn pattern_store(cfg: &FakesenseConfig) -> PatternStore<FileStore> {
    let dir = cfg.patterns.storage_dir();
    tracing::debug!(dir = %dir.display(), namespace = %cfg.patterns.namespace, "app.store");
    PatternStore::with_config(FileStore::new(dir), cfg.patterns.store_config())
}

/// Read a whole file, or stdin for `-`.
pub fn read_input(source: &str) -> Result<String> {
    if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(source).with_context(|| format!("reading {source}"))
}

/// Inline JSON object, or a path to a file containing one.
pub fn parse_scores(arg: &str) -> Result<AnalysisScores> {
    let raw = if arg.trim_start().starts_with('{') {
        arg.to_string()
    } else {
        read_input(arg)?
    };
    serde_json::from_str(&raw).context("parsing recorded scores")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCORES: &str = r#"{"overallScore":42,"perplexityScore":30,"semanticScore":55,
        "watermarkScore":38,"writingStyleScore":45,"aiOriginProbability":71}"#;

    #[test]
    fn scores_parse_inline_or_from_file() {
        let inline = parse_scores(SCORES).unwrap();
        assert_eq!(inline.overall_score, 42.0);
        assert!(inline.style_signature.is_none());

        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("scores.json");
        std::fs::write(&path, SCORES).unwrap();
        let from_file = parse_scores(path.to_str().unwrap()).unwrap();
        assert_eq!(from_file, inline);
    }

    #[test]
    fn malformed_scores_are_reported() {
        assert!(parse_scores(r#"{"overallScore":"high"}"#).is_err());
        assert!(parse_scores("/definitely/not/here.json").is_err());
    }

    #[test]
    fn explicit_config_must_exist() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&tmp.path().join("missing.yaml"))).is_err());

        let path = tmp.path().join("fakesense.yaml");
        std::fs::write(&path, "patterns:\n  namespace: cli-test\n").unwrap();
        let cfg = load_config(Some(&path)).unwrap();
        assert_eq!(cfg.patterns.namespace, "cli-test");
    }
}
