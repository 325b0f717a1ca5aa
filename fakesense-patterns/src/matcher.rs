//! Similarity between a new analysis and suspicious precedents.
//!
//! The composite similarity of one stored entry is the sum, capped at 100, of:
//!
//! - score similarity (max 40): `40 - mean |Δ|` over perplexity, semantic,
//!   watermark and writing-style scores, floored at 0;
//! - fingerprint bonus (30 or 0): exact fingerprint equality;
//! - style similarity (max 30): `30 - mean |Δ|` over the four style axes,
//!   only when both sides carry a style signature.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::fingerprint::fingerprint;
use crate::types::{
    AnalysisScores, PatternCategory, PatternMatchResult, StoredPattern, StyleSignature,
    SUSPICIOUS_AI_ORIGIN_ABOVE,
};

pub const SCORE_SIMILARITY_MAX: f64 = 40.0;
pub const FINGERPRINT_BONUS: f64 = 30.0;
pub const STYLE_SIMILARITY_MAX: f64 = 30.0;
pub const COMPOSITE_MAX: f64 = 100.0;
/// Composite similarity an entry must exceed to count as a matched article.
pub const MATCH_THRESHOLD: f64 = 40.0;
/// Per-metric distance below which a category is recorded.
pub const CATEGORY_TOLERANCE: f64 = 15.0;

/// Which suspicious entries contribute category labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryScope {
    /// Every suspicious entry, whether or not its composite crossed
    /// [`MATCH_THRESHOLD`].
    #[default]
    AllSuspicious,
    /// Only entries counted in `matched_article_count`.
    MatchedOnly,
}

pub fn score_similarity(current: &AnalysisScores, stored: &AnalysisScores) -> f64 {
    (SCORE_SIMILARITY_MAX - mean_abs_diff(current.metrics(), stored.metrics())).max(0.0)
}

pub fn style_similarity(current: &StyleSignature, stored: &StyleSignature) -> f64 {
    (STYLE_SIMILARITY_MAX - mean_abs_diff(current.axes(), stored.axes())).max(0.0)
}

/// Composite similarity of `current` (whose text fingerprint is
/// `current_fingerprint`) against one stored entry.
pub fn composite_similarity(
    current: &AnalysisScores,
    current_fingerprint: &str,
    stored: &StoredPattern,
) -> f64 {
    let scores = score_similarity(current, &stored.scores);
    let bonus = if current_fingerprint == stored.text_fingerprint {
        FINGERPRINT_BONUS
    } else {
        0.0
    };
    let style = match (&current.style_signature, &stored.scores.style_signature) {
        (Some(a), Some(b)) => style_similarity(a, b),
        _ => 0.0,
    };
    (scores + bonus + style).min(COMPOSITE_MAX)
}

/// Categories `current` shares with one stored entry.
pub fn shared_categories(current: &AnalysisScores, stored: &AnalysisScores) -> Vec<PatternCategory> {
    let close = |a: f64, b: f64| (a - b).abs() < CATEGORY_TOLERANCE;
    let mut out = Vec::new();
    if close(current.perplexity_score, stored.perplexity_score) {
        out.push(PatternCategory::LowPerplexity);
    }
    if close(current.semantic_score, stored.semantic_score) {
        out.push(PatternCategory::SemanticDrift);
    }
    if close(current.watermark_score, stored.watermark_score) {
        out.push(PatternCategory::AiWatermark);
    }
    if close(current.writing_style_score, stored.writing_style_score) {
        out.push(PatternCategory::UniformStyle);
    }
    if current.ai_origin_probability > SUSPICIOUS_AI_ORIGIN_ABOVE
        && stored.ai_origin_probability > SUSPICIOUS_AI_ORIGIN_ABOVE
    {
        out.push(PatternCategory::AiGenerated);
    }
    out
}

/// Compare a new analysis of `text` against the suspicious entries of
/// `history`.
///
/// Returns `None` when there is no suspicious precedent or when the best
/// composite similarity is below [`MATCH_THRESHOLD`].
pub fn match_history(
    history: &[StoredPattern],
    scores: &AnalysisScores,
    text: &str,
    scope: CategoryScope,
) -> Option<PatternMatchResult> {
    let mut suspicious = history.iter().filter(|p| p.is_suspicious).peekable();
    suspicious.peek()?;

    let current_fingerprint = fingerprint(text);
    let mut max_similarity = 0.0f64;
    let mut matched_article_count = 0usize;
    let mut matched_patterns = BTreeSet::new();

    for stored in suspicious {
        let similarity = composite_similarity(scores, &current_fingerprint, stored);
        let matched = similarity > MATCH_THRESHOLD;
        if matched {
            matched_article_count += 1;
        }
        if matched || scope == CategoryScope::AllSuspicious {
            matched_patterns.extend(shared_categories(scores, &stored.scores));
        }
        max_similarity = max_similarity.max(similarity);
    }

    if max_similarity < MATCH_THRESHOLD {
        return None;
    }

    Some(PatternMatchResult {
        similarity: max_similarity,
        matched_patterns,
        matched_article_count,
    })
}

fn mean_abs_diff(a: [f64; 4], b: [f64; 4]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum::<f64>() / 4.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(metric: f64, ai: f64) -> AnalysisScores {
        AnalysisScores {
            overall_score: 30.0,
            perplexity_score: metric,
            semantic_score: metric,
            watermark_score: metric,
            writing_style_score: metric,
            ai_origin_probability: ai,
            style_signature: None,
        }
    }

    fn stored(scores: AnalysisScores, fp: &str, suspicious: bool) -> StoredPattern {
        StoredPattern {
            id: "1".into(),
            timestamp: 1,
            scores,
            text_fingerprint: fp.into(),
            is_suspicious: suspicious,
        }
    }

    fn style(v: f64) -> StyleSignature {
        StyleSignature {
            sentence_rhythm: v,
            punctuation_frequency: v,
            vocabulary_spread: v,
            token_transitions: v,
        }
    }

    #[test]
    fn score_similarity_decays_with_mean_distance() {
        assert_eq!(score_similarity(&scores(20.0, 0.0), &scores(20.0, 0.0)), 40.0);
        assert_eq!(score_similarity(&scores(20.0, 0.0), &scores(30.0, 0.0)), 30.0);
        assert_eq!(score_similarity(&scores(0.0, 0.0), &scores(40.0, 0.0)), 0.0);
        assert_eq!(score_similarity(&scores(0.0, 0.0), &scores(90.0, 0.0)), 0.0);
    }

    #[test]
    fn style_only_counts_when_both_sides_have_it() {
        let mut current = scores(20.0, 0.0);
        current.style_signature = Some(style(50.0));
        let plain = stored(scores(20.0, 0.0), "x", true);
        assert_eq!(composite_similarity(&current, "y", &plain), 40.0);

        let mut styled = plain.clone();
        styled.scores.style_signature = Some(style(40.0));
        assert_eq!(composite_similarity(&current, "y", &styled), 60.0);
    }

    #[test]
    fn composite_is_capped_at_one_hundred() {
        let mut current = scores(20.0, 0.0);
        current.style_signature = Some(style(10.0));
        let mut entry = stored(current.clone(), "fp", true);
        entry.scores.style_signature = Some(style(10.0));
        assert_eq!(composite_similarity(&current, "fp", &entry), 100.0);
    }

    #[test]
    fn empty_or_clean_history_yields_nothing() {
        assert!(match_history(&[], &scores(20.0, 80.0), "text", CategoryScope::default()).is_none());
        let clean = vec![stored(scores(20.0, 10.0), "x", false)];
        assert!(match_history(&clean, &scores(20.0, 10.0), "text", CategoryScope::default()).is_none());
    }

    #[test]
    fn identical_precedent_reports_every_category() {
        let text = "Officials confirmed the unprecedented announcement yesterday";
        let history = vec![stored(scores(20.0, 80.0), &fingerprint(text), true)];

        let hit = match_history(&history, &scores(20.0, 80.0), text, CategoryScope::default())
            .expect("match");
        assert_eq!(hit.similarity, 70.0);
        assert_eq!(hit.matched_article_count, 1);
        assert_eq!(
            hit.matched_patterns,
            PatternCategory::ALL.into_iter().collect::<BTreeSet<_>>()
        );
    }

    #[test]
    fn exactly_forty_returns_result_without_counting() {
        // score similarity 40, different text: max hits the threshold but does not exceed it
        let history = vec![stored(scores(20.0, 10.0), "other", true)];
        let hit = match_history(&history, &scores(20.0, 10.0), "fresh text here", CategoryScope::default())
            .expect("threshold is inclusive for the result");
        assert_eq!(hit.similarity, 40.0);
        assert_eq!(hit.matched_article_count, 0);
    }

    #[test]
    fn below_threshold_is_no_match() {
        let history = vec![stored(scores(20.0, 80.0), "other", true)];
        assert!(match_history(&history, &scores(25.0, 80.0), "text", CategoryScope::default()).is_none());
    }

    #[test]
    fn category_scope_controls_unmatched_entries() {
        let text = "Repeated manipulated article submitted again";
        let fp = fingerprint(text);
        // fingerprint match, semantic score far off
        let mut strong = scores(20.0, 10.0);
        strong.semantic_score = 80.0;
        let history = vec![
            stored(strong, &fp, true),
            // composite 28, below threshold, but shares every category
            stored(
                AnalysisScores {
                    perplexity_score: 32.0,
                    semantic_score: 32.0,
                    watermark_score: 32.0,
                    writing_style_score: 32.0,
                    ai_origin_probability: 90.0,
                    ..scores(0.0, 0.0)
                },
                "unrelated",
                true,
            ),
        ];
        let mut current = scores(20.0, 70.0);
        current.semantic_score = 20.0;

        let all = match_history(&history, &current, text, CategoryScope::AllSuspicious).unwrap();
        let matched = match_history(&history, &current, text, CategoryScope::MatchedOnly).unwrap();

        assert_eq!(all.matched_article_count, 1);
        assert_eq!(matched.matched_article_count, 1);
        assert!(all.matched_patterns.contains(&PatternCategory::AiGenerated));
        assert!(!matched.matched_patterns.contains(&PatternCategory::AiGenerated));
        assert!(matched.matched_patterns.contains(&PatternCategory::LowPerplexity));
        assert!(!matched.matched_patterns.contains(&PatternCategory::SemanticDrift));
    }
}
