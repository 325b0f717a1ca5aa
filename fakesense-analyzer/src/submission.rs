use fakesense_common::{FakesenseError, Result};
use serde::Serialize;

/// Longest text forwarded to the oracle, in characters.
pub const DEFAULT_MAX_TEXT_CHARS: usize = 50_000;

const PDF_MAGIC: &str = "%PDF-";

/// Article text (and optional headline) accepted for analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(skip)]
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    /// Character count before truncation.
    pub original_chars: usize,
    pub truncated: bool,
}

impl Submission {
    pub fn new(text: impl Into<String>, headline: Option<&str>) -> Result<Self> {
        Self::with_limit(text, headline, DEFAULT_MAX_TEXT_CHARS)
    }

    /// Validate `text`, cutting it to `max_chars` characters.
    ///
    /// ```
    /// use fakesense_analyzer::Submission;
    ///
    /// let s = Submission::with_limit("abcdef", Some("  "), 4).unwrap();
    /// assert_eq!(s.text, "abcd");
    /// assert!(s.truncated);
    /// assert_eq!(s.headline, None);
    ///
    /// assert!(Submission::new("   ", None).is_err());
    /// assert!(Submission::new("%PDF-1.7 ...", None).is_err());
    /// ```
    pub fn with_limit(
        text: impl Into<String>,
        headline: Option<&str>,
        max_chars: usize,
    ) -> Result<Self> {
        let mut text = text.into();
        if text.trim().is_empty() {
            return Err(FakesenseError::Validation("Text is required".into()));
        }
        if text.starts_with(PDF_MAGIC) || text.contains('\0') {
            return Err(FakesenseError::Validation(
                "Binary or PDF files cannot be analyzed. Please paste plain text or use a .txt file."
                    .into(),
            ));
        }

        let original_chars = text.chars().count();
        let truncated = original_chars > max_chars;
        if truncated {
            let cut = text
                .char_indices()
                .nth(max_chars)
                .map(|(i, _)| i)
                .unwrap_or(text.len());
            text.truncate(cut);
            tracing::info!(original_chars, max_chars, "submission.truncated");
        }

        let headline = headline
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(str::to_string);

        Ok(Self {
            text,
            headline,
            original_chars,
            truncated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_short_text_untouched() {
        let s = Submission::new("  An article.  ", Some(" Big News ")).unwrap();
        assert_eq!(s.text, "  An article.  ");
        assert_eq!(s.headline.as_deref(), Some("Big News"));
        assert_eq!(s.original_chars, 15);
        assert!(!s.truncated);
    }

    #[test]
    fn truncates_on_char_boundaries() {
        let s = Submission::with_limit("ééééé", None, 3).unwrap();
        assert_eq!(s.text, "ééé");
        assert_eq!(s.original_chars, 5);
        assert!(s.truncated);
    }

    #[test]
    fn limit_equal_to_length_is_not_truncation() {
        let s = Submission::with_limit("abc", None, 3).unwrap();
        assert_eq!(s.text, "abc");
        assert!(!s.truncated);
    }

    #[test]
    fn rejects_blank_and_binary_text() {
        for bad in ["", " \n\t ", "%PDF-1.4 stream", "plain\0text"] {
            let err = Submission::new(bad, None).unwrap_err();
            assert!(matches!(err, FakesenseError::Validation(_)), "{bad:?}");
        }
        let msg = Submission::new("", None).unwrap_err().to_string();
        assert_eq!(msg, "Text is required");
    }

    #[test]
    fn pdf_marker_only_counts_at_start() {
        assert!(Submission::new("see attached %PDF-1.4", None).is_ok());
    }

    #[test]
    fn serialized_form_omits_text() {
        let s = Submission::new("secret body", None).unwrap();
        let v = serde_json::to_value(&s).unwrap();
        assert!(v.get("text").is_none());
        assert_eq!(v["originalChars"], 11);
    }
}
