//! Text fingerprints for exact-recurrence detection.
//!
//! A fingerprint depends only on which long words a text uses most often,
//! never on scores, so resubmitting the same article always yields the same
//! token even when the oracle's scores drift between runs.

use std::collections::HashMap;

/// Words of this many characters or fewer are ignored.
pub const MAX_IGNORED_WORD_LEN: usize = 4;
/// Number of most frequent words folded into the fingerprint.
pub const TOP_WORDS: usize = 20;

/// Fingerprint of `text`: base-36 rolling hash of its [`key_phrase`].
///
/// ```
/// use fakesense_patterns::fingerprint;
///
/// let a = fingerprint("The Quick Brown Fox jumps over... The Quick Brown Fox!!");
/// let b = fingerprint("the quick brown fox jumps over the quick brown fox");
/// assert_eq!(a, b);
/// ```
pub fn fingerprint(text: &str) -> String {
    to_base36(rolling_hash(&key_phrase(text)).unsigned_abs())
}

/// The most frequent long words of `text`, most frequent first, joined by
/// single spaces. Ties keep first-occurrence order.
///
/// ```
/// use fakesense_patterns::fingerprint::key_phrase;
///
/// assert_eq!(
///     key_phrase("Markets rallied. Analysts said markets would keep rallying; markets!"),
///     "markets rallied analysts would rallying"
/// );
/// ```
pub fn key_phrase(text: &str) -> String {
    let normalized: String = text
        .to_lowercase()
        .chars()
        .filter(|c| is_word_char(*c) || is_js_space(*c))
        .collect();

    let mut counts: Vec<(&str, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for word in normalized
        .split(is_js_space)
        .filter(|w| w.len() > MAX_IGNORED_WORD_LEN)
    {
        match index.get(word) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                index.insert(word, counts.len());
                counts.push((word, 1));
            }
        }
    }

    // stable: equal counts stay in first-seen order
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .iter()
        .take(TOP_WORDS)
        .map(|(word, _)| *word)
        .collect::<Vec<_>>()
        .join(" ")
}

// ASCII-only, matching the `\w` class of the stored histories.
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

// The ECMAScript `\s` set. Differs from `char::is_whitespace` on U+0085 and U+FEFF.
fn is_js_space(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\u{0B}' | '\u{0C}' | '\r' | ' '
            | '\u{A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

/// 32-bit `h * 31 + unit` hash over UTF-16 code units.
fn rolling_hash(s: &str) -> i32 {
    s.encode_utf16().fold(0i32, |h, unit| {
        h.wrapping_shl(5).wrapping_sub(h).wrapping_add(i32::from(unit))
    })
}

fn to_base36(mut n: u32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}
