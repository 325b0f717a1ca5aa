//! Failure classification and user-facing messages.
//!
//! Classification looks only at the rendered message of an error, so it
//! works for any `Display` type, including errors from other crates.

use std::fmt::Display;

pub const NETWORK_MESSAGE: &str = "Network error. Please check your connection and try again.";
pub const RATE_LIMIT_MESSAGE: &str = "Too many requests. Please wait a moment and try again.";
pub const TIMEOUT_MESSAGE: &str = "Request timed out. Please try again.";
pub const FALLBACK_MESSAGE: &str = "An unexpected error occurred. Please try again.";

const NETWORK_MARKERS: [&str; 5] = [
    "network",
    "fetch",
    "timeout",
    "failed to fetch",
    "connection",
];

/// Coarse class of a failure, checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Network,
    RateLimited,
    Timeout,
    /// Anything else with a message worth showing as-is.
    Other,
    /// No message at all.
    Unknown,
}

/// True when the message mentions a connectivity problem (case-insensitive).
///
/// ```
/// use fakesense_retry::is_network_error;
///
/// assert!(is_network_error(&"Network request failed: fetch error"));
/// assert!(!is_network_error(&"foo bar"));
/// ```
pub fn is_network_error<E: Display + ?Sized>(error: &E) -> bool {
    let message = error.to_string().to_lowercase();
    NETWORK_MARKERS.iter().any(|m| message.contains(m))
}

pub fn classify<E: Display + ?Sized>(error: &E) -> ErrorClass {
    let message = error.to_string();
    if message.trim().is_empty() {
        return ErrorClass::Unknown;
    }
    if is_network_error(&message) {
        return ErrorClass::Network;
    }
    // only the network markers ignore case
    if message.contains("rate limit") {
        ErrorClass::RateLimited
    } else if message.contains("timeout") {
        ErrorClass::Timeout
    } else {
        ErrorClass::Other
    }
}

/// Text suitable for showing to the person who triggered the failing call.
///
/// ```
/// use fakesense_retry::classify::{user_message, RATE_LIMIT_MESSAGE};
///
/// assert_eq!(user_message(&"rate limit exceeded"), RATE_LIMIT_MESSAGE);
/// assert_eq!(user_message(&"foo bar"), "foo bar");
/// ```
pub fn user_message<E: Display + ?Sized>(error: &E) -> String {
    match classify(error) {
        ErrorClass::Network => NETWORK_MESSAGE.to_string(),
        ErrorClass::RateLimited => RATE_LIMIT_MESSAGE.to_string(),
        ErrorClass::Timeout => TIMEOUT_MESSAGE.to_string(),
        ErrorClass::Other => error.to_string(),
        ErrorClass::Unknown => FALLBACK_MESSAGE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("{0}")]
    struct Boom(String);

    #[test]
    fn network_markers_are_case_insensitive() {
        for msg in [
            "Network request failed: fetch error",
            "FAILED TO FETCH",
            "Connection reset by peer",
            "operation Timeout after 30s",
        ] {
            assert!(is_network_error(msg), "{msg}");
            assert_eq!(classify(msg), ErrorClass::Network);
        }
    }

    #[test]
    fn rate_limit_maps_to_throttling_message() {
        assert_eq!(user_message("rate limit exceeded"), RATE_LIMIT_MESSAGE);
        assert_eq!(user_message("upstream: rate limit hit"), RATE_LIMIT_MESSAGE);
    }

    #[test]
    fn rate_limit_match_is_case_sensitive() {
        let server = "Rate limit exceeded. Please try again later.";
        assert_eq!(classify(server), ErrorClass::Other);
        assert_eq!(user_message(server), server);
    }

    #[test]
    fn network_takes_precedence_over_rate_limit() {
        assert_eq!(
            user_message("rate limit hit on connection pool"),
            NETWORK_MESSAGE
        );
    }

    #[test]
    fn other_messages_pass_through() {
        assert_eq!(user_message("foo bar"), "foo bar");
        assert_eq!(user_message(&Boom("AI credits exhausted".into())), "AI credits exhausted");
    }

    #[test]
    fn empty_message_falls_back() {
        assert_eq!(classify(""), ErrorClass::Unknown);
        assert_eq!(user_message(&Boom("   ".into())), FALLBACK_MESSAGE);
    }
}
