//! Common types and utilities shared across FakeSense crates.
//!
//! This crate defines the shared error type and the observability helpers
//! used throughout the FakeSense workspace. It stays dependency‑minimal so
//! every crate can depend on it without heavy transitive costs.
//!
//! # Overview
//!
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`FakesenseError`] and [`Result`]: Shared error handling
//!
//! # Examples
//!
//! ```rust
//! use fakesense_common::FakesenseError;
//!
//! let err = FakesenseError::Validation("Text is required".into());
//! assert_eq!(err.to_string(), "Text is required");
//! ```

pub mod observability;

/// Error types used across the FakeSense system.
///
/// Oracle and validation failures render their message verbatim so that
/// callers can classify them into user-facing text without unwrapping.
#[derive(thiserror::Error, Debug)]
pub enum FakesenseError {
    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A submission was rejected before reaching the scoring oracle.
    #[error("{0}")]
    Validation(String),

    /// The scoring oracle failed after the retry budget was spent.
    #[error("{0}")]
    Oracle(#[from] anyhow::Error),

    /// Durable history could not be modified.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The caller abandoned the analysis before it finished.
    #[error("Analysis cancelled")]
    Cancelled,
}

/// Convenient alias for results that use [`FakesenseError`].
pub type Result<T> = std::result::Result<T, FakesenseError>;
