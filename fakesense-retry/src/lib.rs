//! Bounded retry with exponential backoff for remote calls.
//!
//! - [`with_retry`] / [`with_retry_notify`]: run an async operation until it
//!   succeeds or the attempt budget in [`RetryOptions`] is spent; the final
//!   error is handed back unchanged.
//! - [`with_retry_cancellable`]: same loop, abortable via a
//!   [`CancellationToken`](tokio_util::sync::CancellationToken).
//! - [`classify`]: pure helpers that map failures to user-facing text.
//!
//! ```
//! use fakesense_retry::{with_retry, RetryOptions};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let answer: Result<u32, String> = with_retry(|| async { Ok(42) }, &RetryOptions::default()).await;
//! assert_eq!(answer, Ok(42));
//! # }
//! ```

pub mod classify;
mod executor;

pub use classify::{classify, is_network_error, user_message, ErrorClass};
pub use executor::{
    delay_schedule, with_retry, with_retry_cancellable, with_retry_notify, Interrupted,
    RetryOptions,
};
