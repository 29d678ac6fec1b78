//! Retry with exponential backoff for page fetches.
//!
//! Retriable errors:
//! - [`ScraperError::RateLimited`] (HTTP 429)
//! - [`ScraperError::Http`] (connect failures, timeouts, truncated bodies)
//! - [`ScraperError::UnexpectedStatus`] with a 5xx status
//!
//! Everything else is returned on the first attempt: 404s, other 4xx
//! statuses, malformed URLs and local file errors would fail the same way
//! again.
//!
//! Backoff schedule with `backoff_base_secs = 2` and `max_retries = 3`:
//!
//! | retry | delay |
//! |-------|-------|
//! | 1     | 2 s   |
//! | 2     | 4 s   |
//! | 3     | 8 s   |
//!
//! A 429 carrying a longer `Retry-After` waits that long instead.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// Whether `err` is worth another attempt after a pause.
fn is_retriable(err: &ScraperError) -> bool {
    match err {
        ScraperError::RateLimited { .. } | ScraperError::Http(_) => true,
        ScraperError::UnexpectedStatus { status, .. } => *status >= 500,
        ScraperError::NotFound { .. }
        | ScraperError::InvalidUrl { .. }
        | ScraperError::SaveFile { .. }
        | ScraperError::TargetDir { .. } => false,
    }
}

/// Seconds to wait before retry number `attempt + 1`: `base * 2^attempt`,
/// stretched to a server-supplied `Retry-After` when that is longer.
fn backoff_delay_secs(err: &ScraperError, attempt: u32, backoff_base_secs: u64) -> u64 {
    let exponential = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
    match err {
        ScraperError::RateLimited {
            retry_after_secs, ..
        } if backoff_base_secs > 0 => exponential.max(*retry_after_secs),
        _ => exponential,
    }
}

/// Runs `operation`, retrying transient failures up to `max_retries` extra
/// times. The last error is returned once retries are exhausted.
///
/// `operation` is called afresh for every attempt, so it must build its own
/// request each time. Each retry is logged at `warn` with the attempt number
/// and the chosen delay.
///
/// A `backoff_base_secs` of zero disables sleeping entirely, `Retry-After`
/// included.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if !is_retriable(&err) || attempt >= max_retries => return Err(err),
            Err(err) => err,
        };

        let delay_secs = backoff_delay_secs(&err, attempt, backoff_base_secs);
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %err,
            "transient fetch error, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}
