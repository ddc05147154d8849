//! Bounded retry for network-involving package operations

use polyenv_errors::{Error, UserFacingError};
use polyenv_events::{AppEvent, EventEmitter, GeneralEvent};
use polyenv_types::RetryPolicy;
use std::future::Future;

fn millis(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Run `operation` until it succeeds or the policy is exhausted
///
/// Only errors that report themselves retryable are retried; anything else
/// fails on the spot. Attempt `n` (zero-based) waits `delay * n` first.
///
/// # Errors
///
/// Returns the last error once no further attempt is allowed.
pub async fn with_retry<E, T, F, Fut>(
    emitter: &E,
    policy: &RetryPolicy,
    operation: &str,
    mut f: F,
) -> Result<T, Error>
where
    E: EventEmitter + ?Sized,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Error>>,
{
    let mut attempts = 0u32;
    loop {
        let delay = policy.delay_before(attempts);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        attempts += 1;

        match f().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && policy.allows_retry(attempts) => {
                let next_delay = policy.delay_before(attempts);
                tracing::warn!(
                    operation,
                    attempt = attempts,
                    max_attempts = policy.max_attempts,
                    error = %err,
                    "attempt failed, retrying"
                );
                emitter.emit(AppEvent::General(GeneralEvent::RetryScheduled {
                    operation: operation.to_string(),
                    attempt: attempts,
                    max_attempts: policy.max_attempts,
                    delay_ms: millis(next_delay),
                    error: err.to_string(),
                }));
            }
            Err(err) => {
                if attempts > 1 {
                    emitter.emit(AppEvent::General(GeneralEvent::RetriesExhausted {
                        operation: operation.to_string(),
                        attempts,
                        error: err.to_string(),
                    }));
                }
                return Err(err);
            }
        }
    }
}
