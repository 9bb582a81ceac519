//! Append-with-retry - the destination-mutating append behind a bounded
//! retry policy.
//!
//! The host exposes a brief window after project/timeline switches where
//! its object graph is not yet consistent: the media-pool handle resolves
//! to nothing, or a call fails with the "callable resolved to nothing"
//! defect. The retry policy treats exactly that window as transient and
//! fails fast on anything else so genuine errors are not masked.

use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::host::HostMediaPool;
use crate::models::AppendList;

/// Bounded retry budget with a fixed backoff delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Sleep between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }
}

/// Attempt the host's bulk-append primitive under the retry policy.
///
/// The pool handle is re-acquired through `acquire_pool` on every attempt,
/// since an absent handle is itself the transient condition being retried.
/// Per-attempt classification:
///
/// - no pool handle: transient, sleep, retry
/// - transient host error (null handle / not-callable): sleep, retry
/// - falsy append result: transient, sleep, retry
/// - any other host error: fatal, abort immediately
/// - truthy append result: success
///
/// Returns false once the budget is exhausted or a fatal error occurs;
/// never panics or propagates an error past this boundary.
pub fn append_with_retry<P, F>(
    mut acquire_pool: F,
    clips: &AppendList<P::Media>,
    policy: &RetryPolicy,
) -> bool
where
    P: HostMediaPool,
    F: FnMut() -> Option<P>,
{
    for attempt in 1..=policy.max_attempts {
        debug!(
            "append attempt {}/{} ({} entries)",
            attempt,
            policy.max_attempts,
            clips.len()
        );

        match acquire_pool() {
            None => {
                warn!("media pool handle is absent (attempt {})", attempt);
            }
            Some(pool) => match pool.append_to_timeline(clips.entries()) {
                Ok(true) => {
                    info!("append succeeded on attempt {}", attempt);
                    return true;
                }
                Ok(false) => {
                    warn!("append returned an empty result (attempt {})", attempt);
                }
                Err(e) if e.is_transient() => {
                    warn!("transient host failure (attempt {}): {}", attempt, e);
                }
                Err(e) => {
                    error!("fatal append failure, not retrying: {}", e);
                    return false;
                }
            },
        }

        if attempt < policy.max_attempts {
            debug!("waiting {:?} before retry", policy.delay);
            thread::sleep(policy.delay);
        }
    }

    error!("append failed after {} attempts", policy.max_attempts);
    false
}
