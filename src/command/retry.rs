// src/command/retry.rs

use std::future::Future;
use std::time::Duration;

use tracing::{debug, trace};

use crate::errors::{CastleError, Result};

/// Poll `predicate` until it returns `true`, at most `max_attempts` times.
///
/// Sleeps `poll_interval` between attempts (not after the last one). Fails
/// with [`CastleError::WaitTimeout`] once the attempts are used up. An error
/// from the predicate itself is returned immediately.
pub async fn wait_for<F, Fut>(max_attempts: u32, poll_interval: Duration, mut predicate: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    for attempt in 1..=max_attempts {
        if predicate().await? {
            debug!(attempt, max_attempts, "condition became true");
            return Ok(());
        }
        trace!(attempt, max_attempts, "condition still false");
        if attempt < max_attempts {
            tokio::time::sleep(poll_interval).await;
        }
    }

    Err(CastleError::WaitTimeout {
        attempts: max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[tokio::test]
    async fn succeeds_on_first_true() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let res = wait_for(3, Duration::from_millis(10), move || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok::<_, CastleError>(n == 3)
        })
        .await;
        assert!(res.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let res = wait_for(3, Duration::from_millis(10), move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, CastleError>(false)
        })
        .await;
        assert!(matches!(res, Err(CastleError::WaitTimeout { attempts: 3 })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn predicate_errors_stop_polling() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let res = wait_for(5, Duration::from_millis(1), move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<bool, _>(CastleError::ConfigError("boom".to_string()))
        })
        .await;
        assert!(matches!(res, Err(CastleError::ConfigError(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
