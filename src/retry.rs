//! One retry-with-backoff utility for every external call. Delay doubles per
//! attempt starting from `base_delay`; the caller decides what to do when all
//! attempts are exhausted (per-company fetches are skipped, never fatal).

use std::future::Future;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Backoff {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

/// Run `op` up to `policy.max_attempts` times, sleeping with exponential
/// backoff between failures. Returns the first success or the last error.
pub async fn with_backoff<T, F, Fut>(label: &str, policy: Backoff, mut op: F) -> anyhow::Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let mut last_err = None;
    for attempt in 0..policy.max_attempts {
        if attempt > 0 {
            let delay = policy.delay_for(attempt - 1);
            warn!(
                "Retrying - op={}, attempt={}/{}, delay={:.1}s",
                label,
                attempt + 1,
                policy.max_attempts,
                delay.as_secs_f32()
            );
            tokio::time::sleep(delay).await;
        }
        match op().await {
            Ok(v) => return Ok(v),
            Err(e) => {
                warn!("Attempt failed - op={}, attempt={}, err={:#}", label, attempt + 1, e);
                last_err = Some(e);
            }
        }
    }
    Err(last_err.expect("at least one attempt"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let policy = Backoff::new(3, Duration::from_millis(1));
        let out = with_backoff("test", policy, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(anyhow!("transient"))
                } else {
                    Ok(42)
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(out, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausted_attempts_return_last_error() {
        let calls = AtomicU32::new(0);
        let policy = Backoff::new(2, Duration::from_millis(1));
        let out: anyhow::Result<()> = with_backoff("test", policy, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(anyhow!("still down")) }
        })
        .await;
        assert!(out.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn first_success_short_circuits() {
        let calls = AtomicU32::new(0);
        let policy = Backoff::new(5, Duration::from_millis(1));
        let out = with_backoff("test", policy, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok("ok") }
        })
        .await
        .unwrap();
        assert_eq!(out, "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
