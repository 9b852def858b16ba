//! Elapsed-time counter for a recording session.

use esnotes_core::{EsnotesError, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

const TICK: Duration = Duration::from_secs(1);

/// Counts whole seconds on a background tokio task.
///
/// The task ends when the timer is stopped or dropped.
#[derive(Debug)]
pub struct SessionTimer {
    elapsed: Arc<AtomicU64>,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl SessionTimer {
    /// Starts counting from zero. Must be called inside a tokio runtime.
    pub fn start() -> Result<Self> {
        Self::start_from(0)
    }

    /// Starts counting from `initial` seconds.
    pub fn start_from(initial: u64) -> Result<Self> {
        let runtime = Handle::try_current()
            .map_err(|e| EsnotesError::internal(format!("Session timer needs a runtime: {}", e)))?;

        let elapsed = Arc::new(AtomicU64::new(initial));
        let cancel = CancellationToken::new();

        let counter = elapsed.clone();
        let token = cancel.clone();
        let handle = runtime.spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + TICK, TICK);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        counter.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
            tracing::debug!("[SessionTimer] Stopped");
        });

        Ok(Self {
            elapsed,
            cancel,
            handle: Some(handle),
        })
    }

    /// Seconds counted so far.
    pub fn elapsed(&self) -> u64 {
        self.elapsed.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Stops the task and returns the final count. Idempotent.
    pub fn stop(&mut self) -> u64 {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.elapsed()
    }
}

impl Drop for SessionTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn advance_secs(secs: u64) {
        for _ in 0..secs {
            tokio::time::advance(TICK).await;
            for _ in 0..3 {
                tokio::task::yield_now().await;
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_counts_seconds() {
        let timer = SessionTimer::start().unwrap();
        tokio::task::yield_now().await;
        assert_eq!(timer.elapsed(), 0);

        advance_secs(3).await;
        assert_eq!(timer.elapsed(), 3);
        assert!(timer.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_timer_no_longer_ticks() {
        let mut timer = SessionTimer::start_from(10).unwrap();
        tokio::task::yield_now().await;
        advance_secs(2).await;

        assert_eq!(timer.stop(), 12);
        assert!(!timer.is_running());

        advance_secs(5).await;
        assert_eq!(timer.elapsed(), 12);
        assert_eq!(timer.stop(), 12);
    }

    #[test]
    fn test_start_outside_runtime_fails() {
        assert!(SessionTimer::start().is_err());
    }
}
