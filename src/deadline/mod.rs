//! DeadlineGuard: a scoped wall-clock bound around a blocking wait.
//!
//! Arming a guard spawns a monitor task that cancels the guard's
//! [`CancellationToken`] once the timeout elapses. The guarded future is
//! raced against that token; whichever finishes first decides the outcome.
//!
//! The monitor is aborted when the guard is dropped, so every exit path
//! (completion, error, timeout or the caller dropping the future) tears the
//! deadline down. No process-wide state is involved: any number of guards
//! may be armed at once and each one only ever cancels its own token.


use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::TimeoutError;

pub struct DeadlineGuard {
    operation: &'static str,
    timeout: Duration,
    token: CancellationToken,
    monitor: JoinHandle<()>,
}

impl DeadlineGuard {
    /// Arms a new deadline. Must be called from within a tokio runtime.
    pub fn arm(
        operation: &'static str,
        timeout: Duration,
    ) -> Self {
        let token = CancellationToken::new();
        let monitor_token = token.clone();
        let monitor = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            debug!("deadline for {operation} expired after {timeout:?}");
            monitor_token.cancel();
        });

        Self {
            operation,
            timeout,
            token,
            monitor,
        }
    }

    #[cfg(test)]
    pub(crate) fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Drives `fut` until it completes or the deadline fires, then disarms.
    pub async fn run<F, T>(
        self,
        fut: F,
    ) -> std::result::Result<T, TimeoutError>
    where
        F: Future<Output = T>,
    {
        tokio::select! {
            biased;
            output = fut => Ok(output),
            _ = self.token.cancelled() => Err(TimeoutError {
                operation: self.operation,
                after: self.timeout,
            }),
        }
    }
}

impl Drop for DeadlineGuard {
    fn drop(&mut self) {
        self.monitor.abort();
    }
}

/// Runs `fut` under a freshly armed [`DeadlineGuard`].
pub async fn with_deadline<F, T>(
    operation: &'static str,
    timeout: Duration,
    fut: F,
) -> std::result::Result<T, TimeoutError>
where
    F: Future<Output = T>,
{
    DeadlineGuard::arm(operation, timeout).run(fut).await
}
