//! Delayed one-shot tasks.
//!
//! The wheel reveals a spin result only after the rotation animation has had
//! time to play. `ScheduledTask` runs a single completion callback after a
//! fixed delay on the tokio runtime and hands its output back through `join`.

use crate::error::{AppError, AppResult};
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

pub struct ScheduledTask<T> {
    handle: JoinHandle<T>,
}

impl<T: Send + 'static> ScheduledTask<T> {
    /// Schedule `on_complete` to run once `delay` has elapsed.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F, Fut>(delay: Duration, on_complete: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            on_complete().await
        });
        Self { handle }
    }

    /// 取消后回调不会执行
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// 等待回调完成并取得其结果
    pub async fn join(self) -> AppResult<T> {
        self.handle.await.map_err(|e| {
            if e.is_cancelled() {
                AppError::InternalError("scheduled task was cancelled".into())
            } else {
                AppError::InternalError(format!("scheduled task failed: {e}"))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_runs_once_after_delay() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let task = ScheduledTask::schedule(Duration::from_millis(5000), move || async move {
            counter.fetch_add(1, Ordering::SeqCst) + 1
        });

        tokio::time::sleep(Duration::from_millis(4999)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert_eq!(task.join().await.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_skips_callback() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let task = ScheduledTask::schedule(Duration::from_secs(1), move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        task.cancel();
        assert!(task.join().await.is_err());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
