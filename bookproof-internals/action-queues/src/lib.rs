//! Bookproof Action Queues
//! Copyright (c) 2026 The Bookproof Authors
//! Licensed and distributed under either of
//!   * MIT license (license terms at the root of the package or at http://opensource.org/licenses/MIT).
//!   * Apache v2 license (license terms at the root of the package or at http://www.apache.org/licenses/LICENSE-2.0).
//! at your option. This file may not be copied, modified, or distributed except according to those terms.

//! bookproof-internals/action-queues
//! A simple work queue with fixed-interval retry for remote browser-automation calls

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::time;

/// Custom error for the work queue
#[derive(Debug, Error)]
pub enum ActionQueueError {
    #[error("attempts exhausted: {0}")]
    AttemptsExhausted(#[source] anyhow::Error),
    #[error("queue is closed")]
    QueueClosed,
}

/// An async semaphore for limiting concurrent operations
#[derive(Clone, Debug)]
struct AsyncSemaphore {
    inner: Arc<Semaphore>,
}

impl AsyncSemaphore {
    fn new(permits: usize) -> Self {
        Self {
            inner: Arc::new(Semaphore::new(permits)),
        }
    }

    async fn acquire(&self) -> Result<tokio::sync::SemaphorePermit<'_>, tokio::sync::AcquireError> {
        self.inner.acquire().await
    }
}

/// A simple work queue that serializes calls to a remote automation service
/// and retries failed calls at a fixed interval.
///
/// Remote automation servers fail mostly on startup races and page-load
/// timing, which clear within seconds, so retries use a flat interval with a
/// hard attempt cap rather than exponential backoff.
///
/// # Examples
///
/// Default policy (2 s between attempts, 5 attempts total):
/// ```ignore
/// let queue = ActionQueue::default();
/// ```
///
/// Custom policy:
/// ```ignore
/// let queue = ActionQueue::with_policy(Duration::from_millis(500), 3);
/// ```
#[derive(Clone, Debug)]
pub struct ActionQueue {
    semaphore: AsyncSemaphore,
    retry_interval: Duration,
    max_attempts: u32,
}

impl Default for ActionQueue {
    fn default() -> Self {
        Self {
            semaphore: AsyncSemaphore::new(1),
            retry_interval: Duration::from_secs(2),
            max_attempts: 5,
        }
    }
}

impl ActionQueue {
    /// Create a queue with a custom retry interval and total attempt cap.
    ///
    /// `max_attempts` counts the first try: a cap of 5 means one initial
    /// attempt plus up to four retries.
    pub fn with_policy(retry_interval: Duration, max_attempts: u32) -> Self {
        Self {
            semaphore: AsyncSemaphore::new(1),
            retry_interval,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Execute a function, retrying failures at the fixed interval.
    ///
    /// The function `f` should return `Result<T, anyhow::Error>`. Calls run
    /// under a single permit, so queued actions never overlap. When all
    /// attempts fail, the last error is returned wrapped in
    /// [`ActionQueueError::AttemptsExhausted`].
    pub async fn with_retry<T, F, Fut>(&self, mut f: F) -> Result<T, ActionQueueError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, anyhow::Error>>,
    {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| ActionQueueError::QueueClosed)?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            match f().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if attempt >= self.max_attempts {
                        return Err(ActionQueueError::AttemptsExhausted(e));
                    }
                    time::sleep(self.retry_interval).await;
                }
            }
        }
    }
}
