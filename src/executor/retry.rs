//! Retry combinator: rerun an async operation while its error matches a
//! predicate, pausing between attempts, under an overall deadline.

use std::{future::Future, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retry_count: usize,
    pub retry_delay: Duration,
    /// Deadline for all attempts together.
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retry_count: usize::MAX,
            retry_delay: Duration::from_secs(1),
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Error)]
pub enum RetryError<E> {
    #[error("gave up after {0:?}")]
    TimedOut(Duration),

    #[error(transparent)]
    Failed(E),
}

pub async fn retrying<T, E, F, Fut, P>(policy: &RetryPolicy, is_retryable: P, mut operation: F) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let attempts = async {
        let mut retries = 0usize;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) if retries < policy.max_retry_count && is_retryable(&error) => {
                    retries += 1;
                    log::warn!("attempt {retries} failed with retryable error: {error}");
                    tokio::time::sleep(policy.retry_delay).await;
                }
                Err(error) => return Err(RetryError::Failed(error)),
            }
        }
    };

    tokio::time::timeout(policy.timeout, attempts)
        .await
        .unwrap_or(Err(RetryError::TimedOut(policy.timeout)))
}
