//! Async test helpers
//!
//! Timeout wrappers around channel receives and hub subscriptions.

use std::future::Future;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};

use crate::sync::{ServerEvent, Subscription};

/// Default timeout duration for tests (5 seconds)
pub const DEFAULT_TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Short timeout for tests that expect silence (100ms)
pub const SHORT_TEST_TIMEOUT: Duration = Duration::from_millis(100);

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecvTimeoutError {
    #[error("receive operation timed out")]
    Timeout,

    #[error("channel closed")]
    Closed,
}

/// Helper for receiving from a channel with a timeout
pub async fn recv_timeout<T>(
    rx: &mut mpsc::Receiver<T>,
    duration: Duration,
) -> Result<T, RecvTimeoutError> {
    timeout(duration, rx.recv())
        .await
        .map_err(|_| RecvTimeoutError::Timeout)?
        .ok_or(RecvTimeoutError::Closed)
}

/// Next event on a hub subscription; panics on timeout or closed stream
pub async fn recv_event(subscription: &mut Subscription, duration: Duration) -> ServerEvent {
    match recv_timeout(&mut subscription.events, duration).await {
        Ok(event) => event,
        Err(e) => panic!("no event for {} within {:?}: {}", subscription.id, duration, e),
    }
}

/// Helper to assert a future completes within duration
pub async fn assert_completes_within<F, T>(duration: Duration, future: F) -> T
where
    F: Future<Output = T>,
{
    match timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => panic!("Future did not complete within {:?}", duration),
    }
}
