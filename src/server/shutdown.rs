// Shutdown drain module
// Waits for in-flight connections once the listener is closed

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::logger;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Wait until `active` drops to zero or `timeout` elapses.
///
/// Returns the number of connections still open when the wait ended.
/// Connections left open are not aborted here; they end with the runtime.
pub async fn drain_connections(active: &AtomicUsize, timeout: Duration) -> usize {
    logger::log_shutdown_started(active.load(Ordering::SeqCst));

    let deadline = tokio::time::Instant::now() + timeout;
    let mut remaining = active.load(Ordering::SeqCst);

    while remaining > 0 && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(POLL_INTERVAL).await;
        remaining = active.load(Ordering::SeqCst);
    }

    logger::log_shutdown_complete(remaining);
    remaining
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_returns_immediately_when_idle() {
        let active = AtomicUsize::new(0);
        assert_eq!(drain_connections(&active, Duration::from_secs(5)).await, 0);
    }

    #[tokio::test]
    async fn test_waits_for_connections_to_finish() {
        let active = Arc::new(AtomicUsize::new(2));
        let worker = Arc::clone(&active);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(60)).await;
            worker.fetch_sub(2, Ordering::SeqCst);
        });

        assert_eq!(drain_connections(&active, Duration::from_secs(5)).await, 0);
    }

    #[tokio::test]
    async fn test_gives_up_after_timeout() {
        let active = AtomicUsize::new(1);
        assert_eq!(drain_connections(&active, Duration::from_millis(100)).await, 1);
    }
}
