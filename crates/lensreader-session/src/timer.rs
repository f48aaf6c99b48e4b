//! Single-slot debounce timer.
//!
//! The reader stream has no "tag removed" line; a tag is considered lifted
//! when no read arrives for the configured timeout. [`DebounceTimer`] holds at
//! most one pending deadline. Arming replaces it, cancelling clears it, and a
//! fired timer disarms itself, so a stale deadline can never produce a second
//! tap off.

use std::future;
use std::time::Duration;
use tokio::time::Instant;

/// Trailing-edge inactivity timer.
///
/// # Examples
///
/// ```
/// use lensreader_session::DebounceTimer;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let mut timer = DebounceTimer::new(Duration::from_millis(10));
///     assert!(!timer.is_armed());
///
///     timer.arm();
///     timer.fired().await;
///     assert!(!timer.is_armed());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DebounceTimer {
    timeout: Duration,
    deadline: Option<Instant>,
}

impl DebounceTimer {
    /// Create a disarmed timer.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            deadline: None,
        }
    }

    /// Inactivity window.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Pending deadline, if armed.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether a deadline is pending.
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Start the window from now, replacing any pending deadline.
    pub fn arm(&mut self) {
        self.deadline = Some(Instant::now() + self.timeout);
    }

    /// Drop the pending deadline. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// Wait for the pending deadline, then disarm.
    ///
    /// Never completes while disarmed. Cancel safe: dropping the future
    /// leaves the deadline in place.
    pub async fn fired(&mut self) {
        match self.deadline {
            Some(deadline) => {
                tokio::time::sleep_until(deadline).await;
                self.deadline = None;
            }
            None => future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_millis(500);

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_timeout() {
        let mut timer = DebounceTimer::new(TIMEOUT);
        let start = Instant::now();

        timer.arm();
        timer.fired().await;

        assert_eq!(start.elapsed(), TIMEOUT);
        assert!(!timer.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_pushes_deadline() {
        let mut timer = DebounceTimer::new(TIMEOUT);
        let start = Instant::now();

        timer.arm();
        tokio::time::sleep(Duration::from_millis(300)).await;
        timer.arm();
        timer.fired().await;

        assert_eq!(start.elapsed(), Duration::from_millis(800));
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarmed_timer_never_fires() {
        let mut timer = DebounceTimer::new(TIMEOUT);
        timer.arm();
        assert!(timer.cancel());

        let result = tokio::time::timeout(Duration::from_secs(10), timer.fired()).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut timer = DebounceTimer::new(TIMEOUT);
        assert!(!timer.cancel());
        assert!(!timer.cancel());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_wait_keeps_deadline() {
        let mut timer = DebounceTimer::new(TIMEOUT);
        timer.arm();
        let deadline = timer.deadline();

        let early = tokio::time::timeout(Duration::from_millis(100), timer.fired()).await;
        assert!(early.is_err());
        assert_eq!(timer.deadline(), deadline);

        timer.fired().await;
        assert!(!timer.is_armed());
    }
}
