//! Bounded read-until-match polling.
//!
//! The daemon's list may lag behind a mutation that was just accepted (an added
//! torrent typically shows up a moment later). [`PollPolicy`] bounds how long the
//! client waits for it; [`Sleeper`] abstracts the wait so tests run without real
//! delays.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use utorrent_webapi::{PollDecision, PollPolicy};
//!
//! let policy = PollPolicy::new(Duration::from_millis(500), 2);
//! assert_eq!(policy.attempts(), 3);
//! assert_eq!(policy.after_miss(1), PollDecision::Wait(Duration::from_millis(500)));
//! assert_eq!(policy.after_miss(3), PollDecision::GiveUp);
//! ```

use std::time::Duration;

use async_trait::async_trait;

/// Default delay between list refreshes.
pub const DEFAULT_POLL_DELAY: Duration = Duration::from_secs(1);

/// Default number of additional attempts after the first.
pub const DEFAULT_POLL_RETRIES: u32 = 3;

/// Waits between poll attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, delay: Duration);
}

/// [`Sleeper`] backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

/// What to do after an attempt that did not find the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollDecision {
    /// Sleep for the delay, then try again.
    Wait(Duration),
    /// Budget exhausted.
    GiveUp,
}

/// Delay and retry budget for a bounded poll.
///
/// Total attempts are `retries + 1`. The delay falls only between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    delay: Duration,
    retries: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_DELAY, DEFAULT_POLL_RETRIES)
    }
}

impl PollPolicy {
    #[must_use]
    pub fn new(delay: Duration, retries: u32) -> Self {
        Self { delay, retries }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    #[must_use]
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Total attempts, including the first.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Decision after `attempt` (1-indexed) missed.
    #[must_use]
    pub fn after_miss(&self, attempt: u32) -> PollDecision {
        if attempt >= self.attempts() {
            PollDecision::GiveUp
        } else {
            PollDecision::Wait(self.delay)
        }
    }
}
