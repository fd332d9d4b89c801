//! # Fixed-interval polling
//!
//! Polls a check function until it reports readiness, a fatal error, or the
//! accumulated wait exceeds the policy timeout. Waiting goes through a
//! [`Sleeper`] so tests can observe every pause without sleeping.
//!
//! Elapsed time is the sum of the sleeps taken, not wall-clock time; the
//! duration of the checks themselves is not counted. Intervals shorter than
//! [`MIN_INTERVAL`] are raised to it so the timeout is always reached.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

/// Shortest pause between two checks
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Something that can pause the current task
#[async_trait::async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait::async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
pub use recording::RecordingSleeper;


/// Interval and upper bound of a poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

/// Outcome of a single check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStatus<T> {
    /// Condition met
    Ready(T),
    /// Not yet; carries the observed state for the timeout report
    Pending(String),
}

/// Why a poll stopped without a value
#[derive(Debug)]
pub enum PollError<E> {
    /// The check failed; polling stops immediately
    Failed(E),
    /// Timeout reached before the check reported readiness
    TimedOut {
        waited: Duration,
        last_state: Option<String>,
    },
}

/// Fixed-interval poller
pub struct Poller<'a> {
    policy: PollPolicy,
    sleeper: &'a dyn Sleeper,
}

impl<'a> Poller<'a> {
    #[must_use]
    pub fn new(policy: PollPolicy, sleeper: &'a dyn Sleeper) -> Self {
        let policy = PollPolicy {
            interval: policy.interval.max(MIN_INTERVAL),
            ..policy
        };
        Self { policy, sleeper }
    }

    /// Run `check` until it is ready, fails, or the timeout is exhausted.
    ///
    /// The first check runs immediately. A check is never started once the
    /// next pause would push the accumulated wait past the timeout.
    ///
    /// # Arguments
    ///
    /// * `description` - What is being waited for, used in logs
    /// * `check` - Async check returning [`PollStatus`] or a fatal error
    pub async fn poll<T, E, F, Fut>(&self, description: &str, mut check: F) -> Result<T, PollError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<PollStatus<T>, E>>,
    {
        let mut waited = Duration::ZERO;
        let mut last_state = None;

        loop {
            match check().await.map_err(PollError::Failed)? {
                PollStatus::Ready(value) => return Ok(value),
                PollStatus::Pending(state) => {
                    debug!("Waiting for {} (state: {})", description, state);
                    last_state = Some(state);
                }
            }

            if waited + self.policy.interval > self.policy.timeout {
                return Err(PollError::TimedOut { waited, last_state });
            }
            self.sleeper.sleep(self.policy.interval).await;
            waited += self.policy.interval;
        }
    }
}
