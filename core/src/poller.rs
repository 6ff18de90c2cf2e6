//! Confirmation Poller
//!
//! Turns "eventually consistent, possibly never confirmed" ledger state into
//! one terminal outcome per request.
//!
//! ```text
//!  Submitted ──grace──▶ Polling ──┬── Complete ────────────▶ Confirmed
//!                         ▲       ├── Rejected(status) ────▶ Rejected
//!                         │       ├── Pending / Err ──┐
//!                         └──── sleep(interval) ◀─────┘
//!                                 │
//!                  attempt == max ├── last check Pending ──▶ TimedOut
//!                                 └── last check Err ──────▶ Failed
//! ```
//!
//! Dropping the returned future abandons the poll. The submitted computation
//! keeps running on the cluster either way.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use dcash_config::PollingConfig;
use tracing::{debug, info, warn};

/// What a single check observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus<T> {
    Pending,
    Complete(T),
    /// The program reported a nonzero status for the computation.
    Rejected { status_code: u8 },
}

/// Terminal result of a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    Confirmed { evidence: T, attempts: u32 },
    /// Ran out of attempts while every check was healthy.
    TimedOut { attempts: u32 },
    /// Ran out of attempts and the final check errored.
    Failed { attempts: u32, reason: String },
    Rejected { attempts: u32, status_code: u8 },
}

impl<T> PollOutcome<T> {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            Self::Confirmed { attempts, .. }
            | Self::TimedOut { attempts }
            | Self::Failed { attempts, .. }
            | Self::Rejected { attempts, .. } => *attempts,
        }
    }

    pub fn evidence(&self) -> Option<&T> {
        match self {
            Self::Confirmed { evidence, .. } => Some(evidence),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> PollOutcome<U> {
        match self {
            Self::Confirmed { evidence, attempts } => PollOutcome::Confirmed {
                evidence: f(evidence),
                attempts,
            },
            Self::TimedOut { attempts } => PollOutcome::TimedOut { attempts },
            Self::Failed { attempts, reason } => PollOutcome::Failed { attempts, reason },
            Self::Rejected {
                attempts,
                status_code,
            } => PollOutcome::Rejected {
                attempts,
                status_code,
            },
        }
    }
}

// ============================================================================
// Poller
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPoller {
    pub interval: Duration,
    pub max_attempts: u32,
    /// Waited once before the first attempt.
    pub initial_grace: Duration,
}

impl Default for ConfirmationPoller {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            max_attempts: 20,
            initial_grace: Duration::ZERO,
        }
    }
}

impl ConfirmationPoller {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
            initial_grace: Duration::ZERO,
        }
    }

    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.initial_grace = grace;
        self
    }

    /// Interval and attempts from config. Grace is left to the caller since
    /// only some operations need it.
    pub fn from_config(config: &PollingConfig) -> Self {
        Self::new(Duration::from_millis(config.interval_ms), config.max_attempts)
    }

    /// Runs `check` until it completes, is rejected, or attempts run out.
    ///
    /// `check` receives the 1-based attempt number. An `Err` is treated as
    /// "not yet" except on the final attempt, where it becomes `Failed`.
    pub async fn poll<T, E, F, Fut>(&self, label: &str, mut check: F) -> PollOutcome<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<CheckStatus<T>, E>>,
        E: Display,
    {
        if !self.initial_grace.is_zero() {
            debug!("{}: waiting {:?} before first check", label, self.initial_grace);
            tokio::time::sleep(self.initial_grace).await;
        }

        for attempt in 1..=self.max_attempts {
            tokio::time::sleep(self.interval).await;

            match check(attempt).await {
                Ok(CheckStatus::Complete(evidence)) => {
                    info!("{}: confirmed after {} attempt(s)", label, attempt);
                    return PollOutcome::Confirmed {
                        evidence,
                        attempts: attempt,
                    };
                }
                Ok(CheckStatus::Rejected { status_code }) => {
                    warn!("{}: rejected with status {}", label, status_code);
                    return PollOutcome::Rejected {
                        attempts: attempt,
                        status_code,
                    };
                }
                Ok(CheckStatus::Pending) => {
                    debug!("{}: attempt {}/{} pending", label, attempt, self.max_attempts);
                }
                Err(e) if attempt == self.max_attempts => {
                    warn!("{}: final attempt failed: {}", label, e);
                    return PollOutcome::Failed {
                        attempts: attempt,
                        reason: e.to_string(),
                    };
                }
                Err(e) => {
                    warn!(
                        "{}: attempt {}/{} errored: {}",
                        label, attempt, self.max_attempts, e
                    );
                }
            }
        }

        info!("{}: timed out after {} attempt(s)", label, self.max_attempts);
        PollOutcome::TimedOut {
            attempts: self.max_attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let poller = ConfirmationPoller::from_config(&PollingConfig::default());
        assert_eq!(poller.interval, Duration::from_millis(500));
        assert_eq!(poller.max_attempts, 20);
        assert!(poller.initial_grace.is_zero());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempts_times_out_immediately() {
        let poller = ConfirmationPoller::new(Duration::from_millis(10), 0);
        let outcome = poller
            .poll("noop", |_| async { Ok::<CheckStatus<()>, String>(CheckStatus::Pending) })
            .await;
        assert_eq!(outcome, PollOutcome::TimedOut { attempts: 0 });
    }

    #[test]
    fn test_outcome_map_keeps_attempts() {
        let outcome: PollOutcome<u8> = PollOutcome::Confirmed {
            evidence: 2,
            attempts: 4,
        };
        let mapped = outcome.map(u32::from);
        assert_eq!(mapped.evidence(), Some(&2u32));
        assert_eq!(mapped.attempts(), 4);

        let failed: PollOutcome<u8> = PollOutcome::Failed {
            attempts: 3,
            reason: "x".into(),
        };
        assert!(!failed.is_confirmed());
        assert_eq!(failed.map(u32::from).evidence(), None);
    }
}
