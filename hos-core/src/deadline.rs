//! Deadline and cancellation signal threaded through collaborator calls.
//!
//! Every routing, geocoding and reverse-lookup call may block on network
//! I/O. Providers consult the [`Deadline`] before starting a request and cap
//! their own timeout by [`Deadline::remaining`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use thiserror::Error;

/// Why a call was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Interrupted {
    /// The deadline passed.
    #[error("deadline exceeded")]
    DeadlineExceeded,
    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,
}

/// An optional expiry instant plus a shared cancellation flag.
///
/// Clones share the flag, so cancelling one handle cancels them all.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use hos_core::{Deadline, Interrupted};
///
/// let deadline = Deadline::after(Duration::from_secs(30));
/// assert!(deadline.check().is_ok());
/// deadline.clone().cancel();
/// assert_eq!(deadline.check(), Err(Interrupted::Cancelled));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Deadline {
    expires_at: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl Deadline {
    /// A signal that never expires on its own.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Expire `timeout` from now.
    #[must_use]
    pub fn after(timeout: Duration) -> Self {
        Self {
            expires_at: Instant::now().checked_add(timeout),
            cancelled: Arc::default(),
        }
    }

    /// Request cancellation of every holder of this signal.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether [`Deadline::cancel`] has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Time left before expiry, or `None` when unbounded.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|at| at.saturating_duration_since(Instant::now()))
    }

    /// Fail fast when cancelled or expired.
    ///
    /// # Errors
    ///
    /// Returns [`Interrupted::Cancelled`] after cancellation and
    /// [`Interrupted::DeadlineExceeded`] once no time remains.
    pub fn check(&self) -> Result<(), Interrupted> {
        if self.is_cancelled() {
            return Err(Interrupted::Cancelled);
        }
        match self.remaining() {
            Some(left) if left.is_zero() => Err(Interrupted::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Clamp a provider's own timeout to the time remaining.
    ///
    /// # Errors
    ///
    /// Propagates [`Deadline::check`] failures.
    pub fn budget(&self, timeout: Duration) -> Result<Duration, Interrupted> {
        self.check()?;
        Ok(self.remaining().map_or(timeout, |left| left.min(timeout)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn unbounded_deadline_passes_through_timeout() {
        let deadline = Deadline::unbounded();
        assert_eq!(deadline.remaining(), None);
        assert_eq!(
            deadline.budget(Duration::from_secs(5)),
            Ok(Duration::from_secs(5))
        );
    }

    #[rstest]
    fn expired_deadline_fails_check() {
        let deadline = Deadline::after(Duration::ZERO);
        assert_eq!(deadline.check(), Err(Interrupted::DeadlineExceeded));
    }

    #[rstest]
    fn budget_is_capped_by_remaining_time() {
        let deadline = Deadline::after(Duration::from_secs(2));
        let budget = deadline
            .budget(Duration::from_secs(60))
            .expect("deadline should still be open");
        assert!(budget <= Duration::from_secs(2));
    }

    #[rstest]
    fn cancellation_wins_over_remaining_time() {
        let deadline = Deadline::after(Duration::from_secs(60));
        let shared = deadline.clone();
        shared.cancel();
        assert_eq!(deadline.check(), Err(Interrupted::Cancelled));
    }
}
