//! Single-flight coordination of token refreshes.
//!
//! # State Transitions
//! ```text
//! Idle → Refreshing: first 401 whose token is still the stored one
//! Refreshing → Idle: leader reports the outcome (or is dropped)
//! ```
//!
//! While refreshing, later callers queue as waiters and are released in
//! arrival order with the leader's outcome. A leader that is dropped before
//! reporting releases its waiters as `Abandoned`; they re-enter and one of
//! them takes over. The lock is never held across an await point.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;

enum State {
    Idle,
    Refreshing {
        waiters: Vec<oneshot::Sender<RefreshOutcome>>,
    },
}

/// What a waiter learns about the refresh it queued behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The exchange succeeded; retry with this access token.
    Refreshed(String),
    /// The refresh token was rejected; the session is over.
    Failed,
    /// The leader was cancelled before the exchange finished.
    Abandoned,
}

/// Ensures at most one refresh exchange is in flight per client.
pub struct RefreshCoordinator {
    state: Mutex<State>,
}

/// What a caller that hit a 401 should do next.
pub enum Ticket<'a> {
    /// A refresh already finished since the caller's request was sent.
    Current(String),
    /// The caller owns the refresh and must report through the guard.
    Leader(RefreshGuard<'a>),
    /// Another caller is refreshing; await its outcome.
    Waiter(Waiter),
    /// The stored tokens were cleared since the request was sent.
    SignedOut,
}

/// Pending outcome of someone else's refresh.
pub struct Waiter(oneshot::Receiver<RefreshOutcome>);

impl Waiter {
    pub async fn outcome(self) -> RefreshOutcome {
        self.0.await.unwrap_or(RefreshOutcome::Abandoned)
    }
}

/// Held by the refresh leader. Dropping it unreported fails every waiter.
pub struct RefreshGuard<'a> {
    coordinator: &'a RefreshCoordinator,
    finished: bool,
}

impl RefreshGuard<'_> {
    /// Publish the new access token (or `None` on failure) and return to idle.
    /// Returns the number of waiters released.
    pub fn finish(mut self, access: Option<String>) -> usize {
        self.finished = true;
        let outcome = match access {
            Some(token) => RefreshOutcome::Refreshed(token),
            None => RefreshOutcome::Failed,
        };
        self.coordinator.release(outcome)
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            let released = self.coordinator.release(RefreshOutcome::Abandoned);
            tracing::warn!(waiters = released, "Token refresh abandoned");
        }
    }
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::Idle),
        }
    }

    /// Join the refresh protocol after a 401.
    ///
    /// `sent_with` is the access token the rejected request carried and
    /// `current` reads the stored one; both are compared under the lock so a
    /// refresh that completed in the meantime is reused instead of repeated,
    /// and a session that already ended is not refreshed again.
    pub fn enter(&self, sent_with: &str, current: impl FnOnce() -> Option<String>) -> Ticket<'_> {
        let mut state = self.lock();

        if let State::Refreshing { waiters } = &mut *state {
            let (tx, rx) = oneshot::channel();
            waiters.push(tx);
            return Ticket::Waiter(Waiter(rx));
        }

        match current() {
            None => return Ticket::SignedOut,
            Some(stored) if stored != sent_with => return Ticket::Current(stored),
            Some(_) => {}
        }

        *state = State::Refreshing {
            waiters: Vec::new(),
        };
        Ticket::Leader(RefreshGuard {
            coordinator: self,
            finished: false,
        })
    }

    pub fn is_refreshing(&self) -> bool {
        matches!(*self.lock(), State::Refreshing { .. })
    }

    /// Number of callers currently queued behind the leader.
    pub fn waiter_count(&self) -> usize {
        match &*self.lock() {
            State::Refreshing { waiters } => waiters.len(),
            State::Idle => 0,
        }
    }

    fn release(&self, outcome: RefreshOutcome) -> usize {
        let previous = std::mem::replace(&mut *self.lock(), State::Idle);
        let State::Refreshing { waiters } = previous else {
            return 0;
        };

        let released = waiters.len();
        for waiter in waiters {
            // A waiter whose caller gave up has dropped its receiver.
            let _ = waiter.send(outcome.clone());
        }
        released
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RefreshCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("refreshing", &self.is_refreshing())
            .field("waiters", &self.waiter_count())
            .finish()
    }
}
