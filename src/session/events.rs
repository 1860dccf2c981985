//! Session lifecycle notifications.

use tokio::sync::broadcast;
use uuid::Uuid;

/// Something that changed the signed-in state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A user signed in or registered.
    LoggedIn { user_id: Uuid },
    /// The user signed out.
    LoggedOut,
    /// The refresh token was rejected; stored tokens were cleared and the
    /// user has to sign in again.
    Expired,
}

/// Broadcast channel that front ends subscribe to.
///
/// Publishing with no subscribers is not an error.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    pub fn publish(&self, event: SessionEvent) {
        tracing::debug!(?event, "Session event");
        let _ = self.tx.send(event);
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}
