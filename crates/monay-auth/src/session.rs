//! Session lifecycle events
//!
//! The core never navigates or clears UI state itself. On terminal auth
//! failure it publishes `SessionEvent::Terminated`; the UI layer subscribes
//! and sends the user back to sign-in.

use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 16;

/// Session lifecycle notifications
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Credentials were cleared; a full sign-in is required
    Terminated { reason: String },
}

/// Broadcast channel for session events
#[derive(Debug, Clone)]
pub struct SessionEvents {
    sender: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to future events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Announce that the session has ended
    pub fn terminate(&self, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!(reason = %reason, "Session terminated, re-authentication required");
        // No subscribers is fine: nobody is listening for navigation
        let _ = self.sender.send(SessionEvent::Terminated { reason });
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_termination() {
        let events = SessionEvents::new();
        let mut rx = events.subscribe();

        events.terminate("refresh rejected");

        assert_eq!(
            rx.recv().await.unwrap(),
            SessionEvent::Terminated {
                reason: "refresh rejected".to_string()
            }
        );
    }

    #[test]
    fn terminate_without_subscribers_does_not_panic() {
        SessionEvents::new().terminate("nobody listening");
    }
}
