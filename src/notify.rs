use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::info;

use crate::model::*;

const CHANNEL_CAPACITY: usize = 256;

// ── Session event fan-out ────────────────────────────────────────

/// Broadcast hub for session-updated events, one channel per player.
/// Delivery is fire-and-forget; the persisted notification marker, not the
/// hub, is what keeps user-visible notices at-most-once.
pub struct SessionHub {
    channels: DashMap<UserId, broadcast::Sender<SessionUpdated>>,
}

impl Default for SessionHub {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionHub {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
        }
    }

    /// Subscribe to updates for every session a user belongs to.
    pub fn subscribe(&self, user_id: UserId) -> broadcast::Receiver<SessionUpdated> {
        let sender = self
            .channels
            .entry(user_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0);
        sender.subscribe()
    }

    /// Publish an update to every player in the session. No-op for players
    /// nobody is listening for.
    pub fn publish(&self, session: &PlannedSession) {
        let event = SessionUpdated {
            session: session.clone(),
        };
        for player in &session.players {
            if let Some(sender) = self.channels.get(&player.user_id) {
                let _ = sender.send(event.clone());
            }
        }
    }

    pub fn remove(&self, user_id: &UserId) {
        self.channels.remove(user_id);
    }
}

// ── Notification dispatch ────────────────────────────────────────

#[derive(Debug)]
pub struct DispatchError(pub String);

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for DispatchError {}

/// Best-effort delivery of user-visible notices. Failures are logged by the
/// caller and never retried or allowed to fail a pass.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn notify_preliminary(&self, sessions: &[PlannedSession]) -> Result<(), DispatchError>;
    async fn notify_confirmed(&self, sessions: &[PlannedSession]) -> Result<(), DispatchError>;
}

/// Dispatcher that only writes to the log. The built-in stand-in when no
/// chat/push integration is wired up.
pub struct LogDispatcher;

#[async_trait]
impl NotificationDispatcher for LogDispatcher {
    async fn notify_preliminary(&self, sessions: &[PlannedSession]) -> Result<(), DispatchError> {
        for s in sessions {
            info!(
                session = %s.id.map(|i| i.to_string()).unwrap_or_default(),
                start = s.span.start,
                "preliminary session starting soon"
            );
        }
        Ok(())
    }

    async fn notify_confirmed(&self, sessions: &[PlannedSession]) -> Result<(), DispatchError> {
        for s in sessions {
            info!(
                session = %s.id.map(|i| i.to_string()).unwrap_or_default(),
                start = s.span.start,
                "session confirmed"
            );
        }
        Ok(())
    }
}
