use async_trait::async_trait;
use dashmap::DashMap;
use ulid::Ulid;

use crate::model::*;

// ── Collaborator contracts ───────────────────────────────────────
//
// The engine reads and writes through these narrow seams. The surrounding
// transaction boundary is owned by the implementation: a pass expects its
// saves and deletes to commit together or not at all.

#[derive(Debug)]
pub struct StoreError(pub String);

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for StoreError {}

/// Availability windows + planned sessions.
#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Windows still relevant at `now` (end time in the future).
    async fn active_windows(&self, now: Ms) -> Result<Vec<AvailabilityWindow>, StoreError>;
    async fn windows_for_user(&self, user_id: UserId) -> Result<Vec<AvailabilityWindow>, StoreError>;
    async fn get_window(&self, id: WindowId) -> Result<Option<AvailabilityWindow>, StoreError>;
    async fn delete_window(&self, id: WindowId) -> Result<(), StoreError>;

    /// Sessions still running or upcoming at `now`.
    async fn active_sessions(&self, now: Ms) -> Result<Vec<PlannedSession>, StoreError>;
    async fn get_session(&self, id: SessionId) -> Result<Option<PlannedSession>, StoreError>;
    /// Upsert; assigns ids to sessions that don't have one yet.
    async fn save_sessions(
        &self,
        sessions: Vec<PlannedSession>,
    ) -> Result<Vec<PlannedSession>, StoreError>;
    async fn delete_sessions(&self, ids: &[SessionId]) -> Result<(), StoreError>;
    /// Narrow write for the notification idempotency marker.
    async fn set_notification_status(
        &self,
        id: SessionId,
        status: NotificationStatus,
    ) -> Result<(), StoreError>;
}

/// Externally managed reference data.
#[async_trait]
pub trait GameCatalog: Send + Sync {
    async fn games(&self) -> Result<Vec<Game>, StoreError>;
    async fn global_preferences(
        &self,
        user_ids: &[UserId],
    ) -> Result<Vec<GlobalPreference>, StoreError>;
}

// ── In-memory implementation ─────────────────────────────────────

/// Map-backed store for tests and embedders without their own persistence.
#[derive(Default)]
pub struct MemoryStore {
    windows: DashMap<WindowId, AvailabilityWindow>,
    sessions: DashMap<SessionId, PlannedSession>,
    games: DashMap<GameId, Game>,
    preferences: DashMap<(UserId, GameId), u32>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_window(&self, window: AvailabilityWindow) {
        self.windows.insert(window.id, window);
    }

    pub fn insert_game(&self, game: Game) {
        self.games.insert(game.id, game);
    }

    pub fn insert_preference(&self, pref: GlobalPreference) {
        self.preferences.insert((pref.user_id, pref.game_id), pref.weight);
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

#[async_trait]
impl MatchStore for MemoryStore {
    async fn active_windows(&self, now: Ms) -> Result<Vec<AvailabilityWindow>, StoreError> {
        let mut out: Vec<_> = self
            .windows
            .iter()
            .filter(|e| e.value().span.end > now)
            .map(|e| e.value().clone())
            .collect();
        out.sort_by_key(|w| (w.span.start, w.id));
        Ok(out)
    }

    async fn windows_for_user(&self, user_id: UserId) -> Result<Vec<AvailabilityWindow>, StoreError> {
        Ok(self
            .windows
            .iter()
            .filter(|e| e.value().user_id == user_id)
            .map(|e| e.value().clone())
            .collect())
    }

    async fn get_window(&self, id: WindowId) -> Result<Option<AvailabilityWindow>, StoreError> {
        Ok(self.windows.get(&id).map(|e| e.value().clone()))
    }

    async fn delete_window(&self, id: WindowId) -> Result<(), StoreError> {
        self.windows.remove(&id);
        Ok(())
    }

    async fn active_sessions(&self, now: Ms) -> Result<Vec<PlannedSession>, StoreError> {
        let mut out: Vec<_> = self
            .sessions
            .iter()
            .filter(|e| e.value().span.end > now)
            .map(|e| e.value().clone())
            .collect();
        out.sort_by_key(|s| (s.span.start, s.id));
        Ok(out)
    }

    async fn get_session(&self, id: SessionId) -> Result<Option<PlannedSession>, StoreError> {
        Ok(self.sessions.get(&id).map(|e| e.value().clone()))
    }

    async fn save_sessions(
        &self,
        sessions: Vec<PlannedSession>,
    ) -> Result<Vec<PlannedSession>, StoreError> {
        let mut saved = Vec::with_capacity(sessions.len());
        for mut session in sessions {
            let id = *session.id.get_or_insert_with(Ulid::new);
            self.sessions.insert(id, session.clone());
            saved.push(session);
        }
        Ok(saved)
    }

    async fn delete_sessions(&self, ids: &[SessionId]) -> Result<(), StoreError> {
        for id in ids {
            self.sessions.remove(id);
        }
        Ok(())
    }

    async fn set_notification_status(
        &self,
        id: SessionId,
        status: NotificationStatus,
    ) -> Result<(), StoreError> {
        match self.sessions.get_mut(&id) {
            Some(mut e) => {
                e.value_mut().notification_status.advance_to(status);
                Ok(())
            }
            None => Err(StoreError(format!("unknown session {id}"))),
        }
    }
}

#[async_trait]
impl GameCatalog for MemoryStore {
    async fn games(&self) -> Result<Vec<Game>, StoreError> {
        let mut out: Vec<_> = self.games.iter().map(|e| e.value().clone()).collect();
        out.sort_by_key(|g| g.id);
        Ok(out)
    }

    async fn global_preferences(
        &self,
        user_ids: &[UserId],
    ) -> Result<Vec<GlobalPreference>, StoreError> {
        Ok(self
            .preferences
            .iter()
            .filter(|e| user_ids.contains(&e.key().0))
            .map(|e| GlobalPreference {
                user_id: e.key().0,
                game_id: e.key().1,
                weight: *e.value(),
            })
            .collect())
    }
}
