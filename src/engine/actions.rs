use tracing::info;

use crate::model::*;
use crate::store::StoreError;

use super::{Engine, EngineError};

// ── Player actions ───────────────────────────────────────────────

impl Engine {
    /// Accept a session invitation. A user not matched into the session may
    /// still join late; they get a fresh ACCEPTED entry.
    pub async fn accept(
        &self,
        session_id: SessionId,
        user_id: UserId,
        now: Ms,
    ) -> Result<PlannedSession, EngineError> {
        let mut session = self
            .store
            .get_session(session_id)
            .await?
            .ok_or(EngineError::SessionNotFound(session_id))?;

        match session.player_mut(&user_id) {
            Some(entry) => {
                entry.status = PlayerStatus::Accepted;
                entry.rejection_reason = None;
            }
            None => session.players.push(PlayerEntry::accepted(user_id)),
        }

        let session = self.persist_one(session).await?;
        self.hub.publish(&session);
        let games = self.catalog.games().await?;
        Ok(self.evaluate_notifications(session, &games, now).await)
    }

    /// Reject a session invitation. Rejecting as NOT_AVAILABLE also removes
    /// the user's availability windows overlapping the session — otherwise
    /// the very next pass would regenerate the identical candidate — and
    /// triggers a full re-plan.
    pub async fn reject(
        &self,
        session_id: SessionId,
        user_id: UserId,
        reason: &str,
        now: Ms,
    ) -> Result<PlannedSession, EngineError> {
        let mut session = self
            .store
            .get_session(session_id)
            .await?
            .ok_or(EngineError::SessionNotFound(session_id))?;

        let entry = session
            .player_mut(&user_id)
            .ok_or(EngineError::NotAParticipant {
                session: session_id,
                user: user_id,
            })?;
        entry.status = PlayerStatus::Rejected;
        entry.rejection_reason = Some(reason.to_string());

        let session_span = session.span;
        let session = self.persist_one(session).await?;
        self.hub.publish(&session);
        let games = self.catalog.games().await?;
        let session = self.evaluate_notifications(session, &games, now).await;

        if reason == REASON_NOT_AVAILABLE {
            for window in self.store.windows_for_user(user_id).await? {
                if window.span.overlaps(&session_span) {
                    info!("removing window {} after NOT_AVAILABLE rejection", window.id);
                    self.store.delete_window(window.id).await?;
                }
            }
            self.run_matchmaking(now).await?;
        }

        Ok(session)
    }

    /// Delete an availability window on behalf of its owner. The player is
    /// pulled out of every overlapping active session before the engine
    /// re-plans against the reduced availability.
    pub async fn remove_window(
        &self,
        window_id: WindowId,
        user_id: UserId,
        now: Ms,
    ) -> Result<(), EngineError> {
        let window = self
            .store
            .get_window(window_id)
            .await?
            .ok_or(EngineError::WindowNotFound(window_id))?;
        if window.user_id != user_id {
            return Err(EngineError::NotWindowOwner {
                window: window_id,
                user: user_id,
            });
        }

        for mut session in self.store.active_sessions(now).await? {
            if session.span.overlaps(&window.span) && session.player(&user_id).is_some() {
                session.players.retain(|p| p.user_id != user_id);
                let session = self.persist_one(session).await?;
                self.hub.publish(&session);
            }
        }

        self.store.delete_window(window_id).await?;
        self.run_matchmaking(now).await?;
        Ok(())
    }

    async fn persist_one(&self, session: PlannedSession) -> Result<PlannedSession, EngineError> {
        self.store
            .save_sessions(vec![session])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| EngineError::Store(StoreError("save returned no session".into())))
    }
}
