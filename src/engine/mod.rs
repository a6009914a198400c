mod actions;
mod conflict;
mod error;
mod planner;
mod reconcile;
mod scoring;
mod timeline;
mod windows;

pub use error::EngineError;

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::config::MatchConfig;
use crate::model::*;
use crate::notify::{NotificationDispatcher, SessionHub};
use crate::observability;
use crate::status::{dynamic_status, pending_notice, Notice};
use crate::store::{GameCatalog, MatchStore};

/// The matchmaking engine: loads a snapshot through the collaborator seams,
/// runs the pure pass computation, and applies the resulting effects
/// (persist, delete, publish, notify).
///
/// One logical pass at a time per dataset; the store's transaction boundary
/// serializes passes. A failed save or delete aborts the pass — the next
/// trigger retries it in full. Notification dispatch is best-effort and never
/// fails a pass.
pub struct Engine {
    store: Arc<dyn MatchStore>,
    catalog: Arc<dyn GameCatalog>,
    pub hub: Arc<SessionHub>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    config: MatchConfig,
}

impl Engine {
    pub fn new(
        store: Arc<dyn MatchStore>,
        catalog: Arc<dyn GameCatalog>,
        hub: Arc<SessionHub>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        config: MatchConfig,
    ) -> Self {
        Self {
            store,
            catalog,
            hub,
            dispatcher,
            config,
        }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// One full reconciliation pass. Returns the resulting session set:
    /// confirmed sessions (untouched) plus the freshly planned ones.
    pub async fn run_matchmaking(&self, now: Ms) -> Result<Vec<PlannedSession>, EngineError> {
        let started = Instant::now();

        let windows = self.store.active_windows(now).await?;
        let sessions = self.store.active_sessions(now).await?;
        let games = self.catalog.games().await?;

        let mut user_ids: Vec<UserId> = windows.iter().map(|w| w.user_id).collect();
        user_ids.sort_unstable();
        user_ids.dedup();
        let prefs = self.catalog.global_preferences(&user_ids).await?;

        let plan = planner::plan(&windows, sessions, &games, &prefs, now, &self.config);

        let saved = self.store.save_sessions(plan.save).await?;
        self.store.delete_sessions(&plan.delete).await?;

        metrics::counter!(observability::PASSES_TOTAL, "status" => "ok").increment(1);
        metrics::counter!(observability::SESSIONS_PLANNED_TOTAL).increment(saved.len() as u64);
        metrics::counter!(observability::SESSIONS_DELETED_TOTAL).increment(plan.delete.len() as u64);
        metrics::histogram!(observability::PASS_DURATION_SECONDS)
            .record(started.elapsed().as_secs_f64());
        info!(
            windows = windows.len(),
            planned = saved.len(),
            deleted = plan.delete.len(),
            confirmed = plan.confirmed.len(),
            "matchmaking pass complete"
        );

        let mut result = plan.confirmed;
        for session in saved {
            self.hub.publish(&session);
            let session = self.evaluate_notifications(session, &games, now).await;
            result.push(session);
        }
        Ok(result)
    }

    /// Re-evaluate every active session against the notification rules.
    /// Catches sessions that crossed the lookahead threshold without any
    /// player action triggering a recompute.
    pub async fn sweep_notifications(&self, now: Ms) -> Result<(), EngineError> {
        let sessions = self.store.active_sessions(now).await?;
        let games = self.catalog.games().await?;
        for session in sessions {
            self.evaluate_notifications(session, &games, now).await;
        }
        Ok(())
    }

    /// Apply the notification state machine to one session: recompute dynamic
    /// status, dispatch any owed notice, and persist the forward transition.
    /// Dispatch and marker-write failures are logged, never propagated.
    pub(super) async fn evaluate_notifications(
        &self,
        mut session: PlannedSession,
        games: &[Game],
        now: Ms,
    ) -> PlannedSession {
        let game = games.iter().find(|g| g.id == session.game_id);
        let status = dynamic_status(&session, game, now, &self.config);
        let Some(notice) = pending_notice(&session, status, now, &self.config) else {
            return session;
        };

        let batch = std::slice::from_ref(&session);
        let (outcome, kind) = match notice {
            Notice::Confirmed => (self.dispatcher.notify_confirmed(batch).await, "confirmed"),
            Notice::Preliminary => (self.dispatcher.notify_preliminary(batch).await, "preliminary"),
        };

        match outcome {
            Ok(()) => {
                metrics::counter!(observability::NOTIFICATIONS_SENT_TOTAL, "kind" => kind)
                    .increment(1);
                session.notification_status.advance_to(notice.target_status());
                if let Some(id) = session.id
                    && let Err(e) = self
                        .store
                        .set_notification_status(id, notice.target_status())
                        .await
                {
                    warn!("failed to persist notification status for {id}: {e}");
                }
            }
            Err(e) => {
                metrics::counter!(observability::NOTIFICATIONS_FAILED_TOTAL, "kind" => kind)
                    .increment(1);
                warn!("notification dispatch failed: {e}");
            }
        }
        session
    }
}
