use std::collections::HashMap;

use tracing::{debug, warn};

use crate::config::MatchConfig;
use crate::model::*;
use crate::status::dynamic_status;

use super::conflict::resolve_conflicts;
use super::reconcile::reconcile;
use super::scoring::{preference_map, score_candidate};
use super::timeline::atomic_intervals;
use super::windows::merge_and_split;

// ── Pass planner ─────────────────────────────────────────────────
//
// One reconciliation pass as a pure function over an in-memory snapshot.
// All persistence and notification effects are decided here and applied by
// the caller; nothing in this module touches a clock or a store.

#[derive(Debug, Default)]
pub(crate) struct PassPlan {
    /// Confirmed sessions, untouched by this pass.
    pub confirmed: Vec<PlannedSession>,
    /// Selected candidates to persist (new and adopted).
    pub save: Vec<PlannedSession>,
    /// Persisted sessions with no place in the new plan.
    pub delete: Vec<SessionId>,
}

pub(crate) fn plan(
    windows: &[AvailabilityWindow],
    active_sessions: Vec<PlannedSession>,
    games: &[Game],
    prefs: &[GlobalPreference],
    now: Ms,
    config: &MatchConfig,
) -> PassPlan {
    let games_by_id: HashMap<GameId, &Game> = games.iter().map(|g| (g.id, g)).collect();

    // Malformed windows are skipped, never fatal.
    let mut usable: Vec<AvailabilityWindow> = windows
        .iter()
        .filter(|w| {
            if w.span.start >= w.span.end {
                warn!("skipping malformed window {}: start >= end", w.id);
                return false;
            }
            true
        })
        .cloned()
        .collect();
    usable.sort_by_key(|w| (w.span.start, w.id));

    let mut confirmed = Vec::new();
    let mut preliminary = Vec::new();
    for session in active_sessions {
        let game = games_by_id.get(&session.game_id).copied();
        match dynamic_status(&session, game, now, config) {
            SessionStatus::Confirmed => confirmed.push(session),
            SessionStatus::Preliminary => preliminary.push(session),
        }
    }

    // A player committed to a confirmed session is off the market for that
    // time range: their overlapping windows never reach the index.
    usable.retain(|w| {
        !confirmed.iter().any(|s| {
            s.span.overlaps(&w.span)
                && s.player(&w.user_id)
                    .is_some_and(|p| p.status == PlayerStatus::Accepted)
        })
    });

    let intervals = atomic_intervals(&usable, config.min_players);
    let candidates = merge_and_split(&intervals, config);
    debug!(
        intervals = intervals.len(),
        candidates = candidates.len(),
        "timeline decomposed"
    );

    let prefs = preference_map(prefs);
    let drafts: Vec<PlannedSession> = candidates
        .iter()
        .filter_map(|c| score_candidate(c, &usable, games, &prefs, now, config))
        .collect();

    let reconciled = reconcile(drafts, preliminary);
    let resolution = resolve_conflicts(reconciled.candidates);

    let mut delete = reconciled.obsolete;
    delete.extend(resolution.displaced);

    PassPlan {
        confirmed,
        save: resolution.selected,
        delete,
    }
}
