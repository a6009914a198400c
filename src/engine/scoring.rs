use std::collections::{BTreeSet, HashMap, HashSet};

use crate::config::MatchConfig;
use crate::model::*;

use super::windows::CandidateWindow;

// ── Game Scorer ──────────────────────────────────────────────────

pub(crate) type PreferenceMap = HashMap<(UserId, GameId), u32>;

pub(crate) fn preference_map(prefs: &[GlobalPreference]) -> PreferenceMap {
    prefs
        .iter()
        .map(|p| ((p.user_id, p.game_id), p.weight))
        .collect()
}

/// Resolve the weight one window contributes towards a game: the window's own
/// override wins, then the user's global preference, then the default.
fn weight_for(
    window: &AvailabilityWindow,
    game_id: GameId,
    prefs: &PreferenceMap,
    config: &MatchConfig,
) -> u32 {
    window
        .overrides
        .get(&game_id)
        .copied()
        .or_else(|| prefs.get(&(window.user_id, game_id)).copied())
        .unwrap_or(config.default_weight)
}

/// Score every game for a candidate window and build a draft session for the
/// best eligible one.
///
/// A participant with weight 0 has vetoed the game and drops out of its
/// tally; a game is eligible only with `min_players` non-vetoing
/// participants. Ties go to the first game in catalog order. After picking
/// the game, contributing windows are re-filtered to those that actually
/// overlap the (possibly duration-split) chunk — precision reclaimed from the
/// merge step's union semantics.
pub(crate) fn score_candidate(
    candidate: &CandidateWindow,
    windows: &[AvailabilityWindow],
    games: &[Game],
    prefs: &PreferenceMap,
    now: Ms,
    config: &MatchConfig,
) -> Option<PlannedSession> {
    let mut best: Option<(&Game, i64)> = None;

    for game in games {
        let mut seen: HashSet<UserId> = HashSet::new();
        let mut total: i64 = 0;
        let mut eligible = 0usize;

        for &idx in &candidate.windows {
            let w = &windows[idx];
            if !seen.insert(w.user_id) {
                continue;
            }
            let weight = weight_for(w, game.id, prefs, config);
            if weight == 0 {
                continue; // explicit veto
            }
            total += weight as i64;
            eligible += 1;
        }

        if eligible < config.min_players {
            continue;
        }
        let score = total + eligible as i64 * config.participation_bonus;
        if best.is_none_or(|(_, s)| score > s) {
            best = Some((game, score));
        }
    }

    let (game, score) = best?;

    // Participating-slot filter: keep windows that still want this game and
    // really cover part of this chunk.
    let mut users: BTreeSet<UserId> = BTreeSet::new();
    for &idx in &candidate.windows {
        let w = &windows[idx];
        if weight_for(w, game.id, prefs, config) == 0 {
            continue;
        }
        if !w.span.overlaps(&candidate.span) {
            continue;
        }
        users.insert(w.user_id);
    }
    if users.len() < config.min_players {
        return None;
    }

    let start = truncate_to_second(candidate.span.start.max(now));
    let end = truncate_to_second(candidate.span.end);
    if start >= end {
        return None;
    }

    let players = users.into_iter().map(PlayerEntry::pending).collect();
    Some(PlannedSession::draft(game.id, Span::new(start, end), players, score))
}
