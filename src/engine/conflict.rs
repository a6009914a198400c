use crate::model::*;

// ── Conflict Resolver ────────────────────────────────────────────

pub(crate) struct Resolution {
    pub selected: Vec<PlannedSession>,
    /// Previously persisted candidates that lost to a better session.
    pub displaced: Vec<SessionId>,
}

/// Greedily pick a non-conflicting subset of candidates, best first.
///
/// Order: player count desc, then score desc, then duration desc. A candidate
/// is rejected iff it time-overlaps an already-selected session AND shares at
/// least one player with it — the same player is never double-booked, but
/// disjoint groups may play in parallel.
pub(crate) fn resolve_conflicts(mut candidates: Vec<PlannedSession>) -> Resolution {
    candidates.sort_by(|a, b| {
        b.players
            .len()
            .cmp(&a.players.len())
            .then(b.score.cmp(&a.score))
            .then(b.span.duration_ms().cmp(&a.span.duration_ms()))
    });

    let mut selected: Vec<PlannedSession> = Vec::new();
    let mut displaced = Vec::new();

    for candidate in candidates {
        let clashes = selected.iter().any(|s| {
            s.span.overlaps(&candidate.span)
                && candidate.players.iter().any(|p| s.player(&p.user_id).is_some())
        });
        if clashes {
            if let Some(id) = candidate.id {
                displaced.push(id);
            }
        } else {
            selected.push(candidate);
        }
    }

    Resolution { selected, displaced }
}
