use std::collections::HashMap;

use crate::model::*;

// ── Session Reconciler ───────────────────────────────────────────
//
// Matches freshly scored drafts against still-preliminary sessions from the
// previous pass by signature, so a regenerated candidate adopts its
// predecessor's identity and player-state history instead of arriving as a
// stranger.

pub(crate) struct Reconciled {
    /// Drafts, some of which now carry a persisted id and merged player state.
    pub candidates: Vec<PlannedSession>,
    /// Previously persisted preliminary sessions with no matching draft.
    pub obsolete: Vec<SessionId>,
}

pub(crate) fn reconcile(
    drafts: Vec<PlannedSession>,
    preliminary: Vec<PlannedSession>,
) -> Reconciled {
    let mut by_signature: HashMap<Signature, PlannedSession> = preliminary
        .into_iter()
        .map(|s| (s.signature(), s))
        .collect();

    let mut candidates = Vec::with_capacity(drafts.len());
    for draft in drafts {
        match by_signature.remove(&draft.signature()) {
            Some(existing) => candidates.push(adopt(existing, draft)),
            None => candidates.push(draft),
        }
    }

    let obsolete = by_signature.into_values().filter_map(|s| s.id).collect();
    Reconciled { candidates, obsolete }
}

/// Merge a draft into the existing session it regenerates.
///
/// Players no longer in the draft are dropped; players in both keep their
/// recorded status except REJECTED, which resets to PENDING (a rejecting user
/// who becomes eligible again gets a fresh chance); draft-only players join
/// as PENDING. The score always reflects the current pass.
fn adopt(mut existing: PlannedSession, draft: PlannedSession) -> PlannedSession {
    existing
        .players
        .retain(|p| draft.player(&p.user_id).is_some());

    for entry in &mut existing.players {
        if entry.status == PlayerStatus::Rejected {
            entry.status = PlayerStatus::Pending;
            entry.rejection_reason = None;
        }
    }

    for p in &draft.players {
        if existing.player(&p.user_id).is_none() {
            existing.players.push(PlayerEntry::pending(p.user_id));
        }
    }

    existing.score = draft.score;
    existing
}

#[cfg(test)]
mod tests {
    use super::*;
    use ulid::Ulid;

    fn draft(game: GameId, start: Ms, end: Ms, users: &[UserId]) -> PlannedSession {
        PlannedSession::draft(
            game,
            Span::new(start, end),
            users.iter().copied().map(PlayerEntry::pending).collect(),
            10,
        )
    }

    fn persisted(game: GameId, start: Ms, end: Ms, players: Vec<PlayerEntry>) -> PlannedSession {
        let mut s = PlannedSession::draft(game, Span::new(start, end), players, 5);
        s.id = Some(Ulid::new());
        s
    }

    #[test]
    fn matching_signature_adopts_identity_and_accepts() {
        let g = Ulid::new();
        let (u1, u2) = (Ulid::new(), Ulid::new());
        let existing = persisted(g, 1000, 2000, vec![PlayerEntry::accepted(u1), PlayerEntry::pending(u2)]);
        let existing_id = existing.id;

        let result = reconcile(vec![draft(g, 1000, 2000, &[u1, u2])], vec![existing]);
        assert!(result.obsolete.is_empty());
        assert_eq!(result.candidates.len(), 1);

        let merged = &result.candidates[0];
        assert_eq!(merged.id, existing_id);
        assert_eq!(merged.player(&u1).unwrap().status, PlayerStatus::Accepted);
        assert_eq!(merged.player(&u2).unwrap().status, PlayerStatus::Pending);
        assert_eq!(merged.score, 10); // draft's score wins
    }

    #[test]
    fn rejected_player_gets_fresh_chance() {
        let g = Ulid::new();
        let (u1, u2) = (Ulid::new(), Ulid::new());
        let mut rejected = PlayerEntry::pending(u1);
        rejected.status = PlayerStatus::Rejected;
        rejected.rejection_reason = Some("busy".into());
        let existing = persisted(g, 1000, 2000, vec![rejected, PlayerEntry::accepted(u2)]);

        let result = reconcile(vec![draft(g, 1000, 2000, &[u1, u2])], vec![existing]);
        let merged = &result.candidates[0];
        let entry = merged.player(&u1).unwrap();
        assert_eq!(entry.status, PlayerStatus::Pending);
        assert!(entry.rejection_reason.is_none());
    }

    #[test]
    fn departed_players_dropped_newcomers_pending() {
        let g = Ulid::new();
        let (u1, u2, u3) = (Ulid::new(), Ulid::new(), Ulid::new());
        let existing = persisted(g, 1000, 2000, vec![PlayerEntry::accepted(u1), PlayerEntry::accepted(u2)]);

        // u2 left, u3 arrived
        let result = reconcile(vec![draft(g, 1000, 2000, &[u1, u3])], vec![existing]);
        let merged = &result.candidates[0];
        assert_eq!(merged.players.len(), 2);
        assert!(merged.player(&u2).is_none());
        assert_eq!(merged.player(&u1).unwrap().status, PlayerStatus::Accepted);
        assert_eq!(merged.player(&u3).unwrap().status, PlayerStatus::Pending);
    }

    #[test]
    fn unmatched_preliminary_becomes_obsolete() {
        let g = Ulid::new();
        let (u1, u2) = (Ulid::new(), Ulid::new());
        let stale = persisted(g, 5000, 9000, vec![PlayerEntry::pending(u1)]);
        let stale_id = stale.id.unwrap();

        let result = reconcile(vec![draft(g, 1000, 2000, &[u1, u2])], vec![stale]);
        assert_eq!(result.obsolete, vec![stale_id]);
        assert_eq!(result.candidates.len(), 1);
        assert!(result.candidates[0].id.is_none()); // brand new
    }

    #[test]
    fn different_game_same_times_is_a_different_session() {
        let (u1, u2) = (Ulid::new(), Ulid::new());
        let existing = persisted(Ulid::new(), 1000, 2000, vec![PlayerEntry::accepted(u1)]);
        let stale_id = existing.id.unwrap();

        let result = reconcile(vec![draft(Ulid::new(), 1000, 2000, &[u1, u2])], vec![existing]);
        assert_eq!(result.obsolete, vec![stale_id]);
        assert!(result.candidates[0].id.is_none());
    }

    #[test]
    fn no_drafts_everything_obsolete() {
        let g = Ulid::new();
        let a = persisted(g, 1000, 2000, vec![]);
        let b = persisted(g, 3000, 4000, vec![]);
        let ids: Vec<_> = [a.id.unwrap(), b.id.unwrap()].into();

        let result = reconcile(vec![], vec![a, b]);
        assert!(result.candidates.is_empty());
        assert_eq!(result.obsolete.len(), 2);
        for id in ids {
            assert!(result.obsolete.contains(&id));
        }
    }
}
