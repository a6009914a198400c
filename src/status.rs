use crate::config::MatchConfig;
use crate::model::*;

// ── Dynamic status & notification rules ──────────────────────────
//
// Status is a computed view over (accepted count, game minimum, start time,
// now). It is recomputed on every read and never persisted; only the
// at-most-once notification marker is stored.

/// CONFIRMED iff enough players accepted AND the session starts within the
/// confirmation lookahead. The floor of 2 applies even for solo-friendly games.
pub fn dynamic_status(
    session: &PlannedSession,
    game: Option<&Game>,
    now: Ms,
    config: &MatchConfig,
) -> SessionStatus {
    let game_min = game.map_or(0, |g| g.min_players) as usize;
    let needed = game_min.max(2);
    let enough = session.accepted_count() >= needed;
    let starts_soon = session.span.start < now + config.confirm_lookahead_ms;
    if enough && starts_soon {
        SessionStatus::Confirmed
    } else {
        SessionStatus::Preliminary
    }
}

/// A notice the state machine still owes for this session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Preliminary,
    Confirmed,
}

impl Notice {
    pub fn target_status(&self) -> NotificationStatus {
        match self {
            Notice::Preliminary => NotificationStatus::PreliminarySent,
            Notice::Confirmed => NotificationStatus::ConfirmedSent,
        }
    }
}

/// Decide whether a notice is due, given the current dynamic status.
///
/// Confirmed sessions get a confirmation notice exactly once. Preliminary
/// sessions get a "starting soon" notice once, only while still active and
/// starting within the notify lookahead. Anything else is a no-op.
pub fn pending_notice(
    session: &PlannedSession,
    status: SessionStatus,
    now: Ms,
    config: &MatchConfig,
) -> Option<Notice> {
    match status {
        SessionStatus::Confirmed => {
            if session.notification_status != NotificationStatus::ConfirmedSent {
                Some(Notice::Confirmed)
            } else {
                None
            }
        }
        SessionStatus::Preliminary => {
            let starts_soon = session.span.start < now + config.notify_lookahead_ms;
            let still_active = session.span.end > now;
            if session.notification_status == NotificationStatus::None && starts_soon && still_active
            {
                Some(Notice::Preliminary)
            } else {
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HOUR_MS;
    use ulid::Ulid;

    fn game(min_players: u32) -> Game {
        Game {
            id: Ulid::new(),
            title: "Test".into(),
            min_players,
            max_players: 8,
        }
    }

    fn session_with_accepts(start: Ms, end: Ms, accepted: usize) -> PlannedSession {
        let players = (0..accepted).map(|_| PlayerEntry::accepted(Ulid::new())).collect();
        PlannedSession::draft(Ulid::new(), Span::new(start, end), players, 0)
    }

    #[test]
    fn confirmed_needs_accepts_and_proximity() {
        let cfg = MatchConfig::default();
        let g = game(2);
        let now = 100 * HOUR_MS;

        // enough accepts, starts in 30 min
        let s = session_with_accepts(now + HOUR_MS / 2, now + 2 * HOUR_MS, 2);
        assert_eq!(dynamic_status(&s, Some(&g), now, &cfg), SessionStatus::Confirmed);

        // enough accepts, but starts in 3h
        let s = session_with_accepts(now + 3 * HOUR_MS, now + 5 * HOUR_MS, 2);
        assert_eq!(dynamic_status(&s, Some(&g), now, &cfg), SessionStatus::Preliminary);

        // starts soon, only one accept
        let s = session_with_accepts(now + HOUR_MS / 2, now + 2 * HOUR_MS, 1);
        assert_eq!(dynamic_status(&s, Some(&g), now, &cfg), SessionStatus::Preliminary);
    }

    #[test]
    fn confirmed_threshold_floors_at_two() {
        let cfg = MatchConfig::default();
        let solo = game(1);
        let now = 0;
        let s = session_with_accepts(now, now + HOUR_MS, 1);
        // max(2, min_players) — one accept is never enough
        assert_eq!(dynamic_status(&s, Some(&solo), now, &cfg), SessionStatus::Preliminary);
    }

    #[test]
    fn confirmed_threshold_uses_game_minimum() {
        let cfg = MatchConfig::default();
        let squad = game(4);
        let now = 100 * HOUR_MS;
        let s = session_with_accepts(now + HOUR_MS / 2, now + 2 * HOUR_MS, 3);
        assert_eq!(dynamic_status(&s, Some(&squad), now, &cfg), SessionStatus::Preliminary);
        let s = session_with_accepts(now + HOUR_MS / 2, now + 2 * HOUR_MS, 4);
        assert_eq!(dynamic_status(&s, Some(&squad), now, &cfg), SessionStatus::Confirmed);
    }

    #[test]
    fn missing_game_falls_back_to_floor() {
        let cfg = MatchConfig::default();
        let now = 100 * HOUR_MS;
        let s = session_with_accepts(now + HOUR_MS / 2, now + 2 * HOUR_MS, 2);
        assert_eq!(dynamic_status(&s, None, now, &cfg), SessionStatus::Confirmed);
    }

    #[test]
    fn confirmed_notice_fires_once() {
        let cfg = MatchConfig::default();
        let now = 0;
        let mut s = session_with_accepts(now, now + HOUR_MS, 2);

        let notice = pending_notice(&s, SessionStatus::Confirmed, now, &cfg);
        assert_eq!(notice, Some(Notice::Confirmed));

        s.notification_status = NotificationStatus::ConfirmedSent;
        assert_eq!(pending_notice(&s, SessionStatus::Confirmed, now, &cfg), None);
    }

    #[test]
    fn preliminary_notice_respects_lookahead() {
        let cfg = MatchConfig::default();
        let now = 100 * HOUR_MS;

        // starts in 90 min: inside the 2h lookahead
        let s = session_with_accepts(now + HOUR_MS * 3 / 2, now + 3 * HOUR_MS, 0);
        assert_eq!(
            pending_notice(&s, SessionStatus::Preliminary, now, &cfg),
            Some(Notice::Preliminary)
        );

        // starts in 5h: not yet
        let s = session_with_accepts(now + 5 * HOUR_MS, now + 7 * HOUR_MS, 0);
        assert_eq!(pending_notice(&s, SessionStatus::Preliminary, now, &cfg), None);
    }

    #[test]
    fn preliminary_notice_skips_ended_and_already_notified() {
        let cfg = MatchConfig::default();
        let now = 100 * HOUR_MS;

        // already over
        let s = session_with_accepts(now - 2 * HOUR_MS, now - HOUR_MS, 0);
        assert_eq!(pending_notice(&s, SessionStatus::Preliminary, now, &cfg), None);

        // already notified
        let mut s = session_with_accepts(now + HOUR_MS / 2, now + 2 * HOUR_MS, 0);
        s.notification_status = NotificationStatus::PreliminarySent;
        assert_eq!(pending_notice(&s, SessionStatus::Preliminary, now, &cfg), None);
    }

    #[test]
    fn confirmed_notice_after_preliminary_is_allowed() {
        let cfg = MatchConfig::default();
        let now = 0;
        let mut s = session_with_accepts(now, now + HOUR_MS, 2);
        s.notification_status = NotificationStatus::PreliminarySent;
        assert_eq!(
            pending_notice(&s, SessionStatus::Confirmed, now, &cfg),
            Some(Notice::Confirmed)
        );
    }
}
