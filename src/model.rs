use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unix milliseconds — the only time type.
pub type Ms = i64;

pub type UserId = Ulid;
pub type GameId = Ulid;
pub type WindowId = Ulid;
pub type SessionId = Ulid;

/// Rejection reason that also invalidates the availability behind the session.
pub const REASON_NOT_AVAILABLE: &str = "NOT_AVAILABLE";

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Ms,
    pub end: Ms,
}

impl Span {
    pub fn new(start: Ms, end: Ms) -> Self {
        debug_assert!(start < end, "Span start must be before end");
        Self { start, end }
    }

    pub fn duration_ms(&self) -> Ms {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Returns true if `self` fully contains `other`.
    pub fn contains_span(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Drop sub-second precision. Session boundaries are stored at whole seconds
/// so a regenerated candidate produces a bit-identical signature.
pub fn truncate_to_second(t: Ms) -> Ms {
    t - t.rem_euclid(1000)
}

/// A user-submitted free-time range, optionally with per-game weight overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub id: WindowId,
    pub user_id: UserId,
    pub span: Span,
    /// Per-window preference overrides; weight 0 is an explicit veto.
    #[serde(default)]
    pub overrides: HashMap<GameId, u32>,
}

impl AvailabilityWindow {
    pub fn new(id: WindowId, user_id: UserId, span: Span) -> Self {
        Self {
            id,
            user_id,
            span,
            overrides: HashMap::new(),
        }
    }
}

/// Immutable reference data; externally managed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub title: String,
    pub min_players: u32,
    pub max_players: u32,
}

/// Fallback preference used when a window carries no override for a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalPreference {
    pub user_id: UserId,
    pub game_id: GameId,
    pub weight: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerEntry {
    pub user_id: UserId,
    pub status: PlayerStatus,
    pub rejection_reason: Option<String>,
}

impl PlayerEntry {
    pub fn pending(user_id: UserId) -> Self {
        Self {
            user_id,
            status: PlayerStatus::Pending,
            rejection_reason: None,
        }
    }

    pub fn accepted(user_id: UserId) -> Self {
        Self {
            user_id,
            status: PlayerStatus::Accepted,
            rejection_reason: None,
        }
    }
}

/// Persisted at-most-once notification marker. Monotonic: never moves backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationStatus {
    None,
    PreliminarySent,
    ConfirmedSent,
}

impl NotificationStatus {
    /// Advance to `next` only if it is a forward transition.
    pub fn advance_to(&mut self, next: NotificationStatus) -> bool {
        if next > *self {
            *self = next;
            true
        } else {
            false
        }
    }
}

/// Derived confirmation state — computed on every read, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Preliminary,
    Confirmed,
}

/// Identity of "the same" session across reconciliation passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature {
    pub game_id: GameId,
    pub start: Ms,
    pub end: Ms,
}

/// A planned (candidate or persisted) play session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedSession {
    /// None until the store has persisted the session.
    pub id: Option<SessionId>,
    pub game_id: GameId,
    pub span: Span,
    pub players: Vec<PlayerEntry>,
    pub score: i64,
    pub notification_status: NotificationStatus,
}

impl PlannedSession {
    pub fn draft(game_id: GameId, span: Span, players: Vec<PlayerEntry>, score: i64) -> Self {
        Self {
            id: None,
            game_id,
            span,
            players,
            score,
            notification_status: NotificationStatus::None,
        }
    }

    pub fn signature(&self) -> Signature {
        Signature {
            game_id: self.game_id,
            start: self.span.start,
            end: self.span.end,
        }
    }

    pub fn player(&self, user_id: &UserId) -> Option<&PlayerEntry> {
        self.players.iter().find(|p| &p.user_id == user_id)
    }

    pub fn player_mut(&mut self, user_id: &UserId) -> Option<&mut PlayerEntry> {
        self.players.iter_mut().find(|p| &p.user_id == user_id)
    }

    pub fn accepted_count(&self) -> usize {
        self.players
            .iter()
            .filter(|p| p.status == PlayerStatus::Accepted)
            .count()
    }
}

/// Event published on every session touched by a pass or a player action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUpdated {
    pub session: PlannedSession,
}
