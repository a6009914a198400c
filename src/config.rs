use crate::model::Ms;

pub const MINUTE_MS: Ms = 60_000;
pub const HOUR_MS: Ms = 3_600_000;

/// Tunables for a matchmaking pass. All duration rules and thresholds live
/// here so the planner itself stays free of magic numbers.
#[derive(Debug, Clone, Copy)]
pub struct MatchConfig {
    /// Minimum distinct users required for an atomic interval, a merge core
    /// group, and a viable candidate session.
    pub min_players: usize,
    /// Windows shorter than this never produce a session.
    pub min_session_ms: Ms,
    /// Preferred session length when splitting a long merged window.
    pub target_chunk_ms: Ms,
    /// Hard upper bound on any emitted session.
    pub max_session_ms: Ms,
    /// Weight assumed when neither a window override nor a global preference
    /// exists for a (user, game) pair.
    pub default_weight: u32,
    /// Added to a game's score per eligible participant.
    pub participation_bonus: i64,
    /// A session can only become CONFIRMED when it starts within this horizon.
    pub confirm_lookahead_ms: Ms,
    /// Preliminary "starting soon" notices fire within this horizon.
    pub notify_lookahead_ms: Ms,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            min_players: 2,
            min_session_ms: 60 * MINUTE_MS,
            target_chunk_ms: 120 * MINUTE_MS,
            max_session_ms: 240 * MINUTE_MS,
            default_weight: 5,
            participation_bonus: 2,
            confirm_lookahead_ms: HOUR_MS,
            notify_lookahead_ms: 2 * HOUR_MS,
        }
    }
}
