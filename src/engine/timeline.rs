use std::collections::BTreeSet;

use crate::model::*;

// ── TimeWindow Index ─────────────────────────────────────────────
//
// Decomposes overlapping availability windows into atomic intervals: maximal
// sub-ranges bounded by window start/end points, within which the covering
// user set is constant.

/// An atomic interval with the windows that fully cover it.
/// `windows` holds indices into the pass's window slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AtomicInterval {
    pub span: Span,
    pub windows: Vec<usize>,
    pub users: BTreeSet<UserId>,
}

/// Cut the timeline at every distinct window boundary and keep the atomic
/// intervals covered by at least `min_players` distinct users.
///
/// A user contributes at most one window per interval (deduplicated by user
/// id, not window id), so overlapping windows of the same user never double
/// count. Zero-length intervals are dropped by construction.
pub(crate) fn atomic_intervals(
    windows: &[AvailabilityWindow],
    min_players: usize,
) -> Vec<AtomicInterval> {
    let mut bounds: Vec<Ms> = Vec::with_capacity(windows.len() * 2);
    for w in windows {
        bounds.push(w.span.start);
        bounds.push(w.span.end);
    }
    bounds.sort_unstable();
    bounds.dedup();

    let mut intervals = Vec::new();
    for pair in bounds.windows(2) {
        let span = Span::new(pair[0], pair[1]);

        let mut covering = Vec::new();
        let mut users = BTreeSet::new();
        for (idx, w) in windows.iter().enumerate() {
            if w.span.contains_span(&span) && users.insert(w.user_id) {
                covering.push(idx);
            }
        }

        if users.len() >= min_players {
            intervals.push(AtomicInterval {
                span,
                windows: covering,
                users,
            });
        }
    }
    intervals
}
