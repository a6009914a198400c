use std::collections::BTreeSet;

use crate::config::MatchConfig;
use crate::model::*;

use super::timeline::AtomicInterval;

// ── Window Merger/Splitter ───────────────────────────────────────

/// A merged, duration-bounded window ready for game scoring.
/// `windows` are indices into the pass's window slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CandidateWindow {
    pub span: Span,
    pub windows: Vec<usize>,
    pub users: BTreeSet<UserId>,
}

/// Merge contiguous atomic intervals that share a core group of at least
/// `min_players` users, then cut the merged windows into duration-bounded
/// chunks.
pub(crate) fn merge_and_split(
    intervals: &[AtomicInterval],
    config: &MatchConfig,
) -> Vec<CandidateWindow> {
    let mut out = Vec::new();
    for merged in merge_contiguous(intervals, config.min_players) {
        split_chunks(&merged, config, &mut out);
    }
    out
}

/// Fold time-ordered atomic intervals into maximal windows. An interval joins
/// the accumulator iff it starts exactly where the accumulator ends and the
/// intersection of the two user sets still meets the core-group threshold.
/// The merged user set is the union — newcomers are carried forward and
/// filtered for real overlap later, at scoring time.
fn merge_contiguous(intervals: &[AtomicInterval], min_players: usize) -> Vec<CandidateWindow> {
    let mut merged: Vec<CandidateWindow> = Vec::new();

    for interval in intervals {
        if let Some(acc) = merged.last_mut()
            && acc.span.end == interval.span.start
            && acc.users.intersection(&interval.users).count() >= min_players
        {
            acc.span.end = interval.span.end;
            acc.users.extend(interval.users.iter().copied());
            for &idx in &interval.windows {
                if !acc.windows.contains(&idx) {
                    acc.windows.push(idx);
                }
            }
            continue;
        }
        merged.push(CandidateWindow {
            span: interval.span,
            windows: interval.windows.clone(),
            users: interval.users.clone(),
        });
    }
    merged
}

/// Carve a merged window into session-sized chunks.
///
/// Walks forward cutting at the target length, except when the leftover after
/// a standard cut would be too short to stand alone: then the whole remainder
/// goes out as one slightly-longer chunk, provided it stays under the hard
/// maximum. Windows shorter than the minimum are discarded entirely.
fn split_chunks(window: &CandidateWindow, config: &MatchConfig, out: &mut Vec<CandidateWindow>) {
    if window.span.duration_ms() < config.min_session_ms {
        return;
    }

    let mut chunk_start = window.span.start;
    loop {
        let remaining = window.span.end - chunk_start;

        if remaining <= config.target_chunk_ms {
            if remaining >= config.min_session_ms {
                out.push(window_chunk(window, chunk_start, window.span.end));
            }
            return;
        }

        let leftover = remaining - config.target_chunk_ms;
        if leftover < config.min_session_ms && remaining <= config.max_session_ms {
            // Avoid an orphan sub-minimum tail: emit the remainder whole.
            out.push(window_chunk(window, chunk_start, window.span.end));
            return;
        }

        let cut = chunk_start + config.target_chunk_ms;
        out.push(window_chunk(window, chunk_start, cut));
        chunk_start = cut;
    }
}

fn window_chunk(window: &CandidateWindow, start: Ms, end: Ms) -> CandidateWindow {
    CandidateWindow {
        span: Span::new(start, end),
        windows: window.windows.clone(),
        users: window.users.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HOUR_MS, MINUTE_MS};
    use ulid::Ulid;

    fn interval(start_h: i64, end_h: i64, users: &[UserId]) -> AtomicInterval {
        AtomicInterval {
            span: Span::new(start_h * HOUR_MS, end_h * HOUR_MS),
            windows: (0..users.len()).collect(),
            users: users.iter().copied().collect(),
        }
    }

    fn candidate(start: Ms, end: Ms, users: &[UserId]) -> CandidateWindow {
        CandidateWindow {
            span: Span::new(start, end),
            windows: (0..users.len()).collect(),
            users: users.iter().copied().collect(),
        }
    }

    // ── merge ──────────────────────────────────────────────

    #[test]
    fn contiguous_intervals_with_core_group_merge() {
        let (u1, u2, u3) = (Ulid::new(), Ulid::new(), Ulid::new());
        let intervals = vec![
            interval(10, 11, &[u1, u2]),
            interval(11, 12, &[u1, u2, u3]),
            interval(12, 13, &[u1, u2]),
        ];
        let merged = merge_contiguous(&intervals, 2);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].span, Span::new(10 * HOUR_MS, 13 * HOUR_MS));
        // union carries u3 forward
        assert_eq!(merged[0].users.len(), 3);
    }

    #[test]
    fn gap_breaks_merge() {
        let (u1, u2) = (Ulid::new(), Ulid::new());
        let intervals = vec![interval(10, 11, &[u1, u2]), interval(12, 13, &[u1, u2])];
        let merged = merge_contiguous(&intervals, 2);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn core_group_collapse_breaks_merge() {
        let (u1, u2, u3, u4) = (Ulid::new(), Ulid::new(), Ulid::new(), Ulid::new());
        // only u1 persists across the boundary — no core group
        let intervals = vec![interval(10, 11, &[u1, u2]), interval(11, 12, &[u1, u3, u4])];
        let merged = merge_contiguous(&intervals, 2);
        assert_eq!(merged.len(), 2);
    }

    // ── split ──────────────────────────────────────────────

    fn split(start: Ms, end: Ms) -> Vec<Ms> {
        let (u1, u2) = (Ulid::new(), Ulid::new());
        let cfg = MatchConfig::default();
        let mut out = Vec::new();
        split_chunks(&candidate(start, end, &[u1, u2]), &cfg, &mut out);
        out.iter().map(|c| c.span.duration_ms()).collect()
    }

    #[test]
    fn four_hours_split_into_two_target_chunks() {
        assert_eq!(split(0, 4 * HOUR_MS), vec![2 * HOUR_MS, 2 * HOUR_MS]);
    }

    #[test]
    fn short_remainder_folds_into_single_chunk() {
        // 150 min: a 120 cut would leave a 30-min orphan
        assert_eq!(split(0, 150 * MINUTE_MS), vec![150 * MINUTE_MS]);
    }

    #[test]
    fn three_hours_split_into_target_plus_minimum() {
        assert_eq!(split(0, 3 * HOUR_MS), vec![2 * HOUR_MS, HOUR_MS]);
    }

    #[test]
    fn below_minimum_discarded() {
        assert!(split(0, 45 * MINUTE_MS).is_empty());
        assert_eq!(split(0, 60 * MINUTE_MS), vec![HOUR_MS]);
    }

    #[test]
    fn long_windows_keep_cutting_at_target() {
        // 5h: 120 + 120 + 60
        assert_eq!(
            split(0, 5 * HOUR_MS),
            vec![2 * HOUR_MS, 2 * HOUR_MS, HOUR_MS]
        );
        // 230 min: leftover 110 >= 60, so a clean cut then the tail
        assert_eq!(
            split(0, 230 * MINUTE_MS),
            vec![120 * MINUTE_MS, 110 * MINUTE_MS]
        );
    }

    #[test]
    fn chunks_preserve_participants() {
        let (u1, u2) = (Ulid::new(), Ulid::new());
        let cfg = MatchConfig::default();
        let mut out = Vec::new();
        split_chunks(&candidate(0, 4 * HOUR_MS, &[u1, u2]), &cfg, &mut out);
        assert_eq!(out.len(), 2);
        for chunk in &out {
            assert_eq!(chunk.users.len(), 2);
            assert_eq!(chunk.windows.len(), 2);
        }
        assert_eq!(out[0].span.end, out[1].span.start);
    }

    #[test]
    fn merge_and_split_end_to_end() {
        let (u1, u2) = (Ulid::new(), Ulid::new());
        let cfg = MatchConfig::default();
        // two contiguous 2h intervals merge into 4h, then split back into 2h+2h
        let intervals = vec![interval(10, 12, &[u1, u2]), interval(12, 14, &[u1, u2])];
        let chunks = merge_and_split(&intervals, &cfg);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].span, Span::new(10 * HOUR_MS, 12 * HOUR_MS));
        assert_eq!(chunks[1].span, Span::new(12 * HOUR_MS, 14 * HOUR_MS));
    }
}
