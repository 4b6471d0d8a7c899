//! Cycling order: pick the next candidate and maintain the MRU list.

use std::collections::HashSet;

use tracing::trace;

use crate::{
    Candidate, CandidateId, IdParts,
    resolve::{self, MatchTier, match_tier},
};

/// Direction of travel through the candidate list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards the end, wrapping to the first candidate.
    Forward,
    /// Towards the start, wrapping to the last candidate.
    Backward,
}

impl Direction {
    /// Index reached by one step from `index` in a list of `len` items.
    fn step(self, index: usize, len: usize) -> usize {
        match self {
            Self::Forward => (index + 1) % len,
            Self::Backward => (index + len - 1) % len,
        }
    }
}

/// Inputs to a single cycling decision.
#[derive(Debug, Clone, Copy)]
pub struct CycleInputs<'a> {
    /// Live candidates in cycling order.
    pub candidates: &'a [Candidate],
    /// Id of the OS frontmost process or window, if known.
    pub frontmost: Option<&'a str>,
    /// Candidate currently highlighted in the overlay.
    pub overlay_selection: Option<&'a str>,
    /// Remembered last active id for the group.
    pub last_active: Option<&'a str>,
    /// Whether the overlay is showing.
    pub overlay_visible: bool,
}

/// Compute the candidate to select when stepping in `dir`.
///
/// 1. With a visible overlay and a highlighted selection, step from the
///    selection. A selection that has disappeared resets to the first
///    candidate.
/// 2. Else, when the frontmost app is one of the candidates, step from it.
/// 3. Else, resume the remembered last active candidate.
/// 4. Else, the first candidate.
///
/// Returns `None` only for an empty candidate list.
pub fn step_candidate(inputs: &CycleInputs<'_>, dir: Direction) -> Option<CandidateId> {
    let cands = inputs.candidates;
    let len = cands.len();
    if len == 0 {
        return None;
    }
    if inputs.overlay_visible
        && let Some(sel) = inputs.overlay_selection
    {
        let idx = cands
            .iter()
            .position(|c| c.id.as_str() == sel)
            .map_or(0, |i| dir.step(i, len));
        trace!(selection = sel, next = %cands[idx].id, "step_from_selection");
        return Some(cands[idx].id.clone());
    }
    if let Some(i) = resolve::resolve_index(inputs.frontmost, cands) {
        let idx = dir.step(i, len);
        trace!(frontmost = ?inputs.frontmost, next = %cands[idx].id, "step_from_frontmost");
        return Some(cands[idx].id.clone());
    }
    if let Some(c) = resolve::resolve(inputs.last_active, cands) {
        trace!(last_active = ?inputs.last_active, next = %c.id, "resume_last_active");
        return Some(c.id.clone());
    }
    Some(cands[0].id.clone())
}

/// Next candidate, moving forward. See [`step_candidate`].
pub fn next_candidate(
    candidates: &[Candidate],
    frontmost: Option<&str>,
    overlay_selection: Option<&str>,
    last_active: Option<&str>,
    overlay_visible: bool,
) -> Option<CandidateId> {
    let inputs = CycleInputs {
        candidates,
        frontmost,
        overlay_selection,
        last_active,
        overlay_visible,
    };
    step_candidate(&inputs, Direction::Forward)
}

/// Previous candidate, moving backward. See [`step_candidate`].
pub fn previous_candidate(
    candidates: &[Candidate],
    frontmost: Option<&str>,
    overlay_selection: Option<&str>,
    last_active: Option<&str>,
    overlay_visible: bool,
) -> Option<CandidateId> {
    let inputs = CycleInputs {
        candidates,
        frontmost,
        overlay_selection,
        last_active,
        overlay_visible,
    };
    step_candidate(&inputs, Direction::Backward)
}

/// MRU order after activating `activated`.
///
/// The activated id moves to the front. Entries whose app left the group or
/// whose instance is no longer live are evicted on every call, and
/// duplicates collapse to their first occurrence.
pub fn updated_mru(
    current: &[String],
    activated: &str,
    valid_stable_ids: &HashSet<String>,
    live_ids: &HashSet<String>,
) -> Vec<String> {
    let mut out = Vec::with_capacity(current.len() + 1);
    out.push(activated.to_string());
    let mut seen: HashSet<&str> = HashSet::new();
    seen.insert(activated);
    for entry in current {
        if !seen.insert(entry.as_str()) {
            continue;
        }
        let stable = IdParts::parse(entry).stable;
        if valid_stable_ids.contains(stable) && live_ids.contains(entry) {
            out.push(entry.clone());
        }
    }
    out
}

/// Rank of a candidate: position of its best-tier MRU entry.
fn mru_rank(candidate: &Candidate, mru: &[String]) -> (usize, Option<MatchTier>) {
    let mut best: Option<(MatchTier, usize)> = None;
    for (pos, entry) in mru.iter().enumerate() {
        let Some(tier) = match_tier(entry, candidate) else {
            continue;
        };
        if best.is_none_or(|(t, _)| tier < t) {
            best = Some((tier, pos));
        }
    }
    match best {
        Some((tier, pos)) => (pos, Some(tier)),
        None => (mru.len(), None),
    }
}

/// Order `candidates` by MRU position.
///
/// Each candidate takes the position of the first MRU entry it matches at
/// its best tier (exact, process, then stable id). Candidates sharing a
/// position are ordered by tier; anything else keeps enumeration order, and
/// unmatched candidates go last.
pub fn sorted_by_mru(candidates: &[Candidate], mru: &[String]) -> Vec<Candidate> {
    let mut ranked: Vec<((usize, Option<MatchTier>), &Candidate)> = candidates
        .iter()
        .map(|c| (mru_rank(c, mru), c))
        .collect();
    ranked.sort_by_key(|(rank, _)| *rank);
    ranked.into_iter().map(|(_, c)| c.clone()).collect()
}
