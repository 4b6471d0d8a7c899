//! Resolve a remembered identifier against the live candidate set.
//!
//! Process ids and window indices go stale as apps quit and relaunch, so a
//! stored id is matched in tiers and the first tier with a hit wins:
//!
//! 1. the full composite id, or a legacy bare stable id
//! 2. the same process (`stable::pid`), any window
//! 3. any instance of the same stable id
//!
//! Without window suffixes tier 2 collapses into tier 1, which gives the
//! simpler process-level behaviour without a separate code path.

use crate::{Candidate, IdParts};

/// How closely a candidate matches a stored id. Lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchTier {
    /// Same composite id.
    Exact,
    /// Stored id is a bare stable id equal to the candidate's.
    Bare,
    /// Same stable id and process, different or missing window.
    Process,
    /// Same stable id only.
    Stable,
}

/// Best tier at which `candidate` matches `stored`, if any.
pub fn match_tier(stored: &str, candidate: &Candidate) -> Option<MatchTier> {
    if candidate.id.as_str() == stored {
        return Some(MatchTier::Exact);
    }
    let parts = IdParts::parse(stored);
    if parts.stable != candidate.stable_id {
        return None;
    }
    match parts.pid {
        None if stored == candidate.stable_id => Some(MatchTier::Bare),
        Some(pid) if candidate.pid == Some(pid) => Some(MatchTier::Process),
        _ => Some(MatchTier::Stable),
    }
}

/// Resolve `stored` to a live candidate.
///
/// Returns `None` for a missing stored id or when nothing matches at any
/// tier; callers fall back to the first candidate. Within a tier the earliest
/// candidate in `live` wins.
pub fn resolve<'a>(stored: Option<&str>, live: &'a [Candidate]) -> Option<&'a Candidate> {
    let stored = stored?;
    if stored.is_empty() {
        return None;
    }
    let mut best: Option<(MatchTier, &Candidate)> = None;
    for cand in live {
        let Some(tier) = match_tier(stored, cand) else {
            continue;
        };
        if tier == MatchTier::Exact {
            return Some(cand);
        }
        if best.is_none_or(|(t, _)| tier < t) {
            best = Some((tier, cand));
        }
    }
    best.map(|(_, c)| c)
}

/// Position of the resolved candidate within `live`.
pub fn resolve_index(stored: Option<&str>, live: &[Candidate]) -> Option<usize> {
    let hit = resolve(stored, live)?;
    live.iter().position(|c| c.id == hit.id)
}
