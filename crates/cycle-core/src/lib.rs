//! Core model and decision logic for shortcut-driven app switching.
//!
//! Everything here is pure: given a snapshot of live candidates and the
//! remembered state of a group, decide which candidate comes next.
//!
//! - [`candidate`]: composite identifiers and candidate enumeration
//! - [`resolve`]: tiered matching of remembered ids to live candidates
//! - [`order`]: next/previous selection and MRU maintenance

pub mod candidate;
mod error;
mod group;
pub mod order;
pub mod resolve;

pub use candidate::{Candidate, CandidateId, IdParts, RunningApp, enumerate_candidates};
pub use error::{Error, Result};
pub use group::{AppDescriptor, CycleOrder, Group, GroupId};
pub use order::{
    CycleInputs, Direction, next_candidate, previous_candidate, sorted_by_mru, step_candidate,
    updated_mru,
};
pub use resolve::{MatchTier, resolve};
