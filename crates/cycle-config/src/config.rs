//! Validated configuration.
//!
//! [`Config`] is built from the raw file layout: timing is clamped, groups are
//! converted to engine groups, and duplicate ids or shortcut chords are
//! rejected.

use std::collections::HashMap;

use cycle_core::{AppDescriptor, Group, GroupId};
use cycle_engine::TimingConfig;
use cycle_keys::Chord;
use tracing::warn;

use crate::{
    Error,
    raw::{RawConfig, RawGroup, RawTiming},
};

/// A validated configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Clamped controller timing.
    timing: TimingConfig,
    /// Enumerate one candidate per window instead of per process.
    per_window: bool,
    /// Groups in file order.
    groups: Vec<Group>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timing: TimingConfig::default(),
            per_window: false,
            groups: Vec::new(),
        }
    }
}

impl Config {
    /// Controller timing.
    pub fn timing(&self) -> TimingConfig {
        self.timing
    }

    /// Whether windows are cycled individually.
    pub fn per_window(&self) -> bool {
        self.per_window
    }

    /// All groups in file order.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Look up a group.
    pub fn group(&self, id: &GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == *id)
    }

    /// Group bound to `chord`.
    pub fn group_for_shortcut(&self, chord: Chord) -> Option<&Group> {
        self.groups.iter().find(|g| g.shortcut == Some(chord))
    }

    /// Validate and convert the raw file contents.
    pub(crate) fn from_raw(raw: RawConfig) -> Result<Self, Error> {
        let timing = raw.timing.to_timing();
        if RawTiming::from_timing(timing) != raw.timing {
            warn!(?timing, "timing_clamped");
        }

        let mut groups: Vec<Group> = Vec::with_capacity(raw.groups.len());
        let mut shortcuts: HashMap<Chord, String> = HashMap::new();
        for rg in raw.groups {
            let group = convert_group(rg)?;
            if groups.iter().any(|g| g.id == group.id) {
                return Err(Error::invalid(
                    Some(group.id.as_str()),
                    "duplicate group id",
                ));
            }
            if let Some(chord) = group.shortcut
                && let Some(other) = shortcuts.insert(chord, group.id.to_string())
            {
                return Err(Error::invalid(
                    Some(group.id.as_str()),
                    format!("shortcut '{}' is already bound to group '{}'", chord, other),
                ));
            }
            groups.push(group);
        }

        Ok(Self {
            timing,
            per_window: raw.per_window,
            groups,
        })
    }
}

/// Convert one group definition.
fn convert_group(rg: RawGroup) -> Result<Group, Error> {
    let id = rg.id.trim().to_string();
    if id.is_empty() {
        return Err(Error::invalid(None, "group id must not be empty"));
    }
    let apps = rg
        .apps
        .into_iter()
        .map(|a| {
            let name = a.name.unwrap_or_else(|| a.bundle_id.clone());
            AppDescriptor::new(a.bundle_id.trim(), &name)
        })
        .collect();
    let name = rg.name.unwrap_or_else(|| id.clone());
    let mut group = Group::new(GroupId::from(id.as_str()), &name, apps, rg.launch_if_needed);
    group.order = rg.order;
    if let Some(spec) = rg.shortcut {
        group.shortcut = Some(Chord::parse(&spec).ok_or_else(|| {
            Error::invalid(Some(&id), format!("invalid shortcut '{}'", spec))
        })?);
    }
    group
        .validate()
        .map_err(|e| Error::invalid(Some(&id), e.to_string()))?;
    Ok(group)
}
