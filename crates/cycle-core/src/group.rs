//! Application groups bound to a shortcut.

use std::{collections::HashSet, fmt};

use cycle_keys::Chord;
use serde::{Deserialize, Serialize};

use crate::{Candidate, Error, Result, order};

/// Opaque group identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    /// The raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for GroupId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for GroupId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A configured application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppDescriptor {
    /// Stable bundle/package identifier.
    pub bundle_id: String,
    /// Display name.
    pub name: String,
}

impl AppDescriptor {
    /// Build a descriptor.
    pub fn new(bundle_id: &str, name: &str) -> Self {
        Self {
            bundle_id: bundle_id.to_string(),
            name: name.to_string(),
        }
    }
}

/// How a group orders its candidates before cycling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleOrder {
    /// Configured app order, then enumeration order.
    #[default]
    Configured,
    /// Most recently activated first.
    RecentFirst,
}

/// A named group of applications switched with one shortcut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// Identity.
    pub id: GroupId,
    /// Display name.
    pub name: String,
    /// Configured apps, no duplicate bundle ids.
    pub apps: Vec<AppDescriptor>,
    /// When true every configured app participates and idle ones are launched
    /// on selection; otherwise only running instances participate.
    pub launch_if_needed: bool,
    /// Ordering applied to live candidates.
    pub order: CycleOrder,
    /// Shortcut bound to this group, used for release detection.
    pub shortcut: Option<Chord>,
    /// Identifier of the last activated candidate.
    pub last_active_id: Option<String>,
    /// Most recently used candidate ids, most recent first.
    pub mru: Vec<String>,
}

impl Group {
    /// Build a group with default ordering and no remembered state.
    pub fn new(id: GroupId, name: &str, apps: Vec<AppDescriptor>, launch_if_needed: bool) -> Self {
        Self {
            id,
            name: name.to_string(),
            apps,
            launch_if_needed,
            order: CycleOrder::default(),
            shortcut: None,
            last_active_id: None,
            mru: Vec::new(),
        }
    }

    /// Check the app list for empty or repeated bundle ids.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for app in &self.apps {
            if app.bundle_id.trim().is_empty() {
                return Err(Error::EmptyBundleId {
                    group: self.id.to_string(),
                });
            }
            if !seen.insert(app.bundle_id.as_str()) {
                return Err(Error::DuplicateApp {
                    group: self.id.to_string(),
                    bundle_id: app.bundle_id.clone(),
                });
            }
        }
        Ok(())
    }

    /// Set of configured stable identifiers.
    pub fn stable_ids(&self) -> HashSet<String> {
        self.apps.iter().map(|a| a.bundle_id.clone()).collect()
    }

    /// Apply this group's ordering to a live candidate set.
    pub fn arrange(&self, candidates: Vec<Candidate>) -> Vec<Candidate> {
        match self.order {
            CycleOrder::Configured => candidates,
            CycleOrder::RecentFirst => order::sorted_by_mru(&candidates, &self.mru),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_duplicates() {
        let g = Group::new(
            GroupId::from("g"),
            "G",
            vec![AppDescriptor::new("com.a", "A"), AppDescriptor::new("com.a", "A2")],
            false,
        );
        assert_eq!(
            g.validate(),
            Err(Error::DuplicateApp {
                group: "g".into(),
                bundle_id: "com.a".into()
            })
        );
    }

    #[test]
    fn validate_rejects_empty_bundle() {
        let g = Group::new(GroupId::from("g"), "G", vec![AppDescriptor::new(" ", "A")], false);
        assert!(matches!(g.validate(), Err(Error::EmptyBundleId { .. })));
    }

    #[test]
    fn cycle_order_serde() {
        let o: CycleOrder = ron::from_str("recent_first").expect("parse");
        assert_eq!(o, CycleOrder::RecentFirst);
    }

    #[test]
    fn arrange_recent_first() {
        let mut g = Group::new(
            GroupId::from("g"),
            "G",
            vec![AppDescriptor::new("a", "A"), AppDescriptor::new("b", "B")],
            false,
        );
        g.order = CycleOrder::RecentFirst;
        g.mru = vec!["b::2".into()];
        let cands = vec![Candidate::process("a", 1, "A"), Candidate::process("b", 2, "B")];
        let ids: Vec<String> = g.arrange(cands).into_iter().map(|c| c.id.to_string()).collect();
        assert_eq!(ids, vec!["b::2", "a::1"]);
    }
}
