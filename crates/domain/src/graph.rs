//! A full copy of a store's contents, ordered by identity.

use serde::{Deserialize, Serialize};

use crate::entry_point::EntryPoint;
use crate::group::Group;
use crate::rule::Rule;
use crate::signal::Signal;

/// Every resource held by a store.
///
/// Two graphs compare equal exactly when the stores hold the same
/// resources with the same attributes and wiring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGraph {
    pub groups: Vec<Group>,
    pub signals: Vec<Signal>,
    pub entry_points: Vec<EntryPoint>,
    pub rules: Vec<Rule>,
}

impl ResourceGraph {
    /// Sort every collection by identity.
    #[must_use]
    pub fn sorted(mut self) -> Self {
        self.groups.sort_by(|a, b| a.id.cmp(&b.id));
        self.signals.sort_by_key(|s| s.id);
        self.entry_points.sort_by_key(|e| e.id);
        self.rules.sort_by_key(|r| r.id);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
            && self.signals.is_empty()
            && self.entry_points.is_empty()
            && self.rules.is_empty()
    }
}
