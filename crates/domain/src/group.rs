//! Group: the top-level container that enables and activates a set of
//! rules together.

use serde::{Deserialize, Serialize};

use crate::error::{MacroError, ValidationError};
use crate::id::{GroupId, RuleId};

/// Where a rule is inserted into a group's member list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemberPosition {
    #[default]
    Append,
    /// Insert before the member currently at this index (clamped to the end).
    At(usize),
}

impl MemberPosition {
    /// Map the host convention where `-1` means "append".
    #[must_use]
    pub fn from_host_index(index: i64) -> Self {
        usize::try_from(index).map_or(Self::Append, Self::At)
    }
}

/// A named, ordered set of rules sharing one enable/activate lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub enabled: bool,
    pub active: bool,
    pub members: Vec<RuleId>,
}

impl Group {
    /// A fresh group: disabled, inactive and empty.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] when `name` is blank.
    pub fn new(id: GroupId, name: impl Into<String>) -> Result<Self, MacroError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(Self {
            id,
            name,
            enabled: false,
            active: false,
            members: Vec::new(),
        })
    }

    #[must_use]
    pub fn contains(&self, rule: RuleId) -> bool {
        self.members.contains(&rule)
    }

    /// Insert `rule` at `position`.
    pub fn add_member(&mut self, rule: RuleId, position: MemberPosition) {
        match position {
            MemberPosition::Append => self.members.push(rule),
            MemberPosition::At(index) => {
                let index = index.min(self.members.len());
                self.members.insert(index, rule);
            }
        }
    }

    /// Drop every membership of `rule`. Returns whether one was present.
    pub fn remove_member(&mut self, rule: RuleId) -> bool {
        let before = self.members.len();
        self.members.retain(|member| *member != rule);
        self.members.len() != before
    }

    /// Start evaluating member rules.
    pub fn activate(&mut self) {
        self.active = true;
    }
}
