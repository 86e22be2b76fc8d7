//! Signal: a boolean flag used as an edge trigger between an entry point
//! and a rule.

use serde::{Deserialize, Serialize};

use crate::error::{MacroError, ValidationError};
use crate::id::SignalId;

/// State of a [`Signal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalState {
    Active,
    #[default]
    Inactive,
}

impl std::fmt::Display for SignalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => f.write_str("active"),
            Self::Inactive => f.write_str("inactive"),
        }
    }
}

impl std::str::FromStr for SignalState {
    type Err = UnknownSignalState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(UnknownSignalState(other.to_string())),
        }
    }
}

/// Text that is neither `active` nor `inactive`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown signal state {0:?}")]
pub struct UnknownSignalState(pub String);

/// A trigger flag owned by one macro.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub id: SignalId,
    pub name: String,
    pub state: SignalState,
}

impl Signal {
    /// A fresh, inactive signal.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] when `name` is blank.
    pub fn new(id: SignalId, name: impl Into<String>) -> Result<Self, MacroError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(Self {
            id,
            name,
            state: SignalState::Inactive,
        })
    }
}
