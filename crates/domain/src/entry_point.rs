//! Entry point: a user-invocable object whose only effect is setting a
//! signal.

use serde::{Deserialize, Serialize};

use crate::error::{MacroError, ValidationError};
use crate::id::{EntryPointId, SignalId};
use crate::signal::SignalState;

/// What an entry point does when it is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputAction {
    pub signal: SignalId,
    pub state: SignalState,
}

impl OutputAction {
    /// Set `signal` active.
    #[must_use]
    pub fn activate(signal: SignalId) -> Self {
        Self {
            signal,
            state: SignalState::Active,
        }
    }
}

impl std::fmt::Display for OutputAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "set {} {}", self.signal, self.state)
    }
}

/// A route that a user (or a panel) fires to request a macro.
///
/// The display name belongs to the user once created: reprovisioning keeps
/// whatever name the entry point carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPoint {
    pub id: EntryPointId,
    pub name: String,
    pub enabled: bool,
    pub output: Option<OutputAction>,
}

impl EntryPoint {
    /// A fresh, disabled entry point with no output wired.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] when `name` is blank.
    pub fn new(id: EntryPointId, name: impl Into<String>) -> Result<Self, MacroError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(Self {
            id,
            name,
            enabled: false,
            output: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::MacroNumber;

    #[test]
    fn should_create_disabled_entry_point_without_output() {
        let ep = EntryPoint::new(EntryPointId::new(MacroNumber::new(2)), "Macro 2").unwrap();
        assert!(!ep.enabled);
        assert!(ep.output.is_none());
    }

    #[test]
    fn should_display_output_action() {
        let action = OutputAction::activate(SignalId::new(MacroNumber::new(2)));
        assert_eq!(action.to_string(), "set sensor:2 active");
    }
}
