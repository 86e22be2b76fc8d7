//! Macro blueprint: the desired shape of one macro and of the group that
//! holds them all.
//!
//! A blueprint is pure data computed from the macro number: identities,
//! generated names, the entry point's output, the rule's guard and its
//! two-action list. Provisioning writes it to a store; auditing compares a
//! store against it.

use std::time::Duration;

use crate::command;
use crate::entry_point::OutputAction;
use crate::id::{EntryPointId, GroupId, MacroNumber, RuleId, SignalId};
use crate::rule::{Guard, RuleAction};
use crate::signal::SignalState;

/// Display name of the group holding every macro rule.
pub const GROUP_NAME: &str = "NCE Macro Senders";

/// Delay before a fired trigger signal is reset to inactive.
pub const RESET_DELAY: Duration = Duration::from_millis(500);

/// Identity of the group holding every macro rule.
#[must_use]
pub fn group_id() -> GroupId {
    GroupId::nce_macros()
}

/// Desired state of the signal, entry point and rule of one macro.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacroBlueprint {
    number: MacroNumber,
}

impl MacroBlueprint {
    #[must_use]
    pub fn new(number: MacroNumber) -> Self {
        Self { number }
    }

    #[must_use]
    pub fn number(&self) -> MacroNumber {
        self.number
    }

    #[must_use]
    pub fn signal_id(&self) -> SignalId {
        SignalId::new(self.number)
    }

    #[must_use]
    pub fn entry_point_id(&self) -> EntryPointId {
        EntryPointId::new(self.number)
    }

    #[must_use]
    pub fn rule_id(&self) -> RuleId {
        RuleId::new(self.number)
    }

    #[must_use]
    pub fn signal_name(&self) -> String {
        format!("NCE Macro {} Trigger", self.number)
    }

    /// Name given to an entry point that has never been renamed.
    #[must_use]
    pub fn default_entry_point_name(&self) -> String {
        format!("Macro {}", self.number)
    }

    #[must_use]
    pub fn rule_name(&self) -> String {
        format!("Macro {}", self.number)
    }

    /// Name to give the recreated entry point, keeping a non-blank
    /// `existing` name.
    #[must_use]
    pub fn entry_point_name(&self, existing: Option<&str>) -> String {
        match existing {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => self.default_entry_point_name(),
        }
    }

    #[must_use]
    pub fn output(&self) -> OutputAction {
        OutputAction::activate(self.signal_id())
    }

    #[must_use]
    pub fn guard(&self) -> Guard {
        Guard::signal_active(self.signal_id())
    }

    /// Reset the trigger first, then send the macro command.
    #[must_use]
    pub fn actions(&self) -> Vec<RuleAction> {
        vec![
            RuleAction::DelayedSignalReset {
                signal: self.signal_id(),
                state: SignalState::Inactive,
                delay: RESET_DELAY,
            },
            RuleAction::RunScript {
                script: command::render(self.number),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blueprint(n: u16) -> MacroBlueprint {
        MacroBlueprint::new(MacroNumber::new(n))
    }

    #[test]
    fn should_derive_ids_from_number() {
        let bp = blueprint(12);
        assert_eq!(bp.signal_id().to_string(), "sensor:12");
        assert_eq!(bp.entry_point_id().to_string(), "route:12");
        assert_eq!(bp.rule_id().to_string(), "rule:12");
    }

    #[test]
    fn should_generate_names() {
        let bp = blueprint(3);
        assert_eq!(bp.signal_name(), "NCE Macro 3 Trigger");
        assert_eq!(bp.default_entry_point_name(), "Macro 3");
        assert_eq!(bp.rule_name(), "Macro 3");
    }

    #[test]
    fn should_keep_existing_entry_point_name() {
        let bp = blueprint(5);
        assert_eq!(bp.entry_point_name(Some("Custom5")), "Custom5");
        assert_eq!(bp.entry_point_name(Some("")), "Macro 5");
        assert_eq!(bp.entry_point_name(None), "Macro 5");
    }

    #[test]
    fn should_reset_before_sending_command() {
        let bp = blueprint(9);
        let actions = bp.actions();
        assert_eq!(actions.len(), 2);
        assert_eq!(
            actions[0],
            RuleAction::DelayedSignalReset {
                signal: bp.signal_id(),
                state: SignalState::Inactive,
                delay: Duration::from_millis(500),
            }
        );
        assert!(
            matches!(&actions[1], RuleAction::RunScript { script } if *script == command::render(MacroNumber::new(9)))
        );
    }

    #[test]
    fn should_wire_entry_point_and_guard_to_own_signal() {
        let bp = blueprint(1);
        assert_eq!(bp.output().signal, bp.signal_id());
        assert_eq!(bp.output().state, SignalState::Active);
        assert!(bp.guard().references(bp.signal_id()));
    }
}
