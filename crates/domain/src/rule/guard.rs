//! Guard: the expression a rule evaluates when one of its inputs changes.

use serde::{Deserialize, Serialize};

use crate::id::SignalId;
use crate::signal::SignalState;

/// How the guard's variables are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicOperator {
    #[default]
    AllAnd,
    AllOr,
    /// Combined through the free-form antecedent expression.
    Mixed,
}

/// One input of a guard: "signal is in state".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardVariable {
    pub signal: SignalId,
    pub expects: SignalState,
    pub negated: bool,
    /// Whether a change of this input re-evaluates the rule.
    pub triggers: bool,
}

/// A rule's trigger condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guard {
    pub operator: LogicOperator,
    /// Antecedent expression referencing variables as `R1`, `R2`, …
    pub antecedent: String,
    pub variables: Vec<GuardVariable>,
}

impl Guard {
    /// `R1` AND-of-one: fires when `signal` becomes active.
    #[must_use]
    pub fn signal_active(signal: SignalId) -> Self {
        Self {
            operator: LogicOperator::AllAnd,
            antecedent: "R1".to_string(),
            variables: vec![GuardVariable {
                signal,
                expects: SignalState::Active,
                negated: false,
                triggers: true,
            }],
        }
    }

    /// Whether any variable of this guard reads `signal`.
    #[must_use]
    pub fn references(&self, signal: SignalId) -> bool {
        self.variables.iter().any(|var| var.signal == signal)
    }
}

impl std::fmt::Display for Guard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:", self.antecedent)?;
        for (idx, var) in self.variables.iter().enumerate() {
            if idx > 0 {
                f.write_str(" and")?;
            }
            let not = if var.negated { " not" } else { "" };
            write!(f, "{not} {} is {}", var.signal, var.expects)?;
        }
        Ok(())
    }
}
