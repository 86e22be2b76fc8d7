//! Rule: a guarded, triggerable object carrying an ordered action list.
//!
//! A rule watches the signals named by its [`Guard`] and, when the guard
//! becomes true, executes its [`RuleAction`]s in order.

mod action;
mod guard;

pub use action::RuleAction;
pub use guard::{Guard, GuardVariable, LogicOperator};

use serde::{Deserialize, Serialize};

use crate::error::{MacroError, ValidationError};
use crate::id::RuleId;

/// A reactive rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    pub name: String,
    /// Fire on every guard change instead of only on transitions to true.
    pub trigger_on_change: bool,
    pub guard: Option<Guard>,
    pub actions: Vec<RuleAction>,
}

impl Rule {
    /// A fresh rule with no guard and no actions.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] when `name` is blank.
    pub fn new(id: RuleId, name: impl Into<String>) -> Result<Self, MacroError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(Self {
            id,
            name,
            trigger_on_change: false,
            guard: None,
            actions: Vec::new(),
        })
    }
}
