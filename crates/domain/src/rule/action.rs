//! Rule actions: the effects executed, in order, when a guard becomes true.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::id::SignalId;
use crate::signal::SignalState;

/// An operation a rule performs once its guard turns true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleAction {
    /// Put a signal back into `state` after `delay`.
    DelayedSignalReset {
        signal: SignalId,
        state: SignalState,
        delay: Duration,
    },
    /// Hand an opaque script to the host's command runner.
    RunScript { script: String },
}

impl std::fmt::Display for RuleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DelayedSignalReset {
                signal,
                state,
                delay,
            } => write!(
                f,
                "set {signal} {state} after {}s",
                delay.as_secs_f64()
            ),
            Self::RunScript { script } => write!(f, "run_script({} bytes)", script.len()),
        }
    }
}
