//! Provisioning outcome: per-macro progress stages and the run report.

use serde::{Deserialize, Serialize};

use crate::error::MacroError;
use crate::id::{MacroCount, MacroNumber};
use crate::time::Timestamp;

/// How far the reconciliation of one macro got.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileStage {
    Absent,
    SignalReady,
    EntryReady,
    RuleReady,
    Linked,
}

impl ReconcileStage {
    /// Classify a failure that interrupted reconciliation at this stage.
    #[must_use]
    pub fn failure_kind(self) -> FailureKind {
        if self >= Self::RuleReady {
            FailureKind::PartialLink
        } else {
            FailureKind::CreationConflict
        }
    }
}

impl std::fmt::Display for ReconcileStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Absent => f.write_str("absent"),
            Self::SignalReady => f.write_str("signal_ready"),
            Self::EntryReady => f.write_str("entry_ready"),
            Self::RuleReady => f.write_str("rule_ready"),
            Self::Linked => f.write_str("linked"),
        }
    }
}

/// Category of a per-macro failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The store could not create (or replace) one of the macro's objects.
    CreationConflict,
    /// Objects exist but wiring them together failed.
    PartialLink,
}

/// A macro that did not reach [`ReconcileStage::Linked`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroFailure {
    pub number: MacroNumber,
    /// Last stage reached before the failure.
    pub stage: ReconcileStage,
    pub kind: FailureKind,
    pub reason: String,
}

impl MacroFailure {
    #[must_use]
    pub fn new(number: MacroNumber, stage: ReconcileStage, err: &MacroError) -> Self {
        Self {
            number,
            stage,
            kind: stage.failure_kind(),
            reason: format!("object error on macro {number} creation: {}", err.chain()),
        }
    }
}

/// Result of one provisioning run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningReport {
    pub attempted: MacroCount,
    pub succeeded: u32,
    pub failures: Vec<MacroFailure>,
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
}

impl ProvisioningReport {
    /// Whether every attempted macro was linked.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Whether `number` was attempted and reached [`ReconcileStage::Linked`].
    #[must_use]
    pub fn is_linked(&self, number: MacroNumber) -> bool {
        self.attempted.contains(number) && !self.failures.iter().any(|f| f.number == number)
    }

    /// Numbers of the macros that failed, in attempt order.
    #[must_use]
    pub fn failed_numbers(&self) -> Vec<MacroNumber> {
        self.failures.iter().map(|f| f.number).collect()
    }
}

impl std::fmt::Display for ProvisioningReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_success() {
            return f.write_str("success");
        }
        write!(
            f,
            "provisioned {} of {} macros, {} failed",
            self.succeeded,
            self.attempted,
            self.failures.len()
        )?;
        for failure in &self.failures {
            write!(f, "\n  [{}] {}", failure.stage, failure.reason)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConflictError;

    fn report(failures: Vec<MacroFailure>) -> ProvisioningReport {
        let ts = crate::time::now();
        let attempted = MacroCount::new(4).unwrap();
        ProvisioningReport {
            attempted,
            succeeded: attempted.get() - u32::try_from(failures.len()).unwrap(),
            failures,
            started_at: ts,
            finished_at: ts,
        }
    }

    fn conflict() -> MacroError {
        ConflictError::Rejected {
            id: "sensor:2".to_string(),
        }
        .into()
    }

    #[test]
    fn should_classify_failures_by_stage() {
        assert_eq!(
            ReconcileStage::Absent.failure_kind(),
            FailureKind::CreationConflict
        );
        assert_eq!(
            ReconcileStage::EntryReady.failure_kind(),
            FailureKind::CreationConflict
        );
        assert_eq!(
            ReconcileStage::RuleReady.failure_kind(),
            FailureKind::PartialLink
        );
    }

    #[test]
    fn should_display_success_when_nothing_failed() {
        assert_eq!(report(Vec::new()).to_string(), "success");
    }

    #[test]
    fn should_list_failures_in_summary() {
        let failure = MacroFailure::new(MacroNumber::new(2), ReconcileStage::Absent, &conflict());
        let text = report(vec![failure]).to_string();
        assert!(text.starts_with("provisioned 3 of 4 macros, 1 failed"));
        assert!(text.contains(
            "[absent] object error on macro 2 creation: resource conflict: the store refused to create sensor:2"
        ));
    }

    #[test]
    fn should_report_linked_macros() {
        let failure = MacroFailure::new(MacroNumber::new(2), ReconcileStage::Absent, &conflict());
        let report = report(vec![failure]);
        assert!(report.is_linked(MacroNumber::new(1)));
        assert!(!report.is_linked(MacroNumber::new(2)));
        assert!(!report.is_linked(MacroNumber::new(4)));
        assert_eq!(report.failed_numbers(), vec![MacroNumber::new(2)]);
    }
}
