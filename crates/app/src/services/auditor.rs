//! Macro-set auditor: compares a store with the desired macro set without
//! writing to it.

use ncemacros_domain::audit::{AuditReport, DriftKind};
use ncemacros_domain::blueprint::{self, GROUP_NAME, MacroBlueprint};
use ncemacros_domain::error::MacroError;
use ncemacros_domain::group::Group;
use ncemacros_domain::id::MacroCount;

use crate::ports::ResourceStore;

/// Application service reporting drift between a store and a macro set.
pub struct MacroSetAuditor<S> {
    store: S,
}

impl<S: ResourceStore> MacroSetAuditor<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Audit macros `0..count` and the group holding them.
    ///
    /// Entry point names are user-owned and never reported.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    #[tracing::instrument(skip(self), fields(count = %count))]
    pub async fn audit(&self, count: MacroCount) -> Result<AuditReport, MacroError> {
        let mut report = AuditReport::default();
        let group_id = blueprint::group_id();
        let group = self.store.find_group(&group_id).await?;

        match &group {
            None => report.push(group_id.clone(), DriftKind::Missing),
            Some(group) => audit_group(group, count, &mut report),
        }

        for number in count.numbers() {
            let blueprint = MacroBlueprint::new(number);
            self.audit_macro(&blueprint, group.as_ref(), &mut report)
                .await?;
        }

        tracing::info!(drifted = report.drift.len(), "audit finished");
        Ok(report)
    }

    async fn audit_macro(
        &self,
        blueprint: &MacroBlueprint,
        group: Option<&Group>,
        report: &mut AuditReport,
    ) -> Result<(), MacroError> {
        let signal_id = blueprint.signal_id();
        match self.store.find_signal(signal_id).await? {
            None => report.push(signal_id, DriftKind::Missing),
            Some(signal) if signal.name != blueprint.signal_name() => {
                report.push(signal_id, DriftKind::Mismatch { field: "name" });
            }
            Some(_) => {}
        }

        let entry_point_id = blueprint.entry_point_id();
        match self.store.find_entry_point(entry_point_id).await? {
            None => report.push(entry_point_id, DriftKind::Missing),
            Some(entry_point) => {
                if entry_point.output != Some(blueprint.output()) {
                    report.push(entry_point_id, DriftKind::Mismatch { field: "output" });
                }
                if !entry_point.enabled {
                    report.push(entry_point_id, DriftKind::Disabled);
                }
            }
        }

        let rule_id = blueprint.rule_id();
        let Some(rule) = self.store.find_rule(rule_id).await? else {
            report.push(rule_id, DriftKind::Missing);
            return Ok(());
        };
        if rule.name != blueprint.rule_name() {
            report.push(rule_id, DriftKind::Mismatch { field: "name" });
        }
        if rule.guard != Some(blueprint.guard()) {
            report.push(rule_id, DriftKind::Mismatch { field: "guard" });
        }
        if !rule.trigger_on_change {
            report.push(
                rule_id,
                DriftKind::Mismatch {
                    field: "trigger_on_change",
                },
            );
        }
        if rule.actions != blueprint.actions() {
            report.push(rule_id, DriftKind::Mismatch { field: "actions" });
        }
        if group.is_some_and(|group| !group.contains(rule_id)) {
            report.push(rule_id, DriftKind::NotMember);
        }
        Ok(())
    }
}

fn audit_group(group: &Group, count: MacroCount, report: &mut AuditReport) {
    if group.name != GROUP_NAME {
        report.push(group.id.clone(), DriftKind::Mismatch { field: "name" });
    }
    if group
        .members
        .iter()
        .any(|member| !count.contains(member.number()))
    {
        report.push(group.id.clone(), DriftKind::Mismatch { field: "members" });
    }
    if !group.enabled {
        report.push(group.id.clone(), DriftKind::Disabled);
    }
    if !group.active {
        report.push(group.id.clone(), DriftKind::Inactive);
    }
}
