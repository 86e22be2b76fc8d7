//! Macro-set provisioner: makes a store hold exactly the declared macros.
//!
//! A run replaces the macro group, then reconciles every macro
//! independently (signal, entry point, rule, links) and finally enables and
//! activates the group. A macro that fails is recorded in the report and
//! left as it is; the run continues with the next one. Only a group that
//! cannot be created, or activated at the end, aborts the run.

use ncemacros_domain::blueprint::{self, GROUP_NAME, MacroBlueprint};
use ncemacros_domain::error::MacroError;
use ncemacros_domain::group::MemberPosition;
use ncemacros_domain::id::{GroupId, MacroCount};
use ncemacros_domain::report::{MacroFailure, ProvisioningReport, ReconcileStage};
use ncemacros_domain::time::now;

use crate::ports::ResourceStore;

/// Failures that abort a whole provisioning run.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("failed to create group {id}")]
    GroupCreation {
        id: GroupId,
        #[source]
        source: MacroError,
    },

    #[error("failed to enable group {id}")]
    GroupActivation {
        id: GroupId,
        #[source]
        source: MacroError,
    },
}

/// Application service reconciling a [`ResourceStore`] with a macro set.
pub struct MacroSetProvisioner<S> {
    store: S,
}

impl<S: ResourceStore> MacroSetProvisioner<S> {
    /// Create a new provisioner writing to the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrow the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Provision macros `0..count`.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::GroupCreation`] when the group cannot be
    /// replaced (nothing else is touched), or
    /// [`ProvisionError::GroupActivation`] when it cannot be enabled after
    /// the macros were reconciled. Per-macro failures are not errors: they
    /// are listed in the returned report.
    #[tracing::instrument(skip(self), fields(count = %count))]
    pub async fn provision(&self, count: MacroCount) -> Result<ProvisioningReport, ProvisionError> {
        let started_at = now();
        let group = blueprint::group_id();

        self.replace_group(&group)
            .await
            .map_err(|source| ProvisionError::GroupCreation {
                id: group.clone(),
                source,
            })?;

        let mut failures = Vec::new();
        for number in count.numbers() {
            let blueprint = MacroBlueprint::new(number);
            match self.reconcile(&group, &blueprint).await {
                Ok(()) => tracing::debug!(macro_number = %number, "macro linked"),
                Err(failure) => {
                    tracing::warn!(
                        macro_number = %number,
                        stage = %failure.stage,
                        reason = %failure.reason,
                        "macro not linked"
                    );
                    failures.push(failure);
                }
            }
        }

        self.activate_group(&group)
            .await
            .map_err(|source| ProvisionError::GroupActivation {
                id: group.clone(),
                source,
            })?;

        let failed = u32::try_from(failures.len()).unwrap_or(u32::MAX);
        let report = ProvisioningReport {
            attempted: count,
            succeeded: count.get().saturating_sub(failed),
            failures,
            started_at,
            finished_at: now(),
        };
        tracing::info!(
            attempted = %report.attempted,
            succeeded = report.succeeded,
            failed,
            "provisioning finished"
        );
        Ok(report)
    }

    /// Delete any previous group and create a fresh, disabled one.
    async fn replace_group(&self, group: &GroupId) -> Result<(), MacroError> {
        if self.store.find_group(group).await?.is_some() {
            self.store.delete_group(group).await?;
        }
        self.store.create_group(group, GROUP_NAME).await?;
        Ok(())
    }

    async fn activate_group(&self, group: &GroupId) -> Result<(), MacroError> {
        self.store.set_group_enabled(group, true).await?;
        self.store.activate_group(group).await
    }

    /// Bring one macro to [`ReconcileStage::Linked`].
    async fn reconcile(
        &self,
        group: &GroupId,
        blueprint: &MacroBlueprint,
    ) -> Result<(), MacroFailure> {
        let mut stage = ReconcileStage::Absent;
        let result = self.advance(group, blueprint, &mut stage).await;
        result.map_err(|err| MacroFailure::new(blueprint.number(), stage, &err))
    }

    async fn advance(
        &self,
        group: &GroupId,
        blueprint: &MacroBlueprint,
        stage: &mut ReconcileStage,
    ) -> Result<(), MacroError> {
        self.store
            .create_signal(blueprint.signal_id(), &blueprint.signal_name())
            .await?;
        *stage = ReconcileStage::SignalReady;

        self.replace_entry_point(blueprint).await?;
        *stage = ReconcileStage::EntryReady;

        self.replace_rule(blueprint).await?;
        *stage = ReconcileStage::RuleReady;

        self.link(group, blueprint).await?;
        *stage = ReconcileStage::Linked;
        Ok(())
    }

    /// Recreate the entry point, keeping the name it carried.
    async fn replace_entry_point(&self, blueprint: &MacroBlueprint) -> Result<(), MacroError> {
        let id = blueprint.entry_point_id();
        let existing = self.store.find_entry_point(id).await?;
        if existing.is_some() {
            self.store.delete_entry_point(id).await?;
        }
        let name = blueprint.entry_point_name(existing.as_ref().map(|ep| ep.name.as_str()));

        self.store.create_entry_point(id, &name).await?;
        self.store
            .set_entry_point_output(id, blueprint.output())
            .await?;
        self.store.set_entry_point_enabled(id, true).await
    }

    async fn replace_rule(&self, blueprint: &MacroBlueprint) -> Result<(), MacroError> {
        let id = blueprint.rule_id();
        if self.store.find_rule(id).await?.is_some() {
            self.store.delete_rule(id).await?;
        }
        self.store.create_rule(id, &blueprint.rule_name()).await?;
        self.store.set_rule_guard(id, blueprint.guard()).await?;
        self.store.set_rule_trigger_on_change(id, true).await
    }

    /// Register the rule with the group and attach its actions.
    async fn link(&self, group: &GroupId, blueprint: &MacroBlueprint) -> Result<(), MacroError> {
        let rule = blueprint.rule_id();
        self.store.remove_group_member(group, rule).await?;
        self.store
            .add_group_member(group, rule, MemberPosition::Append)
            .await?;
        self.store.set_rule_actions(rule, blueprint.actions()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_store::{Fault, InMemoryResourceStore};
    use ncemacros_domain::command;
    use ncemacros_domain::error::ConflictError;
    use ncemacros_domain::id::{EntryPointId, MacroNumber, RuleId, SignalId};
    use ncemacros_domain::report::FailureKind;
    use ncemacros_domain::rule::{Guard, RuleAction};
    use ncemacros_domain::signal::SignalState;

    fn n(value: u16) -> MacroNumber {
        MacroNumber::new(value)
    }

    fn count(value: u32) -> MacroCount {
        MacroCount::new(value).unwrap()
    }

    fn make_provisioner() -> MacroSetProvisioner<InMemoryResourceStore> {
        MacroSetProvisioner::new(InMemoryResourceStore::new())
    }

    #[tokio::test]
    async fn should_wire_single_macro_and_activate_group() {
        let provisioner = make_provisioner();
        let report = provisioner.provision(count(1)).await.unwrap();
        assert!(report.is_success());
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.to_string(), "success");

        let graph = provisioner.store().snapshot();
        assert_eq!(graph.groups.len(), 1);
        let group = &graph.groups[0];
        assert_eq!(group.name, "NCE Macro Senders");
        assert!(group.enabled);
        assert!(group.active);
        assert_eq!(group.members, vec![RuleId::new(n(0))]);

        let signal = &graph.signals[0];
        assert_eq!(signal.id, SignalId::new(n(0)));
        assert_eq!(signal.name, "NCE Macro 0 Trigger");
        assert_eq!(signal.state, SignalState::Inactive);

        let entry_point = &graph.entry_points[0];
        assert_eq!(entry_point.name, "Macro 0");
        assert!(entry_point.enabled);
        let output = entry_point.output.unwrap();
        assert_eq!(output.signal, SignalId::new(n(0)));
        assert_eq!(output.state, SignalState::Active);

        let rule = &graph.rules[0];
        assert_eq!(rule.name, "Macro 0");
        assert!(rule.trigger_on_change);
        assert_eq!(rule.guard, Some(Guard::signal_active(SignalId::new(n(0)))));
        assert_eq!(rule.actions.len(), 2);
    }

    #[tokio::test]
    async fn should_activate_empty_group_when_count_is_zero() {
        let provisioner = make_provisioner();
        let report = provisioner.provision(count(0)).await.unwrap();
        assert!(report.is_success());
        assert_eq!(report.succeeded, 0);

        let graph = provisioner.store().snapshot();
        assert!(graph.groups[0].enabled);
        assert!(graph.groups[0].active);
        assert!(graph.groups[0].members.is_empty());
        assert!(graph.signals.is_empty());
        assert!(graph.entry_points.is_empty());
        assert!(graph.rules.is_empty());
    }

    #[tokio::test]
    async fn should_create_every_macro_of_the_set() {
        let provisioner = make_provisioner();
        let report = provisioner.provision(count(16)).await.unwrap();
        assert_eq!(report.succeeded, 16);

        let store = provisioner.store();
        let group = store.snapshot().groups.remove(0);
        for i in 0..16 {
            assert!(store.find_signal(SignalId::new(n(i))).await.unwrap().is_some());
            assert!(
                store
                    .find_entry_point(EntryPointId::new(n(i)))
                    .await
                    .unwrap()
                    .is_some()
            );
            assert!(store.find_rule(RuleId::new(n(i))).await.unwrap().is_some());
            assert!(group.contains(RuleId::new(n(i))));
        }
        let expected: Vec<RuleId> = (0..16).map(|i| RuleId::new(n(i))).collect();
        assert_eq!(group.members, expected);
    }

    #[tokio::test]
    async fn should_reset_then_send_command() {
        let provisioner = make_provisioner();
        provisioner.provision(count(8)).await.unwrap();
        let rule = provisioner
            .store()
            .find_rule(RuleId::new(n(7)))
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(
            &rule.actions[0],
            RuleAction::DelayedSignalReset { signal, state: SignalState::Inactive, delay }
                if *signal == SignalId::new(n(7)) && delay.as_millis() == 500
        ));
        assert!(matches!(
            &rule.actions[1],
            RuleAction::RunScript { script } if *script == command::render(n(7))
        ));
    }

    #[tokio::test]
    async fn should_leave_identical_graph_when_run_twice() {
        let provisioner = make_provisioner();
        provisioner.provision(count(32)).await.unwrap();
        let first = provisioner.store().snapshot();
        let report = provisioner.provision(count(32)).await.unwrap();
        assert!(report.is_success());
        assert_eq!(provisioner.store().snapshot(), first);
    }

    #[tokio::test]
    async fn should_preserve_user_assigned_entry_point_name() {
        let store = InMemoryResourceStore::new();
        store
            .create_entry_point(EntryPointId::new(n(5)), "Custom5")
            .await
            .unwrap();
        let provisioner = MacroSetProvisioner::new(store.clone());

        provisioner.provision(count(8)).await.unwrap();
        provisioner.provision(count(8)).await.unwrap();

        let ep = store
            .find_entry_point(EntryPointId::new(n(5)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ep.name, "Custom5");
        assert!(ep.enabled);
        assert_eq!(ep.output.map(|o| o.signal), Some(SignalId::new(n(5))));
        let other = store
            .find_entry_point(EntryPointId::new(n(4)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(other.name, "Macro 4");
    }

    #[tokio::test]
    async fn should_replace_stale_rule_definition() {
        let store = InMemoryResourceStore::new();
        let id = RuleId::new(n(1));
        store.create_rule(id, "Old name").await.unwrap();
        store
            .set_rule_actions(
                id,
                vec![RuleAction::RunScript {
                    script: "stale".to_string(),
                }],
            )
            .await
            .unwrap();
        let provisioner = MacroSetProvisioner::new(store.clone());

        provisioner.provision(count(2)).await.unwrap();

        let rule = store.find_rule(id).await.unwrap().unwrap();
        assert_eq!(rule.name, "Macro 1");
        assert!(rule.trigger_on_change);
        assert_eq!(rule.actions, MacroBlueprint::new(n(1)).actions());
    }

    #[tokio::test]
    async fn should_contain_creation_failure_to_its_macro() {
        let store = InMemoryResourceStore::new();
        store.inject(Fault::Create(SignalId::new(n(3)).into()));
        let provisioner = MacroSetProvisioner::new(store.clone());

        let report = provisioner.provision(count(10)).await.unwrap();

        assert_eq!(report.failed_numbers(), vec![n(3)]);
        assert_eq!(report.succeeded, 9);
        let failure = &report.failures[0];
        assert_eq!(failure.stage, ReconcileStage::Absent);
        assert_eq!(failure.kind, FailureKind::CreationConflict);
        assert!(failure.reason.starts_with("object error on macro 3 creation"));
        for i in (0..10).filter(|i| *i != 3) {
            assert!(report.is_linked(n(i)), "macro {i} should be linked");
        }

        let graph = store.snapshot();
        let group = &graph.groups[0];
        assert!(group.enabled && group.active);
        assert!(!group.contains(RuleId::new(n(3))));
        assert_eq!(group.members.len(), 9);
        assert!(store.find_rule(RuleId::new(n(3))).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_record_partial_link_and_keep_partial_objects() {
        let store = InMemoryResourceStore::new();
        store.inject(Fault::SetActions(RuleId::new(n(2))));
        let provisioner = MacroSetProvisioner::new(store.clone());

        let report = provisioner.provision(count(4)).await.unwrap();

        assert_eq!(report.failed_numbers(), vec![n(2)]);
        let failure = &report.failures[0];
        assert_eq!(failure.stage, ReconcileStage::RuleReady);
        assert_eq!(failure.kind, FailureKind::PartialLink);

        let rule = store.find_rule(RuleId::new(n(2))).await.unwrap().unwrap();
        assert!(rule.actions.is_empty());
        assert!(store.snapshot().groups[0].contains(RuleId::new(n(2))));
    }

    #[tokio::test]
    async fn should_fail_macro_whose_signal_name_is_taken() {
        let store = InMemoryResourceStore::new();
        store
            .create_signal(SignalId::new(n(900)), "NCE Macro 2 Trigger")
            .await
            .unwrap();
        let provisioner = MacroSetProvisioner::new(store.clone());

        let report = provisioner.provision(count(3)).await.unwrap();

        assert_eq!(report.failed_numbers(), vec![n(2)]);
        assert!(report.failures[0].reason.contains("sensor:900"));
    }

    #[tokio::test]
    async fn should_abort_when_group_cannot_be_created() {
        let store = InMemoryResourceStore::new();
        store.inject(Fault::Create(blueprint::group_id().into()));
        let provisioner = MacroSetProvisioner::new(store.clone());

        let result = provisioner.provision(count(4)).await;

        assert!(matches!(
            result,
            Err(ProvisionError::GroupCreation {
                source: MacroError::Conflict(ConflictError::Rejected { .. }),
                ..
            })
        ));
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn should_report_activation_failure() {
        let store = InMemoryResourceStore::new();
        store.inject(Fault::Activate(blueprint::group_id()));
        let provisioner = MacroSetProvisioner::new(store.clone());

        let result = provisioner.provision(count(2)).await;

        assert!(matches!(result, Err(ProvisionError::GroupActivation { .. })));
        let group = store.snapshot().groups.remove(0);
        assert!(group.enabled);
        assert!(!group.active);
    }

    #[tokio::test]
    async fn should_rebuild_group_membership_from_scratch() {
        let store = InMemoryResourceStore::new();
        let group = blueprint::group_id();
        store.create_group(&group, "Old").await.unwrap();
        for i in [9, 1, 1] {
            store
                .add_group_member(&group, RuleId::new(n(i)), MemberPosition::Append)
                .await
                .unwrap();
        }
        let provisioner = MacroSetProvisioner::new(store.clone());

        provisioner.provision(count(3)).await.unwrap();

        let rebuilt = store.find_group(&group).await.unwrap().unwrap();
        assert_eq!(rebuilt.name, "NCE Macro Senders");
        assert_eq!(
            rebuilt.members,
            vec![RuleId::new(n(0)), RuleId::new(n(1)), RuleId::new(n(2))]
        );
    }
}
