//! End-to-end tests for the full provisioning stack.
//!
//! Each test builds an in-memory `SQLite` database, wires the real store into
//! the real services and checks the resulting resource graph.

use ncemacros_adapter_storage_sqlite_sqlx::{Config, SqliteResourceStore};
use ncemacros_app::ports::ResourceStore;
use ncemacros_app::services::{MacroSetAuditor, MacroSetProvisioner};
use ncemacros_domain::audit::DriftKind;
use ncemacros_domain::blueprint::MacroBlueprint;
use ncemacros_domain::id::{EntryPointId, MacroCount, MacroNumber, ResourceId, RuleId, SignalId};
use ncemacros_domain::report::FailureKind;
use ncemacros_domain::rule::RuleAction;
use ncemacros_domain::signal::SignalState;
use ncemacros_domain::station::CommandStation;

async fn store() -> SqliteResourceStore {
    let db = Config {
        database_url: "sqlite::memory:".to_string(),
    }
    .build()
    .await
    .expect("in-memory database should initialise");

    SqliteResourceStore::new(db.pool().clone())
}

fn n(value: u16) -> MacroNumber {
    MacroNumber::new(value)
}

fn count(value: u32) -> MacroCount {
    MacroCount::new(value).unwrap()
}

// ---------------------------------------------------------------------------
// Completeness
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_provision_full_power_cab_table() {
    let store = store().await;
    let macros = CommandStation::PowerCab.macro_count();

    let report = MacroSetProvisioner::new(store.clone())
        .provision(macros)
        .await
        .unwrap();
    assert!(report.is_success(), "{report}");
    assert_eq!(report.succeeded, 16);

    let graph = store.export().await.unwrap();
    assert_eq!(graph.groups.len(), 1);
    assert_eq!(graph.signals.len(), 16);
    assert_eq!(graph.entry_points.len(), 16);
    assert_eq!(graph.rules.len(), 16);

    let group = &graph.groups[0];
    assert!(group.enabled);
    assert!(group.active);
    let expected: Vec<RuleId> = (0..16).map(|i| RuleId::new(n(i))).collect();
    assert_eq!(group.members, expected);

    for (i, rule) in (0..16).zip(&graph.rules) {
        let blueprint = MacroBlueprint::new(n(i));
        assert_eq!(rule.name, format!("Macro {i}"));
        assert!(rule.trigger_on_change);
        assert_eq!(rule.guard, Some(blueprint.guard()));
        assert_eq!(rule.actions, blueprint.actions());
    }
}

#[tokio::test]
async fn should_wire_trigger_signal_through_entry_point_and_rule() {
    let store = store().await;
    MacroSetProvisioner::new(store.clone())
        .provision(count(4))
        .await
        .unwrap();

    let signal = store.find_signal(SignalId::new(n(3))).await.unwrap().unwrap();
    assert_eq!(signal.name, "NCE Macro 3 Trigger");
    assert_eq!(signal.state, SignalState::Inactive);

    let entry_point = store
        .find_entry_point(EntryPointId::new(n(3)))
        .await
        .unwrap()
        .unwrap();
    let output = entry_point.output.unwrap();
    assert_eq!(output.signal, signal.id);
    assert_eq!(output.state, SignalState::Active);

    let rule = store.find_rule(RuleId::new(n(3))).await.unwrap().unwrap();
    assert!(matches!(
        rule.actions.as_slice(),
        [
            RuleAction::DelayedSignalReset { signal: reset, state: SignalState::Inactive, .. },
            RuleAction::RunScript { script },
        ] if *reset == signal.id && script.contains("m.setElement(4, 3)   # Macro #")
    ));
}

// ---------------------------------------------------------------------------
// Idempotence
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_leave_identical_graph_when_run_twice() {
    let store = store().await;
    let provisioner = MacroSetProvisioner::new(store.clone());

    provisioner.provision(count(24)).await.unwrap();
    let first = store.export().await.unwrap();
    let report = provisioner.provision(count(24)).await.unwrap();

    assert!(report.is_success(), "{report}");
    assert_eq!(store.export().await.unwrap(), first);
}

#[tokio::test]
async fn should_report_no_drift_after_provisioning() {
    let store = store().await;
    MacroSetProvisioner::new(store.clone())
        .provision(count(8))
        .await
        .unwrap();

    let report = MacroSetAuditor::new(store).audit(count(8)).await.unwrap();
    assert!(report.is_clean(), "{report}");
}

// ---------------------------------------------------------------------------
// Name preservation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_preserve_renamed_entry_point() {
    let store = store().await;
    let provisioner = MacroSetProvisioner::new(store.clone());
    provisioner.provision(count(8)).await.unwrap();

    rename_entry_point(&store, "route:5", "Custom5").await;
    provisioner.provision(count(8)).await.unwrap();

    let entry_point = store
        .find_entry_point(EntryPointId::new(n(5)))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry_point.name, "Custom5");
    assert!(entry_point.enabled);
}

/// Rename an entry point the way a user would in the host.
async fn rename_entry_point(store: &SqliteResourceStore, id: &str, name: &str) {
    let id: EntryPointId = id.parse().unwrap();
    let existing = store.find_entry_point(id).await.unwrap().unwrap();
    store.delete_entry_point(id).await.unwrap();
    store.create_entry_point(id, name).await.unwrap();
    if let Some(output) = existing.output {
        store.set_entry_point_output(id, output).await.unwrap();
    }
    store
        .set_entry_point_enabled(id, existing.enabled)
        .await
        .unwrap();
}

// ---------------------------------------------------------------------------
// Partial failure
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_contain_name_conflict_to_its_macro() {
    let store = store().await;
    store
        .create_rule(RuleId::new(n(500)), "Macro 3")
        .await
        .unwrap();

    let report = MacroSetProvisioner::new(store.clone())
        .provision(count(10))
        .await
        .unwrap();

    assert_eq!(report.failed_numbers(), vec![n(3)]);
    assert_eq!(report.failures[0].kind, FailureKind::CreationConflict);
    assert!(
        report.failures[0].reason.contains("rule:500"),
        "{}",
        report.failures[0].reason
    );
    assert_eq!(report.succeeded, 9);

    let group = store.export().await.unwrap().groups.remove(0);
    assert!(group.active);
    assert!(!group.contains(RuleId::new(n(3))));

    let audit = MacroSetAuditor::new(store).audit(count(10)).await.unwrap();
    assert_eq!(audit.drift.len(), 1);
    assert_eq!(audit.drift[0].resource, ResourceId::from(RuleId::new(n(3))));
    assert_eq!(audit.drift[0].kind, DriftKind::Missing);
}
