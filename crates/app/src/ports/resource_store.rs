//! Resource store port: the host objects a macro set is built from.
//!
//! A store holds signals, entry points, rules and groups, each addressed by
//! a typed identity. Lookups return `Ok(None)` for absent resources;
//! mutating an absent resource fails with [`NotFoundError`]. Creating an
//! identity that already exists fails with [`ConflictError::AlreadyExists`],
//! except for signals, which are provided: an existing signal with the same
//! identity is replaced by a fresh inactive one. A display name already held
//! by another resource of the same kind fails with
//! [`ConflictError::NameTaken`].
//!
//! [`NotFoundError`]: ncemacros_domain::error::NotFoundError
//! [`ConflictError::AlreadyExists`]: ncemacros_domain::error::ConflictError::AlreadyExists
//! [`ConflictError::NameTaken`]: ncemacros_domain::error::ConflictError::NameTaken

use std::future::Future;

use ncemacros_domain::entry_point::{EntryPoint, OutputAction};
use ncemacros_domain::error::MacroError;
use ncemacros_domain::group::{Group, MemberPosition};
use ncemacros_domain::id::{EntryPointId, GroupId, RuleId, SignalId};
use ncemacros_domain::rule::{Guard, Rule, RuleAction};
use ncemacros_domain::signal::Signal;

/// Capability set of a host automation environment.
pub trait ResourceStore {
    // ── Groups ────────────────────────────────────────────────────

    /// Look up a group by identity.
    fn find_group(
        &self,
        id: &GroupId,
    ) -> impl Future<Output = Result<Option<Group>, MacroError>> + Send;

    /// Delete a group. Member rules are left untouched.
    fn delete_group(&self, id: &GroupId) -> impl Future<Output = Result<(), MacroError>> + Send;

    /// Create a disabled, inactive, empty group.
    fn create_group(
        &self,
        id: &GroupId,
        name: &str,
    ) -> impl Future<Output = Result<Group, MacroError>> + Send;

    /// Drop every membership of `rule` from the group.
    fn remove_group_member(
        &self,
        id: &GroupId,
        rule: RuleId,
    ) -> impl Future<Output = Result<(), MacroError>> + Send;

    /// Add `rule` to the group at `position`.
    fn add_group_member(
        &self,
        id: &GroupId,
        rule: RuleId,
        position: MemberPosition,
    ) -> impl Future<Output = Result<(), MacroError>> + Send;

    fn set_group_enabled(
        &self,
        id: &GroupId,
        enabled: bool,
    ) -> impl Future<Output = Result<(), MacroError>> + Send;

    /// Start evaluating the group's rules.
    fn activate_group(&self, id: &GroupId) -> impl Future<Output = Result<(), MacroError>> + Send;

    // ── Signals ───────────────────────────────────────────────────

    fn find_signal(
        &self,
        id: SignalId,
    ) -> impl Future<Output = Result<Option<Signal>, MacroError>> + Send;

    /// Provide a fresh inactive signal named `name`.
    fn create_signal(
        &self,
        id: SignalId,
        name: &str,
    ) -> impl Future<Output = Result<Signal, MacroError>> + Send;

    // ── Entry points ──────────────────────────────────────────────

    fn find_entry_point(
        &self,
        id: EntryPointId,
    ) -> impl Future<Output = Result<Option<EntryPoint>, MacroError>> + Send;

    fn delete_entry_point(
        &self,
        id: EntryPointId,
    ) -> impl Future<Output = Result<(), MacroError>> + Send;

    /// Create a disabled entry point with no output.
    fn create_entry_point(
        &self,
        id: EntryPointId,
        name: &str,
    ) -> impl Future<Output = Result<EntryPoint, MacroError>> + Send;

    fn set_entry_point_output(
        &self,
        id: EntryPointId,
        output: OutputAction,
    ) -> impl Future<Output = Result<(), MacroError>> + Send;

    fn set_entry_point_enabled(
        &self,
        id: EntryPointId,
        enabled: bool,
    ) -> impl Future<Output = Result<(), MacroError>> + Send;

    // ── Rules ─────────────────────────────────────────────────────

    fn find_rule(&self, id: RuleId)
    -> impl Future<Output = Result<Option<Rule>, MacroError>> + Send;

    fn delete_rule(&self, id: RuleId) -> impl Future<Output = Result<(), MacroError>> + Send;

    /// Create a rule with no guard and no actions.
    fn create_rule(
        &self,
        id: RuleId,
        name: &str,
    ) -> impl Future<Output = Result<Rule, MacroError>> + Send;

    fn set_rule_guard(
        &self,
        id: RuleId,
        guard: Guard,
    ) -> impl Future<Output = Result<(), MacroError>> + Send;

    fn set_rule_trigger_on_change(
        &self,
        id: RuleId,
        trigger_on_change: bool,
    ) -> impl Future<Output = Result<(), MacroError>> + Send;

    /// Replace the rule's action list.
    fn set_rule_actions(
        &self,
        id: RuleId,
        actions: Vec<RuleAction>,
    ) -> impl Future<Output = Result<(), MacroError>> + Send;
}
