//! In-process resource store.
//!
//! Holds the whole resource graph behind a shared mutex, so clones of a
//! store are handles onto the same graph. Used for dry runs and as the
//! store every use-case test runs against. Failures can be injected per
//! resource to exercise partial-failure handling.

use std::collections::{BTreeMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ncemacros_domain::entry_point::{EntryPoint, OutputAction};
use ncemacros_domain::error::{ConflictError, MacroError, NotFoundError};
use ncemacros_domain::graph::ResourceGraph;
use ncemacros_domain::group::{Group, MemberPosition};
use ncemacros_domain::id::{EntryPointId, GroupId, ResourceId, RuleId, SignalId};
use ncemacros_domain::rule::{Guard, Rule, RuleAction};
use ncemacros_domain::signal::Signal;

use crate::ports::ResourceStore;

/// A store operation that can be made to fail.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Fault {
    /// Creating this resource is refused.
    Create(ResourceId),
    /// Adding this rule to any group is refused.
    AddMember(RuleId),
    /// Replacing this rule's actions is refused.
    SetActions(RuleId),
    /// Activating this group is refused.
    Activate(GroupId),
}

#[derive(Default)]
struct Inner {
    groups: BTreeMap<GroupId, Group>,
    signals: BTreeMap<SignalId, Signal>,
    entry_points: BTreeMap<EntryPointId, EntryPoint>,
    rules: BTreeMap<RuleId, Rule>,
    faults: HashSet<Fault>,
}

impl Inner {
    fn check(&self, fault: Fault, id: impl Into<ResourceId>) -> Result<(), MacroError> {
        if self.faults.contains(&fault) {
            return Err(ConflictError::Rejected {
                id: id.into().to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn group_mut(&mut self, id: &GroupId) -> Result<&mut Group, MacroError> {
        self.groups.get_mut(id).ok_or_else(|| {
            NotFoundError {
                kind: "Group",
                id: id.to_string(),
            }
            .into()
        })
    }

    fn entry_point_mut(&mut self, id: EntryPointId) -> Result<&mut EntryPoint, MacroError> {
        self.entry_points.get_mut(&id).ok_or_else(|| {
            NotFoundError {
                kind: "EntryPoint",
                id: id.to_string(),
            }
            .into()
        })
    }

    fn rule_mut(&mut self, id: RuleId) -> Result<&mut Rule, MacroError> {
        self.rules.get_mut(&id).ok_or_else(|| {
            NotFoundError {
                kind: "Rule",
                id: id.to_string(),
            }
            .into()
        })
    }

    fn create_group(&mut self, id: &GroupId, name: &str) -> Result<Group, MacroError> {
        self.check(Fault::Create(id.clone().into()), id.clone())?;
        if self.groups.contains_key(id) {
            return Err(already_exists(id));
        }
        if let Some(holder) = name_holder(&self.groups, name, id, |g| &g.name) {
            return Err(name_taken(name, holder));
        }
        let group = Group::new(id.clone(), name)?;
        self.groups.insert(id.clone(), group.clone());
        Ok(group)
    }

    fn add_group_member(
        &mut self,
        id: &GroupId,
        rule: RuleId,
        position: MemberPosition,
    ) -> Result<(), MacroError> {
        self.check(Fault::AddMember(rule), rule)?;
        self.group_mut(id)?.add_member(rule, position);
        Ok(())
    }

    fn activate_group(&mut self, id: &GroupId) -> Result<(), MacroError> {
        self.check(Fault::Activate(id.clone()), id.clone())?;
        self.group_mut(id)?.activate();
        Ok(())
    }

    fn create_signal(&mut self, id: SignalId, name: &str) -> Result<Signal, MacroError> {
        self.check(Fault::Create(id.into()), id)?;
        if let Some(holder) = name_holder(&self.signals, name, &id, |s| &s.name) {
            return Err(name_taken(name, holder));
        }
        let signal = Signal::new(id, name)?;
        self.signals.insert(id, signal.clone());
        Ok(signal)
    }

    fn create_entry_point(
        &mut self,
        id: EntryPointId,
        name: &str,
    ) -> Result<EntryPoint, MacroError> {
        self.check(Fault::Create(id.into()), id)?;
        if self.entry_points.contains_key(&id) {
            return Err(already_exists(&id));
        }
        if let Some(holder) = name_holder(&self.entry_points, name, &id, |e| &e.name) {
            return Err(name_taken(name, holder));
        }
        let entry_point = EntryPoint::new(id, name)?;
        self.entry_points.insert(id, entry_point.clone());
        Ok(entry_point)
    }

    fn create_rule(&mut self, id: RuleId, name: &str) -> Result<Rule, MacroError> {
        self.check(Fault::Create(id.into()), id)?;
        if self.rules.contains_key(&id) {
            return Err(already_exists(&id));
        }
        if let Some(holder) = name_holder(&self.rules, name, &id, |r| &r.name) {
            return Err(name_taken(name, holder));
        }
        let rule = Rule::new(id, name)?;
        self.rules.insert(id, rule.clone());
        Ok(rule)
    }

    fn set_rule_actions(&mut self, id: RuleId, actions: Vec<RuleAction>) -> Result<(), MacroError> {
        self.check(Fault::SetActions(id), id)?;
        self.rule_mut(id)?.actions = actions;
        Ok(())
    }
}

/// Returns the identity of another resource already named `name`.
fn name_holder<'a, K, V>(
    items: &'a BTreeMap<K, V>,
    name: &str,
    except: &K,
    name_of: impl Fn(&V) -> &str,
) -> Option<&'a K>
where
    K: Ord,
{
    items
        .iter()
        .find(|&(key, value)| key != except && name_of(value) == name)
        .map(|(key, _)| key)
}

fn name_taken(name: &str, holder: &impl ToString) -> MacroError {
    ConflictError::NameTaken {
        name: name.to_string(),
        holder: holder.to_string(),
    }
    .into()
}

fn already_exists(id: &impl ToString) -> MacroError {
    ConflictError::AlreadyExists { id: id.to_string() }.into()
}

/// Resource store kept entirely in memory.
#[derive(Clone, Default)]
pub struct InMemoryResourceStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryResourceStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make `fault` fail from now on.
    pub fn inject(&self, fault: Fault) {
        self.lock().faults.insert(fault);
    }

    /// Stop failing `fault`.
    pub fn clear(&self, fault: &Fault) {
        self.lock().faults.remove(fault);
    }

    /// Copy of every resource currently held.
    #[must_use]
    pub fn snapshot(&self) -> ResourceGraph {
        let inner = self.lock();
        ResourceGraph {
            groups: inner.groups.values().cloned().collect(),
            signals: inner.signals.values().cloned().collect(),
            entry_points: inner.entry_points.values().cloned().collect(),
            rules: inner.rules.values().cloned().collect(),
        }
    }
}

impl ResourceStore for InMemoryResourceStore {
    fn find_group(
        &self,
        id: &GroupId,
    ) -> impl Future<Output = Result<Option<Group>, MacroError>> + Send {
        let result = self.lock().groups.get(id).cloned();
        async { Ok(result) }
    }

    fn delete_group(&self, id: &GroupId) -> impl Future<Output = Result<(), MacroError>> + Send {
        self.lock().groups.remove(id);
        async { Ok(()) }
    }

    fn create_group(
        &self,
        id: &GroupId,
        name: &str,
    ) -> impl Future<Output = Result<Group, MacroError>> + Send {
        let result = self.lock().create_group(id, name);
        async { result }
    }

    fn remove_group_member(
        &self,
        id: &GroupId,
        rule: RuleId,
    ) -> impl Future<Output = Result<(), MacroError>> + Send {
        let result = self.lock().group_mut(id).map(|group| {
            group.remove_member(rule);
        });
        async { result }
    }

    fn add_group_member(
        &self,
        id: &GroupId,
        rule: RuleId,
        position: MemberPosition,
    ) -> impl Future<Output = Result<(), MacroError>> + Send {
        let result = self.lock().add_group_member(id, rule, position);
        async { result }
    }

    fn set_group_enabled(
        &self,
        id: &GroupId,
        enabled: bool,
    ) -> impl Future<Output = Result<(), MacroError>> + Send {
        let result = self.lock().group_mut(id).map(|group| {
            group.enabled = enabled;
        });
        async { result }
    }

    fn activate_group(&self, id: &GroupId) -> impl Future<Output = Result<(), MacroError>> + Send {
        let result = self.lock().activate_group(id);
        async { result }
    }

    fn find_signal(
        &self,
        id: SignalId,
    ) -> impl Future<Output = Result<Option<Signal>, MacroError>> + Send {
        let result = self.lock().signals.get(&id).cloned();
        async { Ok(result) }
    }

    fn create_signal(
        &self,
        id: SignalId,
        name: &str,
    ) -> impl Future<Output = Result<Signal, MacroError>> + Send {
        let result = self.lock().create_signal(id, name);
        async { result }
    }

    fn find_entry_point(
        &self,
        id: EntryPointId,
    ) -> impl Future<Output = Result<Option<EntryPoint>, MacroError>> + Send {
        let result = self.lock().entry_points.get(&id).cloned();
        async { Ok(result) }
    }

    fn delete_entry_point(
        &self,
        id: EntryPointId,
    ) -> impl Future<Output = Result<(), MacroError>> + Send {
        self.lock().entry_points.remove(&id);
        async { Ok(()) }
    }

    fn create_entry_point(
        &self,
        id: EntryPointId,
        name: &str,
    ) -> impl Future<Output = Result<EntryPoint, MacroError>> + Send {
        let result = self.lock().create_entry_point(id, name);
        async { result }
    }

    fn set_entry_point_output(
        &self,
        id: EntryPointId,
        output: OutputAction,
    ) -> impl Future<Output = Result<(), MacroError>> + Send {
        let result = self.lock().entry_point_mut(id).map(|ep| {
            ep.output = Some(output);
        });
        async { result }
    }

    fn set_entry_point_enabled(
        &self,
        id: EntryPointId,
        enabled: bool,
    ) -> impl Future<Output = Result<(), MacroError>> + Send {
        let result = self.lock().entry_point_mut(id).map(|ep| {
            ep.enabled = enabled;
        });
        async { result }
    }

    fn find_rule(
        &self,
        id: RuleId,
    ) -> impl Future<Output = Result<Option<Rule>, MacroError>> + Send {
        let result = self.lock().rules.get(&id).cloned();
        async { Ok(result) }
    }

    fn delete_rule(&self, id: RuleId) -> impl Future<Output = Result<(), MacroError>> + Send {
        self.lock().rules.remove(&id);
        async { Ok(()) }
    }

    fn create_rule(
        &self,
        id: RuleId,
        name: &str,
    ) -> impl Future<Output = Result<Rule, MacroError>> + Send {
        let result = self.lock().create_rule(id, name);
        async { result }
    }

    fn set_rule_guard(
        &self,
        id: RuleId,
        guard: Guard,
    ) -> impl Future<Output = Result<(), MacroError>> + Send {
        let result = self.lock().rule_mut(id).map(|rule| {
            rule.guard = Some(guard);
        });
        async { result }
    }

    fn set_rule_trigger_on_change(
        &self,
        id: RuleId,
        trigger_on_change: bool,
    ) -> impl Future<Output = Result<(), MacroError>> + Send {
        let result = self.lock().rule_mut(id).map(|rule| {
            rule.trigger_on_change = trigger_on_change;
        });
        async { result }
    }

    fn set_rule_actions(
        &self,
        id: RuleId,
        actions: Vec<RuleAction>,
    ) -> impl Future<Output = Result<(), MacroError>> + Send {
        let result = self.lock().set_rule_actions(id, actions);
        async { result }
    }
}
