//! `SQLite` implementation of [`ResourceStore`].

use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use ncemacros_app::ports::ResourceStore;
use ncemacros_domain::entry_point::{EntryPoint, OutputAction};
use ncemacros_domain::error::{ConflictError, MacroError, NotFoundError};
use ncemacros_domain::graph::ResourceGraph;
use ncemacros_domain::group::{Group, MemberPosition};
use ncemacros_domain::id::{EntryPointId, GroupId, RuleId, SignalId};
use ncemacros_domain::rule::{Guard, Rule, RuleAction};
use ncemacros_domain::signal::{Signal, SignalState};

use crate::error::StorageError;
use crate::system_name;

fn decode<E>(err: E) -> sqlx::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    sqlx::Error::Decode(Box::new(err))
}

/// Wrappers converting database rows into domain types without polluting
/// domain structs with database concerns.
struct GroupRow(Group);
struct SignalRow(Signal);
struct EntryPointRow(EntryPoint);
struct RuleRow(Rule);

impl<'r> FromRow<'r, SqliteRow> for GroupRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let members: String = row.try_get("members")?;

        Ok(Self(Group {
            id: GroupId::from_str(&id).map_err(decode)?,
            name: row.try_get("name")?,
            enabled: row.try_get("enabled")?,
            active: row.try_get("active")?,
            members: serde_json::from_str(&members).map_err(decode)?,
        }))
    }
}

impl<'r> FromRow<'r, SqliteRow> for SignalRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let state: String = row.try_get("state")?;

        Ok(Self(Signal {
            id: SignalId::from_str(&id).map_err(decode)?,
            name: row.try_get("name")?,
            state: SignalState::from_str(&state).map_err(decode)?,
        }))
    }
}

impl<'r> FromRow<'r, SqliteRow> for EntryPointRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let output: Option<String> = row.try_get("output")?;
        let output = output
            .map(|json| serde_json::from_str::<OutputAction>(&json))
            .transpose()
            .map_err(decode)?;

        Ok(Self(EntryPoint {
            id: EntryPointId::from_str(&id).map_err(decode)?,
            name: row.try_get("name")?,
            enabled: row.try_get("enabled")?,
            output,
        }))
    }
}

impl<'r> FromRow<'r, SqliteRow> for RuleRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let guard: Option<String> = row.try_get("guard")?;
        let guard = guard
            .map(|json| serde_json::from_str::<Guard>(&json))
            .transpose()
            .map_err(decode)?;
        let actions: String = row.try_get("actions")?;

        Ok(Self(Rule {
            id: RuleId::from_str(&id).map_err(decode)?,
            name: row.try_get("name")?,
            trigger_on_change: row.try_get("trigger_on_change")?,
            guard,
            actions: serde_json::from_str(&actions).map_err(decode)?,
        }))
    }
}

// ── Groups ────────────────────────────────────────────────────────

const SELECT_GROUP: &str = "SELECT * FROM rule_groups WHERE id = ?";
const SELECT_ALL_GROUPS: &str = "SELECT * FROM rule_groups ORDER BY id";
const GROUP_NAME_HOLDER: &str = "SELECT id FROM rule_groups WHERE name = ? AND id != ?";
const INSERT_GROUP: &str = r"
    INSERT INTO rule_groups (id, system_name, name, enabled, active, members)
    VALUES (?, ?, ?, ?, ?, ?)
";
const UPDATE_GROUP_MEMBERS: &str = "UPDATE rule_groups SET members = ? WHERE id = ?";
const UPDATE_GROUP_ENABLED: &str = "UPDATE rule_groups SET enabled = ? WHERE id = ?";
const UPDATE_GROUP_ACTIVE: &str = "UPDATE rule_groups SET active = TRUE WHERE id = ?";
const DELETE_GROUP: &str = "DELETE FROM rule_groups WHERE id = ?";

// ── Signals ───────────────────────────────────────────────────────

const SELECT_SIGNAL: &str = "SELECT * FROM signals WHERE id = ?";
const SELECT_ALL_SIGNALS: &str = "SELECT * FROM signals ORDER BY number";
const SIGNAL_NAME_HOLDER: &str = "SELECT id FROM signals WHERE name = ? AND id != ?";
const UPSERT_SIGNAL: &str = r"
    INSERT INTO signals (id, number, system_name, name, state)
    VALUES (?, ?, ?, ?, ?)
    ON CONFLICT(id) DO UPDATE SET name = excluded.name, state = excluded.state
";

// ── Entry points ──────────────────────────────────────────────────

const SELECT_ENTRY_POINT: &str = "SELECT * FROM entry_points WHERE id = ?";
const SELECT_ALL_ENTRY_POINTS: &str = "SELECT * FROM entry_points ORDER BY number";
const ENTRY_POINT_NAME_HOLDER: &str = "SELECT id FROM entry_points WHERE name = ? AND id != ?";
const INSERT_ENTRY_POINT: &str = r"
    INSERT INTO entry_points (id, number, system_name, name, enabled, output)
    VALUES (?, ?, ?, ?, ?, NULL)
";
const UPDATE_ENTRY_POINT_OUTPUT: &str = "UPDATE entry_points SET output = ? WHERE id = ?";
const UPDATE_ENTRY_POINT_ENABLED: &str = "UPDATE entry_points SET enabled = ? WHERE id = ?";
const DELETE_ENTRY_POINT: &str = "DELETE FROM entry_points WHERE id = ?";

// ── Rules ─────────────────────────────────────────────────────────

const SELECT_RULE: &str = "SELECT * FROM rules WHERE id = ?";
const SELECT_ALL_RULES: &str = "SELECT * FROM rules ORDER BY number";
const RULE_NAME_HOLDER: &str = "SELECT id FROM rules WHERE name = ? AND id != ?";
const INSERT_RULE: &str = r"
    INSERT INTO rules (id, number, system_name, name, trigger_on_change, guard, actions)
    VALUES (?, ?, ?, ?, ?, NULL, '[]')
";
const UPDATE_RULE_GUARD: &str = "UPDATE rules SET guard = ? WHERE id = ?";
const UPDATE_RULE_TRIGGER: &str = "UPDATE rules SET trigger_on_change = ? WHERE id = ?";
const UPDATE_RULE_ACTIONS: &str = "UPDATE rules SET actions = ? WHERE id = ?";
const DELETE_RULE: &str = "DELETE FROM rules WHERE id = ?";

fn not_found(kind: &'static str, id: &impl ToString) -> MacroError {
    NotFoundError {
        kind,
        id: id.to_string(),
    }
    .into()
}

/// Fail with [`NotFoundError`] when an update matched no row.
fn affected(rows: u64, kind: &'static str, id: &impl ToString) -> Result<(), MacroError> {
    if rows == 0 {
        return Err(not_found(kind, id));
    }
    Ok(())
}

/// `SQLite`-backed resource store.
#[derive(Clone)]
pub struct SqliteResourceStore {
    pool: SqlitePool,
}

impl SqliteResourceStore {
    /// Create a new store using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Read every stored resource.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails or a row cannot be decoded.
    pub async fn export(&self) -> Result<ResourceGraph, MacroError> {
        let groups: Vec<GroupRow> = sqlx::query_as(SELECT_ALL_GROUPS)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        let signals: Vec<SignalRow> = sqlx::query_as(SELECT_ALL_SIGNALS)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        let entry_points: Vec<EntryPointRow> = sqlx::query_as(SELECT_ALL_ENTRY_POINTS)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        let rules: Vec<RuleRow> = sqlx::query_as(SELECT_ALL_RULES)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(ResourceGraph {
            groups: groups.into_iter().map(|w| w.0).collect(),
            signals: signals.into_iter().map(|w| w.0).collect(),
            entry_points: entry_points.into_iter().map(|w| w.0).collect(),
            rules: rules.into_iter().map(|w| w.0).collect(),
        })
    }

    /// Fail with [`ConflictError::NameTaken`] when another row of the
    /// same table already carries `name`.
    async fn ensure_name_free(
        &self,
        query: &'static str,
        name: &str,
        id: &str,
    ) -> Result<(), MacroError> {
        let holder: Option<String> = sqlx::query_scalar(query)
            .bind(name)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        match holder {
            Some(holder) => Err(ConflictError::NameTaken {
                name: name.to_string(),
                holder,
            }
            .into()),
            None => Ok(()),
        }
    }

    async fn load_group(&self, id: &GroupId) -> Result<Group, MacroError> {
        self.find_group(id)
            .await?
            .ok_or_else(|| not_found("Group", id))
    }

    async fn save_members(&self, group: &Group) -> Result<(), MacroError> {
        let members = serde_json::to_string(&group.members).map_err(StorageError::from)?;

        sqlx::query(UPDATE_GROUP_MEMBERS)
            .bind(members)
            .bind(group.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(())
    }
}

impl ResourceStore for SqliteResourceStore {
    async fn find_group(&self, id: &GroupId) -> Result<Option<Group>, MacroError> {
        let row: Option<GroupRow> = sqlx::query_as(SELECT_GROUP)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(row.map(|w| w.0))
    }

    async fn delete_group(&self, id: &GroupId) -> Result<(), MacroError> {
        sqlx::query(DELETE_GROUP)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(())
    }

    async fn create_group(&self, id: &GroupId, name: &str) -> Result<Group, MacroError> {
        if self.find_group(id).await?.is_some() {
            return Err(ConflictError::AlreadyExists { id: id.to_string() }.into());
        }
        self.ensure_name_free(GROUP_NAME_HOLDER, name, &id.to_string())
            .await?;
        let group = Group::new(id.clone(), name)?;
        let members = serde_json::to_string(&group.members).map_err(StorageError::from)?;

        sqlx::query(INSERT_GROUP)
            .bind(group.id.to_string())
            .bind(system_name::group(&group.id))
            .bind(&group.name)
            .bind(group.enabled)
            .bind(group.active)
            .bind(members)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(group)
    }

    async fn remove_group_member(&self, id: &GroupId, rule: RuleId) -> Result<(), MacroError> {
        let mut group = self.load_group(id).await?;
        if group.remove_member(rule) {
            self.save_members(&group).await?;
        }
        Ok(())
    }

    async fn add_group_member(
        &self,
        id: &GroupId,
        rule: RuleId,
        position: MemberPosition,
    ) -> Result<(), MacroError> {
        let mut group = self.load_group(id).await?;
        group.add_member(rule, position);
        self.save_members(&group).await
    }

    async fn set_group_enabled(&self, id: &GroupId, enabled: bool) -> Result<(), MacroError> {
        let result = sqlx::query(UPDATE_GROUP_ENABLED)
            .bind(enabled)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        affected(result.rows_affected(), "Group", id)
    }

    async fn activate_group(&self, id: &GroupId) -> Result<(), MacroError> {
        let result = sqlx::query(UPDATE_GROUP_ACTIVE)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        affected(result.rows_affected(), "Group", id)
    }

    async fn find_signal(&self, id: SignalId) -> Result<Option<Signal>, MacroError> {
        let row: Option<SignalRow> = sqlx::query_as(SELECT_SIGNAL)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(row.map(|w| w.0))
    }

    async fn create_signal(&self, id: SignalId, name: &str) -> Result<Signal, MacroError> {
        self.ensure_name_free(SIGNAL_NAME_HOLDER, name, &id.to_string())
            .await?;
        let signal = Signal::new(id, name)?;

        sqlx::query(UPSERT_SIGNAL)
            .bind(id.to_string())
            .bind(i64::from(id.number().get()))
            .bind(system_name::signal(id))
            .bind(&signal.name)
            .bind(signal.state.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(signal)
    }

    async fn find_entry_point(&self, id: EntryPointId) -> Result<Option<EntryPoint>, MacroError> {
        let row: Option<EntryPointRow> = sqlx::query_as(SELECT_ENTRY_POINT)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(row.map(|w| w.0))
    }

    async fn delete_entry_point(&self, id: EntryPointId) -> Result<(), MacroError> {
        sqlx::query(DELETE_ENTRY_POINT)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(())
    }

    async fn create_entry_point(
        &self,
        id: EntryPointId,
        name: &str,
    ) -> Result<EntryPoint, MacroError> {
        if self.find_entry_point(id).await?.is_some() {
            return Err(ConflictError::AlreadyExists { id: id.to_string() }.into());
        }
        self.ensure_name_free(ENTRY_POINT_NAME_HOLDER, name, &id.to_string())
            .await?;
        let entry_point = EntryPoint::new(id, name)?;

        sqlx::query(INSERT_ENTRY_POINT)
            .bind(id.to_string())
            .bind(i64::from(id.number().get()))
            .bind(system_name::entry_point(id))
            .bind(&entry_point.name)
            .bind(entry_point.enabled)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(entry_point)
    }

    async fn set_entry_point_output(
        &self,
        id: EntryPointId,
        output: OutputAction,
    ) -> Result<(), MacroError> {
        let output = serde_json::to_string(&output).map_err(StorageError::from)?;

        let result = sqlx::query(UPDATE_ENTRY_POINT_OUTPUT)
            .bind(output)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        affected(result.rows_affected(), "EntryPoint", &id)
    }

    async fn set_entry_point_enabled(
        &self,
        id: EntryPointId,
        enabled: bool,
    ) -> Result<(), MacroError> {
        let result = sqlx::query(UPDATE_ENTRY_POINT_ENABLED)
            .bind(enabled)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        affected(result.rows_affected(), "EntryPoint", &id)
    }

    async fn find_rule(&self, id: RuleId) -> Result<Option<Rule>, MacroError> {
        let row: Option<RuleRow> = sqlx::query_as(SELECT_RULE)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(row.map(|w| w.0))
    }

    async fn delete_rule(&self, id: RuleId) -> Result<(), MacroError> {
        sqlx::query(DELETE_RULE)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(())
    }

    async fn create_rule(&self, id: RuleId, name: &str) -> Result<Rule, MacroError> {
        if self.find_rule(id).await?.is_some() {
            return Err(ConflictError::AlreadyExists { id: id.to_string() }.into());
        }
        self.ensure_name_free(RULE_NAME_HOLDER, name, &id.to_string())
            .await?;
        let rule = Rule::new(id, name)?;

        sqlx::query(INSERT_RULE)
            .bind(id.to_string())
            .bind(i64::from(id.number().get()))
            .bind(system_name::rule(id))
            .bind(&rule.name)
            .bind(rule.trigger_on_change)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rule)
    }

    async fn set_rule_guard(&self, id: RuleId, guard: Guard) -> Result<(), MacroError> {
        let guard = serde_json::to_string(&guard).map_err(StorageError::from)?;

        let result = sqlx::query(UPDATE_RULE_GUARD)
            .bind(guard)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        affected(result.rows_affected(), "Rule", &id)
    }

    async fn set_rule_trigger_on_change(
        &self,
        id: RuleId,
        trigger_on_change: bool,
    ) -> Result<(), MacroError> {
        let result = sqlx::query(UPDATE_RULE_TRIGGER)
            .bind(trigger_on_change)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        affected(result.rows_affected(), "Rule", &id)
    }

    async fn set_rule_actions(
        &self,
        id: RuleId,
        actions: Vec<RuleAction>,
    ) -> Result<(), MacroError> {
        let actions = serde_json::to_string(&actions).map_err(StorageError::from)?;

        let result = sqlx::query(UPDATE_RULE_ACTIONS)
            .bind(actions)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        affected(result.rows_affected(), "Rule", &id)
    }
}
