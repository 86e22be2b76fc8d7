//! Drift between a store and the desired macro set.

use serde::Serialize;

use crate::id::ResourceId;

/// What is wrong with one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "problem", rename_all = "snake_case")]
pub enum DriftKind {
    Missing,
    Mismatch { field: &'static str },
    /// The rule exists but the group does not list it.
    NotMember,
    Disabled,
    Inactive,
}

impl std::fmt::Display for DriftKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => f.write_str("missing"),
            Self::Mismatch { field } => write!(f, "{field} differs"),
            Self::NotMember => f.write_str("not a group member"),
            Self::Disabled => f.write_str("disabled"),
            Self::Inactive => f.write_str("not activated"),
        }
    }
}

/// One finding of an audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Drift {
    pub resource: ResourceId,
    #[serde(flatten)]
    pub kind: DriftKind,
}

impl std::fmt::Display for Drift {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.resource, self.kind)
    }
}

/// Every difference found between a store and the desired macro set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub drift: Vec<Drift>,
}

impl AuditReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.drift.is_empty()
    }

    pub fn push(&mut self, resource: impl Into<ResourceId>, kind: DriftKind) {
        self.drift.push(Drift {
            resource: resource.into(),
            kind,
        });
    }
}

impl std::fmt::Display for AuditReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_clean() {
            return f.write_str("no drift");
        }
        write!(f, "{} resources drifted", self.drift.len())?;
        for drift in &self.drift {
            write!(f, "\n  {drift}")?;
        }
        Ok(())
    }
}
