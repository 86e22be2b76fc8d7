//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`MacroError`]
//! via `#[from]`.

use crate::id::IdParseError;

/// Base error returned by domain constructors and store operations.
#[derive(Debug, thiserror::Error)]
pub enum MacroError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("resource not found")]
    NotFound(#[from] NotFoundError),

    #[error("resource conflict")]
    Conflict(#[from] ConflictError),

    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl MacroError {
    /// Render this error and every source below it on one line.
    #[must_use]
    pub fn chain(&self) -> String {
        let mut text = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            text.push_str(": ");
            text.push_str(&err.to_string());
            source = err.source();
        }
        text
    }
}

/// A domain invariant was violated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("macro count {count} exceeds the maximum of {max}")]
    MacroCountOutOfRange { count: u32, max: u32 },

    #[error("invalid identifier")]
    InvalidId(#[from] IdParseError),
}

/// A resource addressed by identity does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} {id} not found")]
pub struct NotFoundError {
    pub kind: &'static str,
    pub id: String,
}

/// The store could not create a resource.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConflictError {
    #[error("{id} already exists")]
    AlreadyExists { id: String },

    #[error("name {name:?} is already used by {holder}")]
    NameTaken { name: String, holder: String },

    #[error("the store refused to create {id}")]
    Rejected { id: String },
}
