//! Typed identifiers derived deterministically from a macro number.
//!
//! Every per-macro resource is addressed by a `<prefix>:<number>` key
//! (`sensor:5`, `route:5`, `rule:5`). The prefix is fixed by the type, so a
//! key for the wrong kind of resource cannot be built by accident. Host
//! specific spellings are produced by store adapters, never here.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Index of a single macro, `0..=65535`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MacroNumber(u16);

impl MacroNumber {
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }
}

impl From<u16> for MacroNumber {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl fmt::Display for MacroNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for MacroNumber {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// Number of macros in a set, `0..=65536`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct MacroCount(u32);

impl MacroCount {
    /// Largest supported set: one macro per `u16` index.
    pub const MAX: u32 = 1 << 16;

    /// Validate a macro count.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MacroCountOutOfRange`] when `count`
    /// exceeds [`MacroCount::MAX`].
    pub fn new(count: u32) -> Result<Self, ValidationError> {
        if count > Self::MAX {
            return Err(ValidationError::MacroCountOutOfRange {
                count,
                max: Self::MAX,
            });
        }
        Ok(Self(count))
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate over every macro number in the set, in ascending order.
    pub fn numbers(self) -> impl Iterator<Item = MacroNumber> {
        (0..self.0).map(|n| {
            // `new` caps the count at `u16::MAX + 1`, so every index fits.
            MacroNumber(u16::try_from(n).unwrap_or(u16::MAX))
        })
    }

    /// Whether `number` belongs to this set.
    #[must_use]
    pub fn contains(self, number: MacroNumber) -> bool {
        u32::from(number.get()) < self.0
    }
}

impl TryFrom<u32> for MacroCount {
    type Error = ValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<u16> for MacroCount {
    fn from(value: u16) -> Self {
        Self(u32::from(value))
    }
}

impl From<MacroCount> for u32 {
    fn from(value: MacroCount) -> Self {
        value.0
    }
}

impl fmt::Display for MacroCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Failure to parse an identifier from its text form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdParseError {
    #[error("identifier {0:?} has no `kind:` prefix")]
    MissingPrefix(String),
    #[error("expected a `{expected}:` identifier, found {found:?}")]
    UnexpectedPrefix {
        expected: &'static str,
        found: String,
    },
    #[error("invalid macro number")]
    InvalidNumber(#[from] ParseIntError),
}

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident, $prefix:literal) => {
        $(#[doc = $doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(into = "String", try_from = "String")]
        pub struct $name(MacroNumber);

        impl $name {
            /// Text prefix of this identifier kind.
            pub const PREFIX: &'static str = $prefix;

            #[must_use]
            pub const fn new(number: MacroNumber) -> Self {
                Self(number)
            }

            /// The macro this resource belongs to.
            #[must_use]
            pub const fn number(self) -> MacroNumber {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}:{}", Self::PREFIX, self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let (prefix, number) = s
                    .split_once(':')
                    .ok_or_else(|| IdParseError::MissingPrefix(s.to_string()))?;
                if prefix != Self::PREFIX {
                    return Err(IdParseError::UnexpectedPrefix {
                        expected: Self::PREFIX,
                        found: s.to_string(),
                    });
                }
                Ok(Self(number.parse()?))
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.to_string()
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdParseError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

define_id!(
    /// Identifier of a trigger [`Signal`](crate::signal::Signal).
    SignalId,
    "sensor"
);

define_id!(
    /// Identifier of an [`EntryPoint`](crate::entry_point::EntryPoint).
    EntryPointId,
    "route"
);

define_id!(
    /// Identifier of a reactive [`Rule`](crate::rule::Rule).
    RuleId,
    "rule"
);

/// Identifier of a top-level [`Group`](crate::group::Group).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct GroupId(String);

impl GroupId {
    pub const PREFIX: &'static str = "group";

    /// The group holding every NCE macro rule.
    #[must_use]
    pub fn nce_macros() -> Self {
        Self("nce-macros".to_string())
    }

    /// The slug after the `group:` prefix.
    #[must_use]
    pub fn slug(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", Self::PREFIX, self.0)
    }
}

impl FromStr for GroupId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, slug) = s
            .split_once(':')
            .ok_or_else(|| IdParseError::MissingPrefix(s.to_string()))?;
        if prefix != Self::PREFIX || slug.is_empty() {
            return Err(IdParseError::UnexpectedPrefix {
                expected: Self::PREFIX,
                found: s.to_string(),
            });
        }
        Ok(Self(slug.to_string()))
    }
}

impl From<GroupId> for String {
    fn from(value: GroupId) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for GroupId {
    type Error = IdParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Any resource held by a store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ResourceId {
    Group(GroupId),
    Signal(SignalId),
    EntryPoint(EntryPointId),
    Rule(RuleId),
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Group(id) => id.fmt(f),
            Self::Signal(id) => id.fmt(f),
            Self::EntryPoint(id) => id.fmt(f),
            Self::Rule(id) => id.fmt(f),
        }
    }
}

impl FromStr for ResourceId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, _) = s
            .split_once(':')
            .ok_or_else(|| IdParseError::MissingPrefix(s.to_string()))?;
        match prefix {
            GroupId::PREFIX => s.parse().map(Self::Group),
            SignalId::PREFIX => s.parse().map(Self::Signal),
            EntryPointId::PREFIX => s.parse().map(Self::EntryPoint),
            RuleId::PREFIX => s.parse().map(Self::Rule),
            _ => Err(IdParseError::UnexpectedPrefix {
                expected: "group|sensor|route|rule",
                found: s.to_string(),
            }),
        }
    }
}

impl From<ResourceId> for String {
    fn from(value: ResourceId) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for ResourceId {
    type Error = IdParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<GroupId> for ResourceId {
    fn from(value: GroupId) -> Self {
        Self::Group(value)
    }
}

impl From<SignalId> for ResourceId {
    fn from(value: SignalId) -> Self {
        Self::Signal(value)
    }
}

impl From<EntryPointId> for ResourceId {
    fn from(value: EntryPointId) -> Self {
        Self::EntryPoint(value)
    }
}

impl From<RuleId> for ResourceId {
    fn from(value: RuleId) -> Self {
        Self::Rule(value)
    }
}
