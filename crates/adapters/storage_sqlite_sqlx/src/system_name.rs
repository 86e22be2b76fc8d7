//! Host system names.
//!
//! The host addresses every object by a system name whose first letters
//! encode the object type (`IS` sensor, `IR` route, `IX` logix or
//! conditional). They are rendered here and stored next to each row so the
//! database can be matched against a host configuration.

use ncemacros_domain::id::{EntryPointId, GroupId, RuleId, SignalId};

const NCE_MACROS_GROUP: &str = "IXNCEM";

/// `IXNCEM` for the macro group, `IX` followed by the upper-cased slug
/// otherwise.
#[must_use]
pub fn group(id: &GroupId) -> String {
    if *id == GroupId::nce_macros() {
        return NCE_MACROS_GROUP.to_string();
    }
    let slug: String = id
        .slug()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    format!("IX{slug}")
}

#[must_use]
pub fn signal(id: SignalId) -> String {
    format!("IS:NCEM:{}", id.number())
}

#[must_use]
pub fn entry_point(id: EntryPointId) -> String {
    format!("IR:NCEM:{}", id.number())
}

/// Conditional names are the group name suffixed with `C` and the number.
#[must_use]
pub fn rule(id: RuleId) -> String {
    format!("{NCE_MACROS_GROUP}C{}", id.number())
}
