//! # ncemacros-domain
//!
//! Pure domain model for provisioning NCE macro senders in a layout
//! automation host.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Signals** (trigger flags), **Entry points** (user-invocable
//!   routes), **Rules** (guarded action lists) and the **Group** that holds
//!   the rules
//! - Define the **Blueprint** of one macro: identities, generated names,
//!   wiring and the two-action list
//! - Render the **Command template** handed to the host's script runner
//! - Describe run outcomes: provisioning reports, audit drift, graph exports
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod audit;
pub mod blueprint;
pub mod command;
pub mod entry_point;
pub mod graph;
pub mod group;
pub mod report;
pub mod rule;
pub mod signal;
pub mod station;
