//! # ncemacros-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define the **port trait** that stores must implement:
//!   - `ResourceStore`: groups, signals, entry points and rules of a host
//! - Define the **use-case services**:
//!   - `MacroSetProvisioner`: idempotently create and wire a macro set
//!   - `MacroSetAuditor`: report drift from the desired macro set
//! - Provide an **in-process store** (`InMemoryResourceStore`) for dry runs
//!   and tests
//!
//! ## Dependency rule
//! Depends on `ncemacros-domain` only. Never imports adapter crates. Adapters
//! depend on *this* crate, not the reverse.

pub mod memory_store;
pub mod ports;
pub mod services;
