//! Application services: use-case implementations.
//!
//! Each service struct accepts a port implementation via a generic parameter
//! (constructor injection), keeping this layer decoupled from concrete stores.

pub mod auditor;
pub mod provisioner;

pub use auditor::MacroSetAuditor;
pub use provisioner::{MacroSetProvisioner, ProvisionError};
