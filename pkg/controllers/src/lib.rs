//! Controllers that turn RBACDefinitions into native authorization objects.

pub mod error;
pub mod events;
pub mod rbacdefinition;
