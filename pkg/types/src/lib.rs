//! Shared data model: the RBACDefinition input, the Kubernetes-shaped
//! authorization objects it resolves into, and supporting metadata types.

pub mod config;
pub mod definition;
pub mod meta;
pub mod namespace;
pub mod rbac;
pub mod validate;
