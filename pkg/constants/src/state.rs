//! State store key layout.

/// Key prefix under which namespace records are stored.
/// Full key = `NAMESPACE_PREFIX + name`.
pub const NAMESPACE_PREFIX: &str = "/registry/namespaces/";
