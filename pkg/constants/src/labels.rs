//! Identifying labels stamped on every object the resolver produces.

/// Label key marking objects owned by rbac-manager.
pub const MANAGED_BY_LABEL_KEY: &str = "rbac-manager";

/// Label value paired with [`MANAGED_BY_LABEL_KEY`].
pub const MANAGED_BY_LABEL_VALUE: &str = "reactiveops";

/// The full fixed label set, in key order.
pub const MANAGED_LABELS: &[(&str, &str)] = &[(MANAGED_BY_LABEL_KEY, MANAGED_BY_LABEL_VALUE)];
