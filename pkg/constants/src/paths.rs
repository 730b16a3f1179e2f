//! Filesystem path constants.

/// Default config file path for the rbac-manager CLI.
pub const DEFAULT_CONFIG: &str = "/etc/rbac-manager/config.yaml";

/// Default data directory for the namespace state store.
pub const DEFAULT_DATA_DIR: &str = "/tmp/rbac-manager-data";
