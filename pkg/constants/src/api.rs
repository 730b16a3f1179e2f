//! API group / version / kind constants.

// ─── RBACDefinition custom resource ───────────────────────────────────────

/// `apiVersion` of the RBACDefinition custom resource.
pub const RBAC_DEFINITION_API_VERSION: &str = "rbacmanager.reactiveops.io/v1beta1";

/// `kind` of the RBACDefinition custom resource.
pub const RBAC_DEFINITION_KIND: &str = "RBACDefinition";

// ─── Produced objects ─────────────────────────────────────────────────────

/// `apiVersion` for core objects (ServiceAccount).
pub const CORE_API_VERSION: &str = "v1";

/// `apiVersion` for RoleBinding / ClusterRoleBinding.
pub const RBAC_API_VERSION: &str = "rbac.authorization.k8s.io/v1";

/// `apiGroup` carried by a binding's roleRef.
pub const RBAC_API_GROUP: &str = "rbac.authorization.k8s.io";

pub const SERVICE_ACCOUNT_KIND: &str = "ServiceAccount";
pub const ROLE_BINDING_KIND: &str = "RoleBinding";
pub const CLUSTER_ROLE_BINDING_KIND: &str = "ClusterRoleBinding";
pub const ROLE_KIND: &str = "Role";
pub const CLUSTER_ROLE_KIND: &str = "ClusterRole";
