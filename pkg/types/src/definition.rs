use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::meta::{LabelSelector, ObjectMeta};
use crate::rbac::Subject;

/// RBACDefinition custom resource.
///
/// Example:
/// ```yaml
/// apiVersion: rbacmanager.reactiveops.io/v1beta1
/// kind: RBACDefinition
/// metadata:
///   name: example
/// rbacBindings:
///   - name: admin
///     subjects:
///       - kind: ServiceAccount
///         name: sa1
///         namespace: ns1
///     roleBindings:
///       - clusterRole: view
///         namespaceSelector:
///           matchLabels:
///             env: prod
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RbacDefinition {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub rbac_bindings: Vec<RbacBinding>,
}

impl RbacDefinition {
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// True when any role binding uses a namespace selector, i.e. resolving
    /// this definition needs a namespace directory.
    pub fn has_namespace_selectors(&self) -> bool {
        self.rbac_bindings.iter().any(|binding| {
            binding
                .role_bindings
                .iter()
                .any(|rb| rb.namespace_selector.is_set())
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RbacBinding {
    pub name: String,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub cluster_role_bindings: Vec<ClusterRoleBindingSpec>,
    #[serde(default)]
    pub role_bindings: Vec<RoleBindingSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterRoleBindingSpec {
    #[serde(default)]
    pub cluster_role: String,
}

/// Desired namespace-scoped grant. Exactly one of `role`/`cluster_role` is
/// expected. A set `namespace_selector` overrides `namespace`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleBindingSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default)]
    pub namespace_selector: LabelSelector,
}

impl RoleBindingSpec {
    /// Role name, treating an empty string as unset.
    pub fn role(&self) -> Option<&str> {
        non_empty(&self.role)
    }

    /// ClusterRole name, treating an empty string as unset.
    pub fn cluster_role(&self) -> Option<&str> {
        non_empty(&self.cluster_role)
    }

    /// Literal namespace, treating an empty string as unset.
    pub fn namespace(&self) -> Option<&str> {
        non_empty(&self.namespace)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Load an RBACDefinition from a YAML (or JSON) file.
pub fn load_definition_file(path: &str) -> anyhow::Result<RbacDefinition> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read RBACDefinition {}", path))?;
    let definition: RbacDefinition = serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse RBACDefinition {}", path))?;
    Ok(definition)
}
