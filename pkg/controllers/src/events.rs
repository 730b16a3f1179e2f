//! Diagnostic events recorded during resolution.
//!
//! The resolver never logs on its own; it returns these alongside the
//! produced objects and the caller decides where they go.

use pkg_types::rbac::RoleRef;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveEvent {
    /// The definition has no bindings; nothing is produced.
    NoBindings { definition: String },
    /// A ServiceAccount was emitted for a subject.
    ServiceAccount {
        binding: String,
        name: String,
        namespace: String,
    },
    /// A ClusterRoleBinding was emitted.
    ClusterRoleBinding {
        binding: String,
        name: String,
        role_ref: RoleRef,
    },
    /// A role binding spec was accepted and is being expanded.
    RoleBindingSpec {
        binding: String,
        role_ref: RoleRef,
        target: String,
    },
    /// A namespace selector was evaluated against the directory.
    NamespaceSelector {
        binding: String,
        selector: String,
        matched: Vec<String>,
    },
    /// A RoleBinding was emitted.
    RoleBinding {
        binding: String,
        name: String,
        namespace: String,
    },
}

impl ResolveEvent {
    /// Forward this event to `tracing`.
    pub fn log(&self) {
        match self {
            ResolveEvent::NoBindings { .. } => warn!("{}", self),
            ResolveEvent::NamespaceSelector { matched, .. } if matched.is_empty() => {
                warn!("{}", self)
            }
            _ => debug!("{}", self),
        }
    }
}

impl std::fmt::Display for ResolveEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveEvent::NoBindings { definition } => {
                write!(f, "RBACDefinition {}: no rbacBindings defined", definition)
            }
            ResolveEvent::ServiceAccount {
                binding,
                name,
                namespace,
            } => write!(f, "{}: service account {}/{}", binding, namespace, name),
            ResolveEvent::ClusterRoleBinding {
                binding,
                name,
                role_ref,
            } => write!(f, "{}: cluster role binding {} -> {}", binding, name, role_ref),
            ResolveEvent::RoleBindingSpec {
                binding,
                role_ref,
                target,
            } => write!(f, "{}: processing requested {} in {}", binding, role_ref, target),
            ResolveEvent::NamespaceSelector {
                binding,
                selector,
                matched,
            } if matched.is_empty() => write!(
                f,
                "{}: namespace selector '{}' matched no namespaces",
                binding, selector
            ),
            ResolveEvent::NamespaceSelector {
                binding,
                selector,
                matched,
            } => write!(
                f,
                "{}: namespace selector '{}' matched [{}]",
                binding,
                selector,
                matched.join(", ")
            ),
            ResolveEvent::RoleBinding {
                binding,
                name,
                namespace,
            } => write!(f, "{}: role binding {}/{}", binding, namespace, name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_display_lists_matches() {
        let event = ResolveEvent::NamespaceSelector {
            binding: "admin".to_string(),
            selector: "env=prod".to_string(),
            matched: vec!["ns1".to_string(), "ns2".to_string()],
        };
        assert_eq!(
            event.to_string(),
            "admin: namespace selector 'env=prod' matched [ns1, ns2]"
        );
    }

    #[test]
    fn empty_selector_match_is_called_out() {
        let event = ResolveEvent::NamespaceSelector {
            binding: "admin".to_string(),
            selector: "env=prod".to_string(),
            matched: vec![],
        };
        assert!(event.to_string().contains("matched no namespaces"));
    }
}
