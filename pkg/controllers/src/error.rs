//! Errors raised while resolving an RBACDefinition.
//!
//! Resolution is all-or-nothing: either error aborts the whole definition and
//! no objects produced before the failure are returned.

use pkg_state::namespaces::DirectoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    /// The definition itself is malformed.
    #[error("RBACDefinition {definition}{}: {reason}", in_binding(.binding))]
    Validation {
        definition: String,
        binding: Option<String>,
        reason: ValidationReason,
    },

    /// The namespace directory could not answer a selector query.
    #[error("RBACDefinition {definition}, binding {binding}: namespace lookup for selector '{selector}' failed")]
    Lookup {
        definition: String,
        binding: String,
        selector: String,
        #[source]
        source: DirectoryError,
    },
}

impl ResolveError {
    pub fn is_validation(&self) -> bool {
        matches!(self, ResolveError::Validation { .. })
    }

    pub fn is_lookup(&self) -> bool {
        matches!(self, ResolveError::Lookup { .. })
    }

    /// The binding the error was raised for, if any.
    pub fn binding(&self) -> Option<&str> {
        match self {
            ResolveError::Validation { binding, .. } => binding.as_deref(),
            ResolveError::Lookup { binding, .. } => Some(binding),
        }
    }

    pub fn reason(&self) -> Option<&ValidationReason> {
        match self {
            ResolveError::Validation { reason, .. } => Some(reason),
            ResolveError::Lookup { .. } => None,
        }
    }
}

fn in_binding(binding: &Option<String>) -> String {
    match binding {
        Some(name) => format!(", binding {}", name),
        None => String::new(),
    }
}

/// Why a definition was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationReason {
    #[error("definition name must not be empty")]
    EmptyDefinitionName,

    #[error("binding name must not be empty")]
    EmptyBindingName,

    #[error("binding name is used more than once")]
    DuplicateBinding,

    #[error("no subjects specified")]
    NoSubjects,

    #[error("service account subject '{name}' has no namespace")]
    ServiceAccountWithoutNamespace { name: String },

    #[error("invalid namespace: {message}")]
    InvalidNamespace { message: String },

    #[error("cluster role binding requires a clusterRole")]
    MissingClusterRole,

    #[error("invalid role binding, role or clusterRole required")]
    MissingRoleRef,

    #[error("invalid role binding, role '{role}' and clusterRole '{cluster_role}' are mutually exclusive")]
    AmbiguousRoleRef { role: String, cluster_role: String },

    #[error("invalid role binding, namespace or namespace selector required")]
    MissingNamespaceTarget,
}
