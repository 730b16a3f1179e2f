use pkg_constants::api::{RBAC_DEFINITION_API_VERSION, RBAC_DEFINITION_KIND};
use pkg_constants::labels::MANAGED_LABELS;
use pkg_state::namespaces::NamespaceDirectory;
use pkg_types::definition::{RbacBinding, RbacDefinition, RoleBindingSpec};
use pkg_types::meta::{LabelSelector, ObjectMeta, OwnerReference};
use pkg_types::rbac::{
    ClusterRoleBinding, RoleBinding, RoleKind, RoleRef, ServiceAccount, Subject, SubjectKind,
};
use pkg_types::validate::validate_namespace_name;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use crate::error::{ResolveError, ValidationReason};
use crate::events::ResolveEvent;

/// Objects an RBACDefinition resolves into, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub service_accounts: Vec<ServiceAccount>,
    pub role_bindings: Vec<RoleBinding>,
    pub cluster_role_bindings: Vec<ClusterRoleBinding>,
    pub events: Vec<ResolveEvent>,
}

impl Resolution {
    pub fn is_empty(&self) -> bool {
        self.service_accounts.is_empty()
            && self.role_bindings.is_empty()
            && self.cluster_role_bindings.is_empty()
    }
}

/// Which output collections a resolution pass produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    All,
    RoleBindingsOnly,
}

/// Resolves RBACDefinitions into ServiceAccounts, RoleBindings and
/// ClusterRoleBindings.
///
/// Holds no per-call state, so one resolver can be shared freely. Each call
/// builds into a private accumulator that is dropped if any binding fails.
pub struct RbacDefinitionResolver {
    directory: Arc<dyn NamespaceDirectory>,
}

impl RbacDefinitionResolver {
    pub fn new(directory: Arc<dyn NamespaceDirectory>) -> Self {
        Self { directory }
    }

    /// Resolve every object the definition specifies.
    pub async fn resolve(&self, definition: &RbacDefinition) -> Result<Resolution, ResolveError> {
        self.run(definition, Scope::All).await
    }

    /// Resolve only the RoleBindings, e.g. after the namespace set changed and
    /// selector-driven bindings need recomputing. The other collections of the
    /// returned resolution are empty.
    pub async fn resolve_role_bindings(
        &self,
        definition: &RbacDefinition,
    ) -> Result<Resolution, ResolveError> {
        self.run(definition, Scope::RoleBindingsOnly).await
    }

    async fn run(
        &self,
        definition: &RbacDefinition,
        scope: Scope,
    ) -> Result<Resolution, ResolveError> {
        let mut pass = Pass::new(definition, scope)?;

        if definition.rbac_bindings.is_empty() {
            pass.out.events.push(ResolveEvent::NoBindings {
                definition: definition.name().to_string(),
            });
            return Ok(pass.out);
        }

        let mut seen = HashSet::new();
        for binding in &definition.rbac_bindings {
            if binding.name.is_empty() {
                return Err(pass.invalid(None, ValidationReason::EmptyBindingName));
            }
            if !seen.insert(binding.name.as_str()) {
                return Err(pass.invalid(Some(binding), ValidationReason::DuplicateBinding));
            }
            pass.binding(binding, self.directory.as_ref()).await?;
        }

        Ok(pass.out)
    }
}

// --- Object decoration ---

/// Owner references and labels applied uniformly to every produced object.
struct Decoration {
    owner_references: Vec<OwnerReference>,
    labels: BTreeMap<String, String>,
}

impl Decoration {
    fn for_definition(definition: &RbacDefinition) -> Self {
        let owner = OwnerReference {
            api_version: RBAC_DEFINITION_API_VERSION.to_string(),
            kind: RBAC_DEFINITION_KIND.to_string(),
            name: definition.name().to_string(),
            uid: definition.metadata.uid.clone().unwrap_or_default(),
            controller: Some(true),
            block_owner_deletion: Some(true),
        };
        let labels = MANAGED_LABELS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            owner_references: vec![owner],
            labels,
        }
    }

    fn meta(&self, name: String, namespace: Option<&str>) -> ObjectMeta {
        ObjectMeta {
            name,
            namespace: namespace.map(str::to_string),
            uid: None,
            labels: self.labels.clone(),
            owner_references: self.owner_references.clone(),
        }
    }
}

// --- Role binding spec resolution ---

enum NamespaceTarget<'a> {
    Literal(&'a str),
    Selector(&'a LabelSelector),
}

impl NamespaceTarget<'_> {
    fn describe(&self) -> String {
        match self {
            NamespaceTarget::Literal(ns) => format!("namespace {}", ns),
            NamespaceTarget::Selector(selector) => format!("namespaces matching '{}'", selector),
        }
    }
}

fn role_ref_of(spec: &RoleBindingSpec) -> Result<RoleRef, ValidationReason> {
    match (spec.role(), spec.cluster_role()) {
        (None, Some(cluster_role)) => Ok(RoleRef::cluster_role(cluster_role)),
        (Some(role), None) => Ok(RoleRef::role(role)),
        (Some(role), Some(cluster_role)) => Err(ValidationReason::AmbiguousRoleRef {
            role: role.to_string(),
            cluster_role: cluster_role.to_string(),
        }),
        (None, None) => Err(ValidationReason::MissingRoleRef),
    }
}

fn namespace_target_of(spec: &RoleBindingSpec) -> Result<NamespaceTarget<'_>, ValidationReason> {
    // A selector takes precedence over a literal namespace.
    if spec.namespace_selector.is_set() {
        return Ok(NamespaceTarget::Selector(&spec.namespace_selector));
    }
    match spec.namespace() {
        Some(namespace) => {
            validate_namespace(namespace)?;
            Ok(NamespaceTarget::Literal(namespace))
        }
        None => Err(ValidationReason::MissingNamespaceTarget),
    }
}

fn validate_namespace(namespace: &str) -> Result<(), ValidationReason> {
    validate_namespace_name(namespace).map_err(|e| ValidationReason::InvalidNamespace {
        message: e.to_string(),
    })
}

/// `<prefix>-<clusterRole>` or `<prefix>-<role>-<namespace>`.
fn role_binding_name(prefix: &str, role_ref: &RoleRef, namespace: &str) -> String {
    match role_ref.kind {
        RoleKind::ClusterRole => format!("{}-{}", prefix, role_ref.name),
        RoleKind::Role => format!("{}-{}-{}", prefix, role_ref.name, namespace),
    }
}

// --- A single resolution pass ---

struct Pass<'d> {
    definition: &'d RbacDefinition,
    scope: Scope,
    decoration: Decoration,
    out: Resolution,
}

impl<'d> Pass<'d> {
    fn new(definition: &'d RbacDefinition, scope: Scope) -> Result<Self, ResolveError> {
        let pass = Self {
            definition,
            scope,
            decoration: Decoration::for_definition(definition),
            out: Resolution::default(),
        };
        if definition.name().is_empty() {
            return Err(pass.invalid(None, ValidationReason::EmptyDefinitionName));
        }
        Ok(pass)
    }

    fn invalid(&self, binding: Option<&RbacBinding>, reason: ValidationReason) -> ResolveError {
        ResolveError::Validation {
            definition: self.definition.name().to_string(),
            binding: binding.map(|b| b.name.clone()),
            reason,
        }
    }

    async fn binding(
        &mut self,
        binding: &RbacBinding,
        directory: &dyn NamespaceDirectory,
    ) -> Result<(), ResolveError> {
        if binding.subjects.is_empty() {
            return Err(self.invalid(Some(binding), ValidationReason::NoSubjects));
        }
        let prefix = format!("{}-{}", self.definition.name(), binding.name);

        for subject in &binding.subjects {
            self.subject(binding, subject)?;
        }

        for spec in &binding.cluster_role_bindings {
            if spec.cluster_role.is_empty() {
                return Err(self.invalid(Some(binding), ValidationReason::MissingClusterRole));
            }
            if self.scope == Scope::All {
                self.emit_cluster_role_binding(binding, &prefix, &spec.cluster_role);
            }
        }

        for spec in &binding.role_bindings {
            self.role_binding_spec(binding, &prefix, spec, directory).await?;
        }
        Ok(())
    }

    fn subject(&mut self, binding: &RbacBinding, subject: &Subject) -> Result<(), ResolveError> {
        if subject.kind != SubjectKind::ServiceAccount {
            return Ok(());
        }
        let namespace = match subject.namespace.as_deref().filter(|ns| !ns.is_empty()) {
            Some(ns) => ns,
            None => {
                return Err(self.invalid(
                    Some(binding),
                    ValidationReason::ServiceAccountWithoutNamespace {
                        name: subject.name.clone(),
                    },
                ));
            }
        };
        validate_namespace(namespace).map_err(|reason| self.invalid(Some(binding), reason))?;

        if self.scope == Scope::All {
            let meta = self.decoration.meta(subject.name.clone(), Some(namespace));
            self.out.service_accounts.push(ServiceAccount::new(meta));
            self.out.events.push(ResolveEvent::ServiceAccount {
                binding: binding.name.clone(),
                name: subject.name.clone(),
                namespace: namespace.to_string(),
            });
        }
        Ok(())
    }

    fn emit_cluster_role_binding(
        &mut self,
        binding: &RbacBinding,
        prefix: &str,
        cluster_role: &str,
    ) {
        let name = format!("{}-{}", prefix, cluster_role);
        let role_ref = RoleRef::cluster_role(cluster_role);
        let meta = self.decoration.meta(name.clone(), None);
        self.out.cluster_role_bindings.push(ClusterRoleBinding::new(
            meta,
            role_ref.clone(),
            binding.subjects.clone(),
        ));
        self.out.events.push(ResolveEvent::ClusterRoleBinding {
            binding: binding.name.clone(),
            name,
            role_ref,
        });
    }

    async fn role_binding_spec(
        &mut self,
        binding: &RbacBinding,
        prefix: &str,
        spec: &RoleBindingSpec,
        directory: &dyn NamespaceDirectory,
    ) -> Result<(), ResolveError> {
        // Both checks run before any directory query.
        let role_ref = role_ref_of(spec).map_err(|reason| self.invalid(Some(binding), reason))?;
        let target =
            namespace_target_of(spec).map_err(|reason| self.invalid(Some(binding), reason))?;

        self.out.events.push(ResolveEvent::RoleBindingSpec {
            binding: binding.name.clone(),
            role_ref: role_ref.clone(),
            target: target.describe(),
        });

        match target {
            NamespaceTarget::Literal(namespace) => {
                self.emit_role_binding(binding, prefix, &role_ref, namespace);
            }
            NamespaceTarget::Selector(selector) => {
                let namespaces = directory.list(selector).await.map_err(|source| {
                    ResolveError::Lookup {
                        definition: self.definition.name().to_string(),
                        binding: binding.name.clone(),
                        selector: selector.to_string(),
                        source,
                    }
                })?;
                self.out.events.push(ResolveEvent::NamespaceSelector {
                    binding: binding.name.clone(),
                    selector: selector.to_string(),
                    matched: namespaces.clone(),
                });
                for namespace in &namespaces {
                    self.emit_role_binding(binding, prefix, &role_ref, namespace);
                }
            }
        }
        Ok(())
    }

    fn emit_role_binding(
        &mut self,
        binding: &RbacBinding,
        prefix: &str,
        role_ref: &RoleRef,
        namespace: &str,
    ) {
        let name = role_binding_name(prefix, role_ref, namespace);
        let meta = self.decoration.meta(name.clone(), Some(namespace));
        self.out.role_bindings.push(RoleBinding::new(
            meta,
            role_ref.clone(),
            binding.subjects.clone(),
        ));
        self.out.events.push(ResolveEvent::RoleBinding {
            binding: binding.name.clone(),
            name,
            namespace: namespace.to_string(),
        });
    }
}
