use pkg_constants::api::{
    CLUSTER_ROLE_BINDING_KIND, CLUSTER_ROLE_KIND, CORE_API_VERSION, RBAC_API_GROUP,
    RBAC_API_VERSION, ROLE_BINDING_KIND, ROLE_KIND, SERVICE_ACCOUNT_KIND,
};
use serde::{Deserialize, Serialize};

use crate::meta::ObjectMeta;

// --- Subject ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubjectKind {
    ServiceAccount,
    User,
    Group,
}

impl std::fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubjectKind::ServiceAccount => write!(f, "ServiceAccount"),
            SubjectKind::User => write!(f, "User"),
            SubjectKind::Group => write!(f, "Group"),
        }
    }
}

/// An identity granted access. Copied verbatim into every produced binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub kind: SubjectKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_group: Option<String>,
}

impl Subject {
    pub fn service_account(name: &str, namespace: &str) -> Self {
        Self {
            kind: SubjectKind::ServiceAccount,
            name: name.to_string(),
            namespace: Some(namespace.to_string()),
            api_group: None,
        }
    }

    pub fn user(name: &str) -> Self {
        Self {
            kind: SubjectKind::User,
            name: name.to_string(),
            namespace: None,
            api_group: Some(RBAC_API_GROUP.to_string()),
        }
    }

    pub fn group(name: &str) -> Self {
        Self {
            kind: SubjectKind::Group,
            name: name.to_string(),
            namespace: None,
            api_group: Some(RBAC_API_GROUP.to_string()),
        }
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}/{}@{}", self.kind, self.name, ns),
            None => write!(f, "{}/{}", self.kind, self.name),
        }
    }
}

// --- Role reference ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleKind {
    Role,
    ClusterRole,
}

impl RoleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleKind::Role => ROLE_KIND,
            RoleKind::ClusterRole => CLUSTER_ROLE_KIND,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRef {
    pub api_group: String,
    pub kind: RoleKind,
    pub name: String,
}

impl RoleRef {
    pub fn role(name: &str) -> Self {
        Self {
            api_group: RBAC_API_GROUP.to_string(),
            kind: RoleKind::Role,
            name: name.to_string(),
        }
    }

    pub fn cluster_role(name: &str) -> Self {
        Self {
            api_group: RBAC_API_GROUP.to_string(),
            kind: RoleKind::ClusterRole,
            name: name.to_string(),
        }
    }
}

impl std::fmt::Display for RoleRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.kind.as_str(), self.name)
    }
}

// --- ServiceAccount ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccount {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
}

impl ServiceAccount {
    pub fn new(metadata: ObjectMeta) -> Self {
        Self {
            api_version: CORE_API_VERSION.to_string(),
            kind: SERVICE_ACCOUNT_KIND.to_string(),
            metadata,
        }
    }
}

// --- RoleBinding ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleBinding {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub role_ref: RoleRef,
    pub subjects: Vec<Subject>,
}

impl RoleBinding {
    pub fn new(metadata: ObjectMeta, role_ref: RoleRef, subjects: Vec<Subject>) -> Self {
        Self {
            api_version: RBAC_API_VERSION.to_string(),
            kind: ROLE_BINDING_KIND.to_string(),
            metadata,
            role_ref,
            subjects,
        }
    }
}

// --- ClusterRoleBinding ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterRoleBinding {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub role_ref: RoleRef,
    pub subjects: Vec<Subject>,
}

impl ClusterRoleBinding {
    pub fn new(metadata: ObjectMeta, role_ref: RoleRef, subjects: Vec<Subject>) -> Self {
        Self {
            api_version: RBAC_API_VERSION.to_string(),
            kind: CLUSTER_ROLE_BINDING_KIND.to_string(),
            metadata,
            role_ref,
            subjects,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_binding_wire_shape() {
        let rb = RoleBinding::new(
            ObjectMeta {
                name: "example-admin-view".to_string(),
                namespace: Some("ns1".to_string()),
                ..Default::default()
            },
            RoleRef::cluster_role("view"),
            vec![Subject::service_account("sa1", "ns1")],
        );
        let json = serde_json::to_value(&rb).unwrap();
        assert_eq!(json["apiVersion"], "rbac.authorization.k8s.io/v1");
        assert_eq!(json["kind"], "RoleBinding");
        assert_eq!(json["roleRef"]["kind"], "ClusterRole");
        assert_eq!(json["roleRef"]["apiGroup"], "rbac.authorization.k8s.io");
        assert_eq!(json["subjects"][0]["kind"], "ServiceAccount");
        assert_eq!(json["subjects"][0]["namespace"], "ns1");
    }

    #[test]
    fn subject_parses_from_yaml() {
        let subject: Subject = serde_yaml::from_str("kind: Group\nname: devs\n").unwrap();
        assert_eq!(subject.kind, SubjectKind::Group);
        assert_eq!(subject.name, "devs");
        assert!(subject.namespace.is_none());
    }

    #[test]
    fn unknown_subject_kind_is_rejected() {
        let parsed: Result<Subject, _> = serde_yaml::from_str("kind: Robot\nname: r2\n");
        assert!(parsed.is_err());
    }
}
