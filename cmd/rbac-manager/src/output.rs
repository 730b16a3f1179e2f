use pkg_controllers::rbacdefinition::Resolution;
use pkg_types::config::OutputFormat;
use serde_json::{Value, json};

/// Parse `--output` values.
pub fn parse_output(s: &str) -> Result<OutputFormat, String> {
    match s.to_ascii_lowercase().as_str() {
        "yaml" | "yml" => Ok(OutputFormat::Yaml),
        "json" => Ok(OutputFormat::Json),
        other => Err(format!("unknown output format '{}', expected yaml or json", other)),
    }
}

/// Flatten a resolution into manifest items: ServiceAccounts first, then
/// RoleBindings, then ClusterRoleBindings.
fn items(resolution: &Resolution) -> anyhow::Result<Vec<Value>> {
    let mut items = Vec::with_capacity(
        resolution.service_accounts.len()
            + resolution.role_bindings.len()
            + resolution.cluster_role_bindings.len(),
    );
    for sa in &resolution.service_accounts {
        items.push(serde_json::to_value(sa)?);
    }
    for rb in &resolution.role_bindings {
        items.push(serde_json::to_value(rb)?);
    }
    for crb in &resolution.cluster_role_bindings {
        items.push(serde_json::to_value(crb)?);
    }
    Ok(items)
}

/// Render as a multi-document YAML stream or a JSON `v1/List`.
pub fn render(resolution: &Resolution, format: OutputFormat) -> anyhow::Result<String> {
    let items = items(resolution)?;
    match format {
        OutputFormat::Yaml => {
            let mut out = String::new();
            for item in &items {
                out.push_str("---\n");
                out.push_str(&serde_yaml::to_string(item)?);
            }
            Ok(out)
        }
        OutputFormat::Json => {
            let list = json!({
                "apiVersion": "v1",
                "kind": "List",
                "items": items,
            });
            Ok(format!("{}\n", serde_json::to_string_pretty(&list)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkg_types::meta::ObjectMeta;
    use pkg_types::rbac::{ClusterRoleBinding, RoleBinding, RoleRef, ServiceAccount, Subject};

    fn meta(name: &str, namespace: Option<&str>) -> ObjectMeta {
        ObjectMeta {
            name: name.to_string(),
            namespace: namespace.map(str::to_string),
            ..Default::default()
        }
    }

    fn sample() -> Resolution {
        let subjects = vec![Subject::service_account("sa1", "ns1")];
        Resolution {
            service_accounts: vec![ServiceAccount::new(meta("sa1", Some("ns1")))],
            role_bindings: vec![RoleBinding::new(
                meta("example-admin-view", Some("ns1")),
                RoleRef::cluster_role("view"),
                subjects.clone(),
            )],
            cluster_role_bindings: vec![ClusterRoleBinding::new(
                meta("example-admin-cluster-admin", None),
                RoleRef::cluster_role("cluster-admin"),
                subjects,
            )],
            events: vec![],
        }
    }

    #[test]
    fn test_parse_output() {
        assert_eq!(parse_output("yaml"), Ok(OutputFormat::Yaml));
        assert_eq!(parse_output("JSON"), Ok(OutputFormat::Json));
        assert!(parse_output("toml").is_err());
    }

    #[test]
    fn test_render_yaml_documents_in_order() {
        let out = render(&sample(), OutputFormat::Yaml).unwrap();
        assert_eq!(out.matches("---\n").count(), 3);
        let sa = out.find("kind: ServiceAccount").unwrap();
        let rb = out.find("kind: RoleBinding").unwrap();
        let crb = out.find("kind: ClusterRoleBinding").unwrap();
        assert!(sa < rb && rb < crb);
    }

    #[test]
    fn test_render_json_list() {
        let out = render(&sample(), OutputFormat::Json).unwrap();
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["kind"], "List");
        let items = parsed["items"].as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[1]["metadata"]["name"], "example-admin-view");
        assert_eq!(items[1]["roleRef"]["name"], "view");
    }

    #[test]
    fn test_render_empty() {
        let out = render(&Resolution::default(), OutputFormat::Yaml).unwrap();
        assert!(out.is_empty());
    }
}
