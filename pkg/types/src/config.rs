use serde::{Deserialize, Serialize};

/// rbac-manager configuration file (YAML).
///
/// Example `config.yaml`:
/// ```yaml
/// data-dir: /var/lib/rbac-manager/data
/// namespaces-file: /etc/rbac-manager/namespaces.yaml
/// output: yaml
/// log-format: json
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManagerConfigFile {
    /// SlateDB directory holding `/registry/namespaces/` records.
    #[serde(default, alias = "data-dir")]
    pub data_dir: Option<String>,
    /// Static namespace list; takes precedence over `data_dir` when set.
    #[serde(default, alias = "namespaces-file")]
    pub namespaces_file: Option<String>,
    #[serde(default)]
    pub output: Option<OutputFormat>,
    #[serde(default, alias = "log-format")]
    pub log_format: Option<LogFormat>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Load a YAML config file, returning the default if the file doesn't exist.
pub fn load_config_file<T: serde::de::DeserializeOwned + Default>(path: &str) -> anyhow::Result<T> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(T::default());
        }
        Err(e) => return Err(e.into()),
    };
    let config: T = serde_yaml::from_str(&content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let cfg: ManagerConfigFile = load_config_file("/nonexistent/rbac-manager.yaml").unwrap();
        assert!(cfg.data_dir.is_none());
        assert!(cfg.output.is_none());
    }

    #[test]
    fn parses_kebab_case_keys() {
        let cfg: ManagerConfigFile = serde_yaml::from_str(
            "data-dir: /data\nnamespaces-file: ns.yaml\noutput: json\nlog-format: json\n",
        )
        .unwrap();
        assert_eq!(cfg.data_dir.as_deref(), Some("/data"));
        assert_eq!(cfg.namespaces_file.as_deref(), Some("ns.yaml"));
        assert_eq!(cfg.output, Some(OutputFormat::Json));
        assert_eq!(cfg.log_format, Some(LogFormat::Json));
    }
}
