mod output;

use clap::{Args, Parser, Subcommand};
use pkg_constants::paths::{DEFAULT_CONFIG, DEFAULT_DATA_DIR};
use pkg_controllers::rbacdefinition::{RbacDefinitionResolver, Resolution};
use pkg_state::client::StateStore;
use pkg_state::namespaces::{
    NamespaceDirectory, StaticNamespaceDirectory, StoreNamespaceDirectory,
};
use pkg_types::config::{LogFormat, ManagerConfigFile, OutputFormat, load_config_file};
use pkg_types::definition::{RbacDefinition, load_definition_file};
use pkg_types::meta::LabelSelector;
use pkg_types::namespace::load_namespaces_file;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "rbac-manager",
    about = "Resolve RBACDefinitions into ServiceAccounts, RoleBindings and ClusterRoleBindings"
)]
struct Cli {
    /// Path to YAML config file
    #[arg(long, short, default_value = DEFAULT_CONFIG)]
    config: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print every object an RBACDefinition resolves into
    Resolve {
        #[command(flatten)]
        source: SourceArgs,

        /// Output format (yaml or json)
        #[arg(long, short, value_parser = output::parse_output)]
        output: Option<OutputFormat>,
    },
    /// Print only the RoleBindings (recomputed after namespace changes)
    RoleBindings {
        #[command(flatten)]
        source: SourceArgs,

        /// Output format (yaml or json)
        #[arg(long, short, value_parser = output::parse_output)]
        output: Option<OutputFormat>,
    },
    /// Validate an RBACDefinition and summarize what it resolves into
    Check {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Manage namespace records in the state store
    Namespaces {
        #[command(subcommand)]
        action: NamespaceAction,
    },
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// RBACDefinition file (YAML or JSON)
    #[arg(long, short = 'f')]
    file: String,

    /// Static namespace list used to expand namespace selectors
    #[arg(long)]
    namespaces_file: Option<String>,

    /// Directory for SlateDB state storage
    #[arg(long)]
    data_dir: Option<String>,
}

#[derive(Subcommand, Debug)]
enum NamespaceAction {
    /// Load namespaces from a YAML list into the state store
    Import {
        /// YAML list of namespaces
        #[arg(long, short = 'f')]
        file: String,

        /// Directory for SlateDB state storage
        #[arg(long)]
        data_dir: Option<String>,
    },
    /// List stored namespaces matching a label selector
    List {
        /// Label selector, e.g. `env=prod,team=a` (empty selects all)
        #[arg(long, short = 'l', default_value = "")]
        selector: String,

        /// Directory for SlateDB state storage
        #[arg(long)]
        data_dir: Option<String>,
    },
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// The namespace directory a run resolves selectors against.
enum Directory {
    Static(Arc<StaticNamespaceDirectory>),
    Store {
        directory: Arc<StoreNamespaceDirectory>,
        store: StateStore,
    },
}

impl Directory {
    /// Pick a directory for `definition`. The state store is only opened when
    /// the definition actually uses namespace selectors.
    async fn open(
        definition: &RbacDefinition,
        source: &SourceArgs,
        file_cfg: &ManagerConfigFile,
    ) -> anyhow::Result<Self> {
        if !definition.has_namespace_selectors() {
            info!(
                "RBACDefinition {} has no namespace selectors; skipping namespace directory",
                definition.name()
            );
            return Ok(Directory::Static(Arc::default()));
        }

        // Merge: CLI args > config file > defaults
        let namespaces_file = source
            .namespaces_file
            .clone()
            .or_else(|| file_cfg.namespaces_file.clone());
        if let Some(path) = namespaces_file {
            let namespaces = load_namespaces_file(&path)?;
            info!("Loaded {} namespace(s) from {}", namespaces.len(), path);
            return Ok(Directory::Static(Arc::new(StaticNamespaceDirectory::new(
                namespaces,
            ))));
        }

        let data_dir = data_dir(source.data_dir.clone(), file_cfg);
        let store = StateStore::new(&data_dir).await?;
        Ok(Directory::Store {
            directory: Arc::new(StoreNamespaceDirectory::new(store.clone())),
            store,
        })
    }

    fn handle(&self) -> Arc<dyn NamespaceDirectory> {
        match self {
            Directory::Static(directory) => directory.clone(),
            Directory::Store { directory, .. } => directory.clone(),
        }
    }

    async fn close(self) -> anyhow::Result<()> {
        match self {
            Directory::Static(_) => Ok(()),
            Directory::Store { store, .. } => store.close().await,
        }
    }
}

fn data_dir(cli: Option<String>, file_cfg: &ManagerConfigFile) -> String {
    cli.or_else(|| file_cfg.data_dir.clone())
        .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    All,
    RoleBindingsOnly,
}

/// Combine a resolve result with the store close outcome. A resolve error
/// wins; a close failure alongside it is only logged.
fn settle<T>(result: anyhow::Result<T>, closed: anyhow::Result<()>) -> anyhow::Result<T> {
    match (result, closed) {
        (Ok(value), closed) => closed.map(|()| value),
        (Err(e), Err(close_err)) => {
            warn!("Failed to close state store: {:#}", close_err);
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
    }
}

async fn resolve(
    source: &SourceArgs,
    file_cfg: &ManagerConfigFile,
    mode: Mode,
) -> anyhow::Result<Resolution> {
    let definition = load_definition_file(&source.file)?;
    info!(
        "Resolving RBACDefinition {} ({} binding(s)) from {}",
        definition.name(),
        definition.rbac_bindings.len(),
        source.file
    );

    let directory = Directory::open(&definition, source, file_cfg).await?;
    let resolver = RbacDefinitionResolver::new(directory.handle());
    let result = match mode {
        Mode::All => resolver.resolve(&definition).await,
        Mode::RoleBindingsOnly => resolver.resolve_role_bindings(&definition).await,
    };
    let closed = directory.close().await;
    let resolution = settle(result.map_err(anyhow::Error::from), closed)?;
    for event in &resolution.events {
        event.log();
    }
    info!(
        "Resolved {} service account(s), {} role binding(s), {} cluster role binding(s)",
        resolution.service_accounts.len(),
        resolution.role_bindings.len(),
        resolution.cluster_role_bindings.len()
    );
    Ok(resolution)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load config file (returns defaults if file not found)
    let file_cfg: ManagerConfigFile = load_config_file(&cli.config)?;
    let log_format = if cli.log_json {
        LogFormat::Json
    } else {
        file_cfg.log_format.unwrap_or_default()
    };
    init_tracing(log_format);
    info!("Config file: {}", cli.config);

    match &cli.command {
        Commands::Resolve {
            source,
            output: format,
        }
        | Commands::RoleBindings {
            source,
            output: format,
        } => {
            let mode = match &cli.command {
                Commands::RoleBindings { .. } => Mode::RoleBindingsOnly,
                _ => Mode::All,
            };
            let format = (*format).or(file_cfg.output).unwrap_or_default();
            let resolution = resolve(source, &file_cfg, mode).await?;
            print!("{}", output::render(&resolution, format)?);
        }
        Commands::Check { source } => {
            let resolution = resolve(source, &file_cfg, Mode::All).await?;
            println!(
                "{}: OK ({} service accounts, {} role bindings, {} cluster role bindings)",
                source.file,
                resolution.service_accounts.len(),
                resolution.role_bindings.len(),
                resolution.cluster_role_bindings.len()
            );
        }
        Commands::Namespaces { action } => match action {
            NamespaceAction::Import { file, data_dir: dir } => {
                let namespaces = load_namespaces_file(file)?;
                let store = StateStore::new(&data_dir(dir.clone(), &file_cfg)).await?;
                let directory = StoreNamespaceDirectory::new(store.clone());
                for namespace in &namespaces {
                    directory.register(namespace).await?;
                    info!("Registered namespace {}", namespace.name);
                }
                store.close().await?;
                println!("Imported {} namespace(s)", namespaces.len());
            }
            NamespaceAction::List { selector, data_dir: dir } => {
                let selector: LabelSelector = selector.parse()?;
                let store = StateStore::new(&data_dir(dir.clone(), &file_cfg)).await?;
                let names = StoreNamespaceDirectory::new(store.clone())
                    .list(&selector)
                    .await;
                store.close().await?;
                for name in names? {
                    println!("{}", name);
                }
            }
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkg_controllers::error::{ResolveError, ValidationReason};

    fn validation_error() -> anyhow::Error {
        ResolveError::Validation {
            definition: "example".to_string(),
            binding: Some("admin".to_string()),
            reason: ValidationReason::MissingRoleRef,
        }
        .into()
    }

    #[test]
    fn test_settle_keeps_resolve_error_over_close_failure() {
        let err = settle::<()>(Err(validation_error()), Err(anyhow::anyhow!("close failed")))
            .unwrap_err();
        let resolve_err = err.downcast_ref::<ResolveError>().unwrap();
        assert!(resolve_err.is_validation());
        assert_eq!(resolve_err.binding(), Some("admin"));
    }

    #[test]
    fn test_settle_reports_close_failure_after_success() {
        let err = settle(Ok(1), Err(anyhow::anyhow!("close failed"))).unwrap_err();
        assert_eq!(err.to_string(), "close failed");
        assert_eq!(settle(Ok(1), Ok(())).unwrap(), 1);
    }

    #[test]
    fn test_settle_passes_resolve_error_through() {
        let err = settle::<()>(Err(validation_error()), Ok(())).unwrap_err();
        assert!(err.downcast_ref::<ResolveError>().is_some());
    }
}
