use clap::{Parser, Subcommand, ValueEnum};
use pkg_constants::paths::DEFAULT_CONFIG;
use pkg_state::{GenerationOutcome, GraphStore};
use pkg_types::config::{NetgraphConfigFile, load_config_file};
use pkg_types::graph::load_snapshot_file;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "netgraphctl",
    about = "Validate network topology graphs and generate Kubernetes NetworkPolicies"
)]
struct Cli {
    /// Path to YAML config file
    #[arg(long, short, global = true, default_value = DEFAULT_CONFIG)]
    config: String,

    /// Log output format (overrides the config file)
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate every node and edge of a graph
    Validate {
        /// Graph snapshot (YAML or JSON)
        #[arg(long)]
        graph: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },
    /// Check whether a rule edge between two nodes would be accepted
    ConnectCheck {
        #[arg(long)]
        graph: Option<String>,
        #[arg(long)]
        source: String,
        #[arg(long)]
        target: String,
    },
    /// Generate the NetworkPolicy for one PodGroup
    Generate {
        #[arg(long)]
        graph: Option<String>,
        /// PodGroup node id
        #[arg(long)]
        target: String,
        /// Write the manifest to this file
        #[arg(long, conflicts_with = "out_dir")]
        out: Option<String>,
        /// Write the manifest into this directory under a derived file name
        #[arg(long)]
        out_dir: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load config file (returns defaults if file not found)
    let file_cfg: NetgraphConfigFile = load_config_file(&cli.config)?;

    // Merge: CLI args > config file > defaults
    let log_format = cli
        .log_format
        .or_else(|| match file_cfg.log_format.as_deref() {
            Some("json") => Some(LogFormat::Json),
            Some("text") => Some(LogFormat::Text),
            _ => None,
        })
        .unwrap_or(LogFormat::Text);
    init_tracing(log_format);
    debug!("Config file: {}", cli.config);

    let code = match cli.command {
        Commands::Validate { graph, output } => {
            let store = open_store(graph, &file_cfg)?;
            cmd_validate(&store, output).await?
        }
        Commands::ConnectCheck {
            graph,
            source,
            target,
        } => {
            let store = open_store(graph, &file_cfg)?;
            cmd_connect_check(&store, &source, &target).await
        }
        Commands::Generate {
            graph,
            target,
            out,
            out_dir,
        } => {
            let store = open_store(graph, &file_cfg)?;
            let out_dir = out_dir.or(file_cfg.out_dir.clone());
            cmd_generate(&store, &target, out, out_dir).await?
        }
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

/// Logs go to stderr so manifests on stdout stay clean.
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

fn open_store(graph: Option<String>, file_cfg: &NetgraphConfigFile) -> anyhow::Result<GraphStore> {
    let path = graph
        .or_else(|| file_cfg.graph.clone())
        .ok_or_else(|| anyhow::anyhow!("No graph given: pass --graph or set `graph` in the config file"))?;
    let snapshot = load_snapshot_file(&path)?;
    info!(
        "Loaded {} ({} nodes, {} edges)",
        path,
        snapshot.nodes.len(),
        snapshot.edges.len()
    );
    Ok(GraphStore::from_snapshot(snapshot))
}

async fn cmd_validate(store: &GraphStore, output: OutputFormat) -> anyhow::Result<i32> {
    let issues = store.issues().await;
    let errors = issues.iter().filter(|i| i.is_error()).count();

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(issues.as_slice())?),
        OutputFormat::Text => {
            for issue in issues.iter() {
                println!("{}", issue);
            }
            println!(
                "{} error(s), {} warning(s)",
                errors,
                issues.len() - errors
            );
        }
    }

    Ok(if errors > 0 { 1 } else { 0 })
}

async fn cmd_connect_check(store: &GraphStore, source: &str, target: &str) -> i32 {
    match store.check_connection(source, target).await {
        Ok(kind) => {
            let snapshot = store.snapshot().await;
            match (snapshot.node(source), snapshot.node(target)) {
                (Some(s), Some(t)) => println!("allowed: {}", kind.describe(s, t)),
                _ => println!("allowed: {:?}", kind),
            }
            0
        }
        Err(refusal) => {
            eprintln!("refused: {}", refusal);
            1
        }
    }
}

async fn cmd_generate(
    store: &GraphStore,
    target: &str,
    out: Option<String>,
    out_dir: Option<String>,
) -> anyhow::Result<i32> {
    let outcome = store.generate(Some(target)).await;
    let GenerationOutcome::Rendered(generated) = &outcome else {
        eprint!("{}", outcome.text());
        return Ok(1);
    };

    let text = generated.text();
    match output_path(out.as_deref(), out_dir.as_deref(), &generated.file_name) {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, text)?;
            info!(
                "Wrote {} for {} to {}",
                generated.policy.metadata.name,
                generated.target_name,
                path.display()
            );
        }
        None => print!("{}", text),
    }
    Ok(0)
}

/// `--out` wins; otherwise the derived file name inside `out_dir`; otherwise stdout.
fn output_path(out: Option<&str>, out_dir: Option<&str>, file_name: &str) -> Option<PathBuf> {
    match (out, out_dir) {
        (Some(out), _) => Some(PathBuf::from(out)),
        (None, Some(dir)) => Some(Path::new(dir).join(file_name)),
        (None, None) => None,
    }
}
