//! genjson CLI tool
//!
//! Command-line front end for loading GEN-JSON documents.
//!
//! ## Commands
//!
//! - `check <file>`: Load a document and print every diagnostic
//! - `tree <file>`: Print a descendant (or ancestor) tree, or the whole forest
//! - `events <file> <ID>`: List the events of one individual
//!
//! Every command accepts `--config <toml>` for [`EngineConfig`] settings. Logging goes to stderr
//! and is controlled with `RUST_LOG`.

use clap::{Parser, Subcommand};
use genjson::{
    codec::Diagnostic,
    config::EngineConfig,
    nodekey::NodeKey,
    properties::Confidence,
    session::Session,
    traverse::{Lineage, TreeNode},
    GenJsonError,
};
use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

#[derive(Parser)]
#[command(name = "genjson")]
#[command(author, version, about = "Resolve and traverse GEN-JSON genealogical documents", long_about = None)]
struct Cli {
    /// Engine configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a document and display its diagnostics
    Check {
        /// Path to the GEN-JSON document
        file: PathBuf,

        /// Also print informational diagnostics
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print a tree view
    Tree {
        /// Path to the GEN-JSON document
        file: PathBuf,

        /// Individual to start from (default: every root candidate)
        #[arg(long)]
        root: Option<String>,

        /// Walk parents instead of children (requires --root)
        #[arg(long, requires = "root")]
        ancestors: bool,

        /// Override the configured depth ceiling
        #[arg(long)]
        depth: Option<usize>,

        /// Emit JSON instead of an indented outline
        #[arg(long)]
        json: bool,
    },

    /// List the events of an individual
    Events {
        /// Path to the GEN-JSON document
        file: PathBuf,

        /// Individual ID
        id: String,

        /// Only events of this type (case-insensitive)
        #[arg(long = "type")]
        event_type: Option<String>,

        /// Only events at or above this confidence tier
        #[arg(long, value_parser = parse_confidence)]
        min_confidence: Option<Confidence>,
    },
}

fn parse_confidence(s: &str) -> Result<Confidence, String> {
    s.parse::<Confidence>().map_err(|e| e.to_string())
}

fn load(file: &Path, config: EngineConfig) -> Result<Session, GenJsonError> {
    tracing::info!("Loading {}", file.display());
    Session::from_path(file, config)
}

fn print_outline(node: &TreeNode) {
    for (depth, node) in node.iter() {
        println!("{}{} [{}]", "  ".repeat(depth), node.label, node.id);
    }
}

fn run(cli: Cli) -> Result<ExitCode, GenJsonError> {
    let config = match &cli.config {
        Some(path) => EngineConfig::from_path(path)?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Commands::Check { file, verbose } => {
            let session = load(&file, config)?;
            let mut shown = 0;
            for diagnostic in session.diagnostics() {
                if !verbose && matches!(diagnostic, Diagnostic::Info(_)) {
                    continue;
                }
                println!("{diagnostic}");
                shown += 1;
            }
            println!("\n=== Check Results ===");
            println!("Records: {}", session.store().len());
            println!(
                "Graph: {} nodes, {} edges",
                session.graph().node_count(),
                session.graph().edge_count()
            );
            println!("Diagnostics: {shown}");
            Ok(ExitCode::SUCCESS)
        }

        Commands::Tree {
            file,
            root,
            ancestors,
            depth,
            json,
        } => {
            let config = match depth {
                Some(depth) => config.with_max_depth(depth),
                None => config,
            };
            let session = load(&file, config)?;
            let hierarchy = session.hierarchy();

            match root {
                Some(id) => {
                    let lineage = if ancestors {
                        Lineage::Ancestors
                    } else {
                        Lineage::Descendants
                    };
                    let Some(tree) = hierarchy.tree(&NodeKey::individual(id.as_str()), lineage)
                    else {
                        eprintln!("Error: no individual '{id}' in {}", file.display());
                        return Ok(ExitCode::FAILURE);
                    };
                    if json {
                        println!("{}", serde_json::to_string_pretty(&tree)?);
                    } else {
                        print_outline(&tree.root);
                    }
                }
                None => {
                    let forest = hierarchy.forest();
                    if json {
                        println!("{}", serde_json::to_string_pretty(&forest)?);
                    } else {
                        if forest.fallback {
                            println!("(no root candidates; listing every individual)");
                        }
                        forest.trees.iter().for_each(print_outline);
                    }
                }
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Events {
            file,
            id,
            event_type,
            min_confidence,
        } => {
            let session = load(&file, config)?;
            let min = min_confidence.unwrap_or_default();
            let events = session.query().events_for(&id, event_type.as_deref());
            for event in events.into_iter().filter(|e| e.confidence.at_least(min)) {
                let date = event
                    .date
                    .as_ref()
                    .map(|d| d.value.as_str())
                    .unwrap_or("?");
                println!(
                    "{}\t{}\t{}\t{}",
                    event.id, event.event_type, date, event.confidence
                );
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
