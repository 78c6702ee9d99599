//! `kgviz` command-line interface

use crate::config::EnvironmentConfig;
use crate::loader::GraphLoader;
use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use kgviz_sankey::SankeyGraph;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::Duration;

/// Build the argument parser
#[must_use]
pub fn build_command() -> Command {
    let file_arg = || {
        Arg::new("file")
            .required(true)
            .value_parser(value_parser!(PathBuf))
            .help("Sankey JSON document")
    };

    Command::new("kgviz")
        .version(crate::VERSION)
        .about("Inspect Sankey documents for knowledge-graph visualization")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Environment configuration file (TOML)"),
        )
        .arg(
            Arg::new("timeout-ms")
                .long("timeout-ms")
                .global(true)
                .default_value("30000")
                .value_parser(value_parser!(u64))
                .help("Deadline for loading a document, in milliseconds"),
        )
        .subcommand(
            Command::new("inspect")
                .about("Load a document and summarise the resolved graph")
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("bounds")
                .about("Print the bounding rectangle of nodes and links")
                .arg(file_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("hit")
                .about("Print the topmost node under a point")
                .allow_negative_numbers(true)
                .arg(file_arg())
                .arg(Arg::new("x").required(true).value_parser(value_parser!(f64)))
                .arg(Arg::new("y").required(true).value_parser(value_parser!(f64))),
        )
        .subcommand(
            Command::new("config")
                .about("Print the effective environment configuration")
                .arg(
                    Arg::new("file")
                        .long("file")
                        .value_parser(value_parser!(PathBuf))
                        .help("Configuration file, overriding --config"),
                ),
        )
}

/// Run the parsed command and return what should be printed
///
/// # Errors
/// - Configuration, load or rendering failures, with context
pub async fn run(matches: &ArgMatches) -> anyhow::Result<String> {
    let config_path = matches.get_one::<PathBuf>("config").cloned();
    let timeout_ms = matches.get_one::<u64>("timeout-ms").copied().unwrap_or(30_000);
    let loader = GraphLoader::new().with_timeout(Duration::from_millis(timeout_ms));

    match matches.subcommand() {
        Some(("inspect", args)) => {
            let graph = load(&loader, args).await?;
            Ok(inspect(&graph))
        }
        Some(("bounds", args)) => {
            let graph = load(&loader, args).await?;
            bounds(&graph, args.get_flag("json"))
        }
        Some(("hit", args)) => {
            let graph = load(&loader, args).await?;
            let x = args.get_one::<f64>("x").copied().unwrap_or_default();
            let y = args.get_one::<f64>("y").copied().unwrap_or_default();
            Ok(hit(&graph, x, y))
        }
        Some(("config", args)) => {
            let path = args.get_one::<PathBuf>("file").cloned().or(config_path);
            let config = EnvironmentConfig::load(path.as_deref())
                .context("failed to load environment configuration")?;
            Ok(config.to_toml_string()?)
        }
        _ => anyhow::bail!("no subcommand given"),
    }
}

async fn load(loader: &GraphLoader, args: &ArgMatches) -> anyhow::Result<SankeyGraph> {
    let path = args
        .get_one::<PathBuf>("file")
        .context("missing document path")?;
    let location = path.to_string_lossy();
    tracing::info!(%location, timeout = ?loader.timeout(), "loading document");
    loader
        .load_settled(&location)
        .await
        .with_context(|| format!("failed to load {location}"))
}

/// Summary of a resolved graph
#[must_use]
pub fn inspect(graph: &SankeyGraph) -> String {
    let max_depth = graph.nodes().iter().map(|n| n.depth).max().unwrap_or(0);
    let mut out = String::new();
    let _ = writeln!(out, "nodes: {}", graph.node_count());
    let _ = writeln!(out, "links: {}", graph.link_count());
    let _ = writeln!(out, "max depth: {max_depth}");
    let _ = write!(out, "bounds: {}", render_bounds(graph));
    out
}

/// Bounding rectangle, as text or JSON (`null` when empty)
///
/// # Errors
/// - JSON encoding failure, for a rect with an infinite edge
pub fn bounds(graph: &SankeyGraph, json: bool) -> anyhow::Result<String> {
    if json {
        return Ok(serde_json::to_string(&graph.bounding_rect())?);
    }
    Ok(render_bounds(graph))
}

fn render_bounds(graph: &SankeyGraph) -> String {
    let rect = graph.bounding_rect();
    if rect.is_empty() {
        "empty".to_string()
    } else {
        format!("x {}..{}, y {}..{}", rect.x0, rect.x1, rect.y0, rect.y1)
    }
}

/// Topmost node under the point
#[must_use]
pub fn hit(graph: &SankeyGraph, x: f64, y: f64) -> String {
    match graph.node_at(x, y) {
        Some(node) => format!("{} ({})", node.name(), node.id),
        None => "no node".to_string(),
    }
}
