//! propgraph CLI
//!
//! Operational tools for propgraph databases: bulk-load `.pgdf` files,
//! inspect entities, and print database statistics.
//!
//! # Commands
//!
//! - `load <db> <file>…`: stream one or more `.pgdf` files into a database
//! - `stats <db>`: totals, per-label edge counts, and schemas
//! - `get-node <db> <id>` / `get-edge <db> <id>`: point lookups
//! - `neighbours <db> <id>`: incident edges of a node
//!
//! All failures surface as typed errors and exit with code 1.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use propgraph_storage::{GraphStore, IngestOptions};

/// propgraph - embedded property-graph database tools
#[derive(Parser)]
#[command(name = "propgraph")]
#[command(version)]
#[command(about = "Load and query propgraph databases")]
struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load one or more .pgdf files into a database
    Load {
        /// Database directory (created if missing)
        db: PathBuf,
        /// .pgdf files, loaded in order
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Abort on the first bad record instead of skipping it
        #[arg(long)]
        strict: bool,
    },
    /// Print totals, per-label edge counts, and schemas
    Stats {
        /// Database directory
        db: PathBuf,
    },
    /// Look up a node by id
    GetNode {
        db: PathBuf,
        id: String,
        /// Print the node as JSON
        #[arg(long)]
        json: bool,
    },
    /// Look up an edge by id
    GetEdge {
        db: PathBuf,
        id: String,
        /// Print the edge as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the edges incident to a node
    Neighbours { db: PathBuf, id: String },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Load { db, files, strict } => cmd_load(&db, &files, strict),
        Commands::Stats { db } => cmd_stats(&db),
        Commands::GetNode { db, id, json } => cmd_get_node(&db, &id, json),
        Commands::GetEdge { db, id, json } => cmd_get_edge(&db, &id, json),
        Commands::Neighbours { db, id } => cmd_neighbours(&db, &id),
    }
}

fn open(db: &PathBuf) -> anyhow::Result<GraphStore> {
    GraphStore::open(db).with_context(|| format!("opening database at {}", db.display()))
}

fn cmd_load(db: &PathBuf, files: &[PathBuf], strict: bool) -> anyhow::Result<()> {
    let store = open(db)?;
    let options = IngestOptions { strict };

    for file in files {
        let report = store
            .load_pgdf(file, options)
            .with_context(|| format!("loading {}", file.display()))?;
        println!(
            "{}: {} nodes, {} edges, {} skipped",
            file.display(),
            report.nodes,
            report.edges,
            report.skipped
        );
    }
    Ok(())
}

fn cmd_stats(db: &PathBuf) -> anyhow::Result<()> {
    let store = open(db)?;

    println!("nodes: {}", store.count_nodes()?);
    println!("edges: {}", store.count_edges()?);

    let by_label = store.edge_count_by_label()?;
    if !by_label.is_empty() {
        println!("edges by label:");
        for (label, count) in &by_label {
            println!("  {label}: {count}");
        }
    }

    for (title, schema) in [
        ("node schema:", store.node_schema()?),
        ("edge schema:", store.edge_schema()?),
    ] {
        if schema.is_empty() {
            continue;
        }
        println!("{title}");
        for (label, keys) in &schema {
            let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
            println!("  {label}: {{{}}}", keys.join(", "));
        }
    }
    Ok(())
}

fn cmd_get_node(db: &PathBuf, id: &str, json: bool) -> anyhow::Result<()> {
    let store = open(db)?;
    match store.get_node(id)? {
        Some(node) if json => println!("{}", serde_json::to_string_pretty(&node)?),
        Some(node) => {
            println!("{} [{}]", node.id, node.label);
            for (key, value) in &node.props {
                println!("  {key} = {value}");
            }
        }
        None => anyhow::bail!("node '{id}' not found"),
    }
    Ok(())
}

fn cmd_get_edge(db: &PathBuf, id: &str, json: bool) -> anyhow::Result<()> {
    let store = open(db)?;
    match store.get_edge(id)? {
        Some(edge) if json => println!("{}", serde_json::to_string_pretty(&edge)?),
        Some(edge) => {
            let arrow = if edge.directed { "->" } else { "--" };
            println!(
                "{} [{}] {} {arrow} {}",
                edge.id, edge.label, edge.src, edge.dst
            );
            for (key, value) in &edge.props {
                println!("  {key} = {value}");
            }
        }
        None => anyhow::bail!("edge '{id}' not found"),
    }
    Ok(())
}

fn cmd_neighbours(db: &PathBuf, id: &str) -> anyhow::Result<()> {
    let store = open(db)?;
    for entry in store.iter_neighbours(id)? {
        let entry = entry?;
        let edge = &entry.edge;
        let arrow = if edge.directed { "->" } else { "--" };
        println!("{} [{}] {} {arrow} {}", edge.id, edge.label, edge.src, edge.dst);
    }
    Ok(())
}
