//! Mortar CLI - Command-line interface for Mortar
//!
//! Loads a module/header dependency export and answers coupling
//! questions: overview statistics, pairwise relations, merge plans,
//! and header relocation recommendations.

use clap::{Parser, Subcommand};
use colored::Colorize;
use mortar_analysis::{MergeConfig, RelocationThresholds};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod ingest;
mod report;

#[derive(Parser)]
#[command(name = "mortar")]
#[command(author = "Mortar Contributors")]
#[command(version)]
#[command(about = "Coupling analysis and merge planning for module dependency graphs", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show graph statistics and the most connected nodes
    Stats {
        /// Path to the dependency export CSV
        #[arg(short, long, default_value = "module_dependencies.csv")]
        csv: PathBuf,

        /// How many nodes to show per ranking
        #[arg(short, long, default_value = "10")]
        top: usize,

        /// Write a Markdown report to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the recorded relation between two nodes
    Query {
        /// First node name
        a: String,

        /// Second node name
        b: String,

        /// Query the header graph instead of the module graph
        #[arg(long)]
        headers: bool,

        /// Path to the dependency export CSV
        #[arg(short, long, default_value = "module_dependencies.csv")]
        csv: PathBuf,
    },

    /// Recommend module groups to merge
    Merge {
        /// Path to the dependency export CSV
        #[arg(short, long, default_value = "module_dependencies.csv")]
        csv: PathBuf,

        /// Smallest group size to evaluate
        #[arg(long, default_value = "2")]
        min_size: usize,

        /// Largest group size to evaluate
        #[arg(long, default_value = "5")]
        max_size: usize,

        /// Candidate pool bound (top modules by dependents)
        #[arg(long, default_value = "40")]
        candidates: usize,

        /// Total recommendations to return
        #[arg(short, long, default_value = "10")]
        top_n: usize,

        /// Cap on recommendations of any single group size
        #[arg(long, default_value = "3")]
        per_size_cap: usize,

        /// Write a Markdown report to this path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Recommend headers to relocate to better-connected modules
    Relocate {
        /// Path to the dependency export CSV
        #[arg(short, long, default_value = "module_dependencies.csv")]
        csv: PathBuf,

        /// Root path token headers live under
        #[arg(long, default_value = "boost")]
        root: String,

        /// Minimum total relations for a header to be considered
        #[arg(long, default_value = "5")]
        min_connections: usize,

        /// Minimum external relation ratio (0-1)
        #[arg(long, default_value = "0.6")]
        min_ratio: f64,

        /// Minimum target/internal improvement ratio
        #[arg(long, default_value = "1.5")]
        min_improvement: f64,

        /// How many recommendations to print
        #[arg(short, long, default_value = "20")]
        top: usize,

        /// Write a Markdown report to this path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// List headers with bidirectional (circular) dependencies
    Conflicts {
        /// Path to the dependency export CSV
        #[arg(short, long, default_value = "module_dependencies.csv")]
        csv: PathBuf,

        /// Root path token headers live under
        #[arg(long, default_value = "boost")]
        root: String,

        /// Write a Markdown report to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show per-module boundary summaries
    Boundaries {
        /// Path to the dependency export CSV
        #[arg(short, long, default_value = "module_dependencies.csv")]
        csv: PathBuf,

        /// Root path token headers live under
        #[arg(long, default_value = "boost")]
        root: String,

        /// How many modules to show
        #[arg(short, long, default_value = "20")]
        top: usize,
    },
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let result = match cli.command {
        Commands::Stats { csv, top, output } => commands::stats(&csv, top, output.as_deref()),
        Commands::Query {
            a,
            b,
            headers,
            csv,
        } => commands::query(&csv, &a, &b, headers),
        Commands::Merge {
            csv,
            min_size,
            max_size,
            candidates,
            top_n,
            per_size_cap,
            output,
            json,
        } => {
            let config = MergeConfig {
                min_size,
                max_size,
                candidate_limit: candidates,
                top_n,
                per_size_cap,
            };
            commands::merge(&csv, config, output.as_deref(), json)
        }
        Commands::Relocate {
            csv,
            root,
            min_connections,
            min_ratio,
            min_improvement,
            top,
            output,
            json,
        } => {
            let thresholds = RelocationThresholds {
                min_total_connections: min_connections,
                min_external_ratio: min_ratio,
                min_improvement_ratio: min_improvement,
            };
            commands::relocate(&csv, &root, thresholds, top, output.as_deref(), json)
        }
        Commands::Conflicts { csv, root, output } => {
            commands::conflicts(&csv, &root, output.as_deref())
        }
        Commands::Boundaries { csv, root, top } => commands::boundaries(&csv, &root, top),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
