//! contour: command-line front end for curvature-driven mesh segmentation.
//!
//! Meshes come from a JSON file (`{"vertices": [[x, y, z], ...], "faces":
//! [[a, b, c], ...]}`) or from one of the built-in test shapes.
//!
//! # Logging
//!
//! Set the `RUST_LOG` environment variable to control log output:
//! - `RUST_LOG=mesh_contour=info` - Stage summaries
//! - `RUST_LOG=mesh_contour=debug` - Per-stage details
//! - `RUST_LOG=mesh_contour::timing=debug` - Performance timing
//! - `RUST_LOG=mesh_contour=trace` - Per-iteration band sizes
//!
//! # Example
//!
//! ```bash
//! # Segment a sphere from four seeds and save the result
//! contour segment --icosphere 3 --seeds 72,3,62,4 -o result.json
//!
//! # Curvature statistics with debug logging
//! RUST_LOG=debug contour curvature scan.json
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod output;

use commands::{curvature, path, segment};

/// contour - Segment triangle meshes with an evolving level-set contour.
#[derive(Parser)]
#[command(name = "contour")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format for results
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Suppress all non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Increase output verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for scripting
    Json,
}

/// Where the mesh comes from.
#[derive(Args, Clone)]
pub struct MeshSource {
    /// Input mesh file (JSON)
    #[arg(required_unless_present_any = ["icosphere", "grid"])]
    input: Option<PathBuf>,

    /// Use a subdivided icosahedron instead of a file
    #[arg(long, conflicts_with_all = ["input", "grid"])]
    icosphere: Option<u32>,

    /// Radius of the generated icosphere
    #[arg(long, default_value = "1.0")]
    radius: f64,

    /// Use a flat N x N vertex grid instead of a file
    #[arg(long, conflicts_with = "input")]
    grid: Option<usize>,
}

/// How seeds are given.
#[derive(Args, Clone)]
pub struct SeedArgs {
    /// Seed vertex indices, comma-separated
    #[arg(long, value_delimiter = ',', required_unless_present = "seed_point")]
    seeds: Vec<u32>,

    /// Seed position "x,y,z", snapped to the nearest vertex (repeatable)
    #[arg(long = "seed-point", conflicts_with = "seeds")]
    seed_point: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum InitializerArg {
    /// Walk greedily from seed to seed
    Greedy,
    /// Route through nearest-seed basin boundaries
    Basins,
}

#[derive(Subcommand)]
enum Commands {
    /// Evolve a contour from seeds and report the segmentation
    Segment {
        #[command(flatten)]
        mesh: MeshSource,

        #[command(flatten)]
        seeds: SeedArgs,

        /// Parameter file (TOML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of evolution steps
        #[arg(long)]
        iterations: Option<usize>,

        /// Move the contour inward instead of outward
        #[arg(long)]
        shrink: bool,

        /// How seeds become the initial contour
        #[arg(long)]
        initializer: Option<InitializerArg>,

        /// Ring depth of the curvature fits
        #[arg(long)]
        adjacency_depth: Option<usize>,

        /// Write the full result (fields included) as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Estimate mean curvature and report its distribution
    Curvature {
        #[command(flatten)]
        mesh: MeshSource,

        /// Neighbor-averaging passes over the curvature field
        #[arg(long, default_value = "0")]
        smoothing: usize,

        /// Ring depth of the curvature fits
        #[arg(long, default_value = "1")]
        adjacency_depth: usize,

        /// Write per-vertex curvature as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build the initial closed contour through seeds
    Path {
        #[command(flatten)]
        mesh: MeshSource,

        #[command(flatten)]
        seeds: SeedArgs,

        /// How seeds become the contour
        #[arg(long, default_value = "greedy")]
        initializer: InitializerArg,
    },
}

/// Initialize the tracing subscriber based on verbosity level.
fn init_tracing(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    // RUST_LOG wins over -v flags
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "warn",
            1 => "mesh_contour=info",
            2 => "mesh_contour=debug",
            _ => "trace",
        };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    #[cfg(debug_assertions)]
    miette::set_panic_hook();

    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Segment {
            mesh,
            seeds,
            config,
            iterations,
            shrink,
            initializer,
            adjacency_depth,
            output,
        } => segment::run(
            mesh,
            seeds,
            segment::Overrides {
                config: config.as_deref(),
                iterations: *iterations,
                shrink: *shrink,
                initializer: *initializer,
                adjacency_depth: *adjacency_depth,
            },
            output.as_deref(),
            &cli,
        ),
        Commands::Curvature {
            mesh,
            smoothing,
            adjacency_depth,
            output,
        } => curvature::run(mesh, *smoothing, *adjacency_depth, output.as_deref(), &cli),
        Commands::Path {
            mesh,
            seeds,
            initializer,
        } => path::run(mesh, seeds, *initializer, &cli),
    };

    if let Err(e) = &result {
        if !cli.quiet {
            if let Some(contour_err) = e.downcast_ref::<mesh_contour::ContourError>() {
                eprintln!("{}: {}", "Error".red().bold(), contour_err);
                eprintln!("  {}: {}", "Code".cyan(), contour_err.code());
                eprintln!(
                    "  {}: {}",
                    "Suggestion".green(),
                    contour_err.recovery_suggestion()
                );
                if let Some(location) = contour_err.location() {
                    eprintln!("  {}: {}", "Location".yellow(), location);
                }
            } else {
                eprintln!("{}: {}", "Error".red().bold(), e);
                for cause in e.chain().skip(1) {
                    eprintln!("  {}: {}", "Caused by".yellow(), cause);
                }
            }
        }
        std::process::exit(1);
    }

    Ok(())
}
