//! polyflow CLI — numeric workflow steps over a working directory.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "polyflow")]
#[command(version, about = "polyflow — file-based numeric workflow steps")]
struct Cli {
    /// Working directory holding the contract files.
    #[arg(short = 'C', long, global = true, default_value = ".")]
    workdir: PathBuf,

    /// Optional TOML config (tolerances, learning rate, file names).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Append every step event as JSON to this file.
    #[arg(long, global = true)]
    events: Option<PathBuf>,

    /// Log step events to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decompose a matrix from stdin into U, S, and VT files.
    Svd {
        /// Write thin factors (conformant for rectangular input).
        #[arg(long)]
        thin: bool,
    },

    /// Multiply the U, S, and VT files and print the product.
    Mult,

    /// Fail unless matrix_in and matrix_out agree within tolerance.
    Cmp,

    /// Take one gradient step from approx_old and grad.
    Subtract,

    /// Print a random n×n matrix with values in [0, 1).
    Gen {
        /// Matrix dimension.
        n: usize,

        /// Seed for reproducible output.
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Validate a config (.toml) or a matrix file.
    Validate {
        /// Path to the file.
        path: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_max_level(tracing::Level::DEBUG)
            .init();
    }

    let opts = commands::GlobalOptions {
        workdir: cli.workdir,
        config: cli.config,
        events: cli.events,
        verbose: cli.verbose,
    };

    let result = match cli.command {
        Commands::Svd { thin } => commands::svd(&opts, thin),
        Commands::Mult => commands::mult(&opts),
        Commands::Cmp => commands::cmp(&opts),
        Commands::Subtract => commands::subtract(&opts),
        Commands::Gen { n, seed } => commands::gen_matrix(&opts, n, seed),
        Commands::Validate { path } => commands::validate(&path),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
