//! Command-line interface definitions for enrich

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI structure for the enrich application
#[derive(Parser)]
#[command(name = "enrich")]
#[command(version)]
#[command(about = "Enhancement pipeline for CMS article HTML", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for enrich
#[derive(Subcommand)]
pub enum Commands {
    /// Enhance a single article HTML file
    Enhance {
        /// Input HTML file ("-" reads stdin)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output file path
        #[arg(short, long, default_value = "enhanced.html")]
        output: PathBuf,

        /// Configuration file (defaults to ./enrich.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Also write the heading index as JSON
        #[arg(long, value_name = "PATH")]
        toc: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print or write the heading index of an article as JSON
    Toc {
        /// Input HTML file ("-" reads stdin)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output file (prints to stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file (defaults to ./enrich.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Enhance every .html file under a directory tree
    Batch {
        /// Input directory
        #[arg(value_name = "INPUT_DIR")]
        input: PathBuf,

        /// Output directory (relative paths are preserved)
        #[arg(short, long, default_value = "enhanced")]
        output: PathBuf,

        /// Configuration file (defaults to ./enrich.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}
