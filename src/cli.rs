use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "deprec-scan")]
#[command(about = "Detect deprecated core API usage inside plugin archives")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Only match owners whose name contains one of these substrings
    /// (replaces the built-in jenkins/hudson/org/kohsuke list)
    #[arg(long, value_name = "NS", global = true)]
    pub include_namespace: Vec<String>,

    /// Match every owner regardless of namespace
    #[arg(long, global = true)]
    pub no_namespace_filter: bool,

    /// Additional artifact file names to skip entirely
    #[arg(long, value_name = "FILE", global = true)]
    pub ignore: Vec<String>,

    /// Ancestor-walk depth bound before an artifact is treated as cyclic
    #[arg(long, value_name = "N", global = true)]
    pub max_depth: Option<usize>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Build the deprecated-API catalog from a core archive and analyze
    /// every plugin archive under a directory
    Scan {
        #[arg(long, value_name = "FILE")]
        core: PathBuf,

        #[arg(long, value_name = "DIR")]
        plugins: PathBuf,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Print the deprecated signature keys found in a core archive
    Catalog {
        #[arg(long, value_name = "FILE")]
        core: PathBuf,
    },
    /// Analyze a single plugin archive and print its usage record
    Check {
        #[arg(long, value_name = "FILE")]
        core: PathBuf,

        plugin: PathBuf,
    },
}

#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}
