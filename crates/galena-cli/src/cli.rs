//! Command-line argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the `galena` binary.
#[derive(Debug, Parser)]
#[command(name = "galena")]
#[command(about = "Question answering over mining regulation PDFs", long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Index a PDF into the local document store
    Ingest {
        /// Path to the PDF file
        file: PathBuf,
    },

    /// Ask a question, streaming the answer to stdout
    Ask {
        /// The question to answer
        question: String,

        /// Buffer the full answer instead of streaming
        #[arg(long)]
        buffered: bool,
    },

    /// Extract a PDF's text without indexing it
    Extract {
        /// Path to the PDF file
        file: PathBuf,
    },

    /// Show index status
    Status,

    /// Show the effective configuration
    Config,
}
