use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdfchop")]
#[command(about = "Build new PDFs from page ranges of existing ones, with MCP server support")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as MCP server
    Mcp,

    /// Display page count and metadata
    Info {
        /// PDF file to inspect
        path: PathBuf,
    },

    /// Concatenate page ranges of several PDFs, in the order given
    #[command(alias = "cat")]
    Merge {
        /// Sources as PATH[:RANGE] (e.g. "a.pdf:2-5", "b.pdf"), or directories of PDFs
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Also take PDFs from subdirectories of directory inputs
        #[arg(short, long)]
        recursive: bool,
    },

    /// Write page ranges of one PDF to separate files
    Split {
        /// PDF file to split
        path: PathBuf,

        /// Extract as DEST[:RANGE] (e.g. "intro.pdf:1-3"); repeatable
        #[arg(short = 'x', long = "extract")]
        extracts: Vec<String>,

        /// Also write every page to its own file in this directory
        #[arg(short, long)]
        burst: Option<PathBuf>,
    },

    /// Take one page from each PDF in turn until all pages are used
    Interleave {
        /// Sources as PATH[:RANGE], or directories of PDFs
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Also take PDFs from subdirectories of directory inputs
        #[arg(short, long)]
        recursive: bool,
    },

    /// Reorder pages as 1, n, 2, n-1, ... for manual duplex booklet printing
    #[command(alias = "reorder")]
    Booklet {
        /// PDF file to reorder
        path: PathBuf,

        /// Output file (default: <name>_2.pdf next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run an assembly job described in a JSON file
    Run {
        /// Job file
        job: PathBuf,
    },
}
