mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use pdfchop::{commands, mcp};

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries command output and MCP JSON-RPC, so logs go to stderr
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Mcp => {
            mcp::run_server().await?;
        }
        Commands::Info { path } => {
            commands::info::run(&path)?;
        }
        Commands::Merge {
            inputs,
            output,
            recursive,
        } => {
            commands::merge::run(&inputs, &output, recursive)?;
        }
        Commands::Split {
            path,
            extracts,
            burst,
        } => {
            commands::split::run(&path, &extracts, burst.as_deref())?;
        }
        Commands::Interleave {
            inputs,
            output,
            recursive,
        } => {
            commands::interleave::run(&inputs, &output, recursive)?;
        }
        Commands::Booklet { path, output } => {
            commands::booklet::run(&path, output)?;
        }
        Commands::Run { job } => {
            commands::job::run(&job)?;
        }
    }

    Ok(())
}
