#![allow(clippy::print_stdout)]

mod handlers;
mod models;

use crate::handlers::{generate, inspect};
use crate::models::args::{AppCommands, Cli};
use anyhow::Result;
use clap::Parser;
use docfill_logger::{LevelFilter, Logger};

#[docfill_runtime::main(compact)]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };
    let _log = Logger::builder().name(env!("CARGO_PKG_NAME")).level(level).stderr(true).init()?;

    match cli.command {
        AppCommands::Generate(args) => generate::generate_documents(args).await?,
        AppCommands::Inspect { sheet } => inspect::inspect_sheet(&sheet)?,
    }

    Ok(())
}
