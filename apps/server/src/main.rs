use anyhow::Context;
use clap::Parser;
use docfill::domain::config::ApiConfig;
use docfill::kernel::config::load_config;
use docfill_logger::Logger;
use docfill_server::Server;
use std::path::PathBuf;

/// Batch .docx generation server
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Configuration file (defaults to `server.{toml,json,yaml}` when present)
    #[arg(short, long, env = "DOCFILL_CONFIG")]
    config: Option<PathBuf>,
}

#[docfill_runtime::main(server)]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let cfg: ApiConfig =
        load_config(args.config.as_deref()).context("Critical: Configuration is malformed")?;

    let _log = Logger::from_config(env!("CARGO_PKG_NAME"), &cfg.logging)?;

    Server::builder().config(cfg).build()?.run().await
}
