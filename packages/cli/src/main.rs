#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for one-shot route risk analysis.

use clap::Parser;
use safe_routes_analyzer::AnalysisContext;

#[derive(Parser)]
#[command(name = "safe_routes_cli", about = "Route crime-risk analysis tool")]
struct Cli {
    /// Starting address
    origin: String,
    /// Destination address
    destination: String,
    /// Skip real-time traffic lookup
    #[arg(long)]
    no_traffic: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let cli = Cli::parse();

    let ctx = AnalysisContext::from_env()?;
    let records = ctx
        .analyze(&cli.origin, &cli.destination, !cli.no_traffic)
        .await?;

    if records.is_empty() {
        log::warn!("no routes returned");
    }

    println!("{}", serde_json::to_string_pretty(&records)?);

    Ok(())
}
