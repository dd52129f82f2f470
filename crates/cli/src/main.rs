//! `stagewise <case-file>`: runs one absorber or distillation case and
//! prints the report as JSON on stdout. Logs go to stderr and are filtered
//! with `RUST_LOG` (default `info`).

mod case;
mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "stagewise", version, about = "McCabe-Thiele stage calculations")]
struct Args {
    /// Case file (.toml, .json, .yaml or .yml)
    case: PathBuf,

    /// Print the report on a single line
    #[arg(long, default_value_t = false)]
    compact: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let case = config::load(&args.case)
        .with_context(|| format!("failed to load case {}", args.case.display()))?;
    let report = case.run().context("case calculation failed")?;

    let json = if args.compact {
        serde_json::to_string(&report)?
    } else {
        serde_json::to_string_pretty(&report)?
    };
    println!("{json}");
    Ok(())
}
