//! One-shot venue snapshot.
//!
//! Fetches the ticker, resting orders, position, and balances for the
//! configured symbol and prints them as JSON. A section that fails to
//! fetch carries its error string so a flaky endpoint never hides the
//! rest.

use anyhow::Result;
use clap::Parser;
use gridmm_adapter::{AdapterResult, ExchangeAdapter, RestAdapter};
use gridmm_bot::AppConfig;
use gridmm_core::Symbol;
use serde_json::json;

/// Print current venue state for the configured symbol.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via GRIDMM_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Symbol override
    #[arg(long)]
    symbol: Option<String>,

    /// Write the snapshot to this file instead of stdout
    #[arg(short, long)]
    output: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args = Args::parse();
    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(symbol) = args.symbol {
        config.symbol = symbol;
    }

    let symbol = Symbol::new(config.symbol.as_str());
    let adapter = RestAdapter::new(&config.exchange)?;

    let snapshot = json!({
        "symbol": symbol.as_str(),
        "ticker": capture("ticker", adapter.get_ticker(&symbol).await),
        "open_orders": capture("open_orders", adapter.get_open_orders(&symbol).await),
        "position": capture("position", adapter.get_position(&symbol).await),
        "balances": capture("balances", adapter.get_balances().await),
    });
    let rendered = serde_json::to_string_pretty(&snapshot)?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, rendered)?;
            tracing::info!(path = %path, "Snapshot written");
        }
        None => println!("{rendered}"),
    }

    Ok(())
}

fn capture<T: serde::Serialize>(section: &str, result: AdapterResult<T>) -> serde_json::Value {
    match result {
        Ok(value) => serde_json::to_value(value).unwrap_or(serde_json::Value::Null),
        Err(e) => {
            tracing::warn!(section, error = %e, "Snapshot section failed");
            json!({ "error": e.to_string() })
        }
    }
}
