//! Grid market maker - entry point.

use anyhow::Result;
use clap::Parser;
use rust_decimal::Decimal;
use tracing::info;

/// Maker-only grid trading bot for a single symbol.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via GRIDMM_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Symbol to quote, overriding the config file
    #[arg(long)]
    symbol: Option<String>,

    /// Account label carried into logs
    #[arg(long)]
    account_id: Option<String>,

    /// Half-spread between the reference price and the nearest rung
    #[arg(long)]
    price_spread: Option<Decimal>,

    /// Price distance between adjacent rungs
    #[arg(long)]
    price_step: Option<Decimal>,

    /// Number of rungs per side
    #[arg(long)]
    grid_count: Option<u32>,

    /// Quantity per rung
    #[arg(long)]
    order_quantity: Option<Decimal>,

    /// Seconds to sleep between cycles
    #[arg(long)]
    sleep_interval: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    gridmm_telemetry::init_logging()?;

    info!("Starting grid bot v{}", env!("CARGO_PKG_VERSION"));

    let mut config = gridmm_bot::AppConfig::load(args.config.as_deref())?;
    if let Some(symbol) = args.symbol {
        config.symbol = symbol;
    }
    if let Some(account_id) = args.account_id {
        config.account_id = Some(account_id);
    }
    if let Some(spread) = args.price_spread {
        config.grid.price_spread = spread;
    }
    if let Some(step) = args.price_step {
        config.grid.price_step = step;
    }
    if let Some(count) = args.grid_count {
        config.grid.grid_count = count;
    }
    if let Some(quantity) = args.order_quantity {
        config.grid.order_quantity = quantity;
    }
    if let Some(secs) = args.sleep_interval {
        config.grid.sleep_interval_secs = secs;
    }

    info!(symbol = %config.symbol, "Configuration loaded");

    let app = gridmm_bot::Application::new(config)?;

    info!("Running preflight check...");
    app.run_preflight().await?;

    app.run().await?;

    Ok(())
}
