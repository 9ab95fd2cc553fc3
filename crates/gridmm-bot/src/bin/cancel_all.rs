//! Cancel every resting order for a symbol.
//!
//! A recovery tool for when the bot dies with a ladder still on the
//! book. Uses the same configuration sources as the bot itself.

use anyhow::{Context, Result};
use clap::Parser;
use gridmm_adapter::{ExchangeAdapter, RestAdapter};
use gridmm_bot::AppConfig;
use gridmm_core::Symbol;

/// Cancel all open orders for the configured symbol.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via GRIDMM_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Symbol override
    #[arg(long)]
    symbol: Option<String>,
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

    let orders = adapter
        .get_open_orders(&symbol)
        .await
        .context("open-orders fetch failed")?;
    if orders.is_empty() {
        tracing::info!(symbol = %symbol, "No open orders");
        return Ok(());
    }

    let mut ids = Vec::with_capacity(orders.len());
    for order in &orders {
        match order.order_id.parse::<u64>() {
            Ok(id) => ids.push(id),
            Err(_) => {
                tracing::warn!(order_id = %order.order_id, "Skipping unaddressable order id")
            }
        }
    }

    tracing::info!(symbol = %symbol, count = ids.len(), "Cancelling open orders");
    match adapter.cancel_orders_by_ids(&ids).await {
        Ok(()) => tracing::info!(count = ids.len(), "Bulk cancel accepted"),
        Err(e) if e.is_not_supported() => {
            for id in ids {
                match adapter.cancel_order(id).await {
                    Ok(()) => tracing::info!(order_id = id, "Cancelled"),
                    Err(e) => tracing::warn!(order_id = id, error = %e, "Cancel failed"),
                }
            }
        }
        Err(e) => return Err(e).context("bulk cancel failed"),
    }

    Ok(())
}
