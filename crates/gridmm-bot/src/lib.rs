//! Maker-only grid trading bot.
//!
//! Wires the REST adapter, grid engine, and telemetry together:
//! - Configuration from TOML, environment, and CLI overrides
//! - Preflight check before the first order goes out
//! - Engine loop with Ctrl-C shutdown

pub mod app;
pub mod config;
pub mod error;

pub use app::Application;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
