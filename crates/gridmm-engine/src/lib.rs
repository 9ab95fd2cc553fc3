//! Grid market-making engine.
//!
//! Builds a symmetric ladder of resting limit orders around a
//! reference price and reconciles the venue's live orders against it
//! every cycle. Spread widening, stale-order sweeping, and position
//! risk reduction hang off the same cycle.

pub mod book;
pub mod config;
pub mod cycle;
pub mod error;
pub mod grid;
pub mod reconcile;
pub mod risk;
pub mod spread;
pub mod sweeper;

pub use book::LadderBook;
pub use config::{CancelMode, EngineConfig, GridConfig, RiskConfig, SweepConfig};
pub use cycle::{CycleReport, Engine};
pub use error::{EngineError, EngineResult};
pub use grid::{generate_ladders, LadderPair};
pub use reconcile::{diff_ladders, drift_cancels, LadderDiff};
pub use risk::{PositionMonitor, ReduceOrderBuilder, ReduceReason};
pub use spread::effective_spread;
pub use sweeper::StaleSweeper;
