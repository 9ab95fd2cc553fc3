//! Core domain types for the grid market-making bot.
//!
//! This crate provides fundamental types used throughout the system:
//! - `Price`, `Size`: Precision-safe numeric types
//! - `OrderSide`, `OrderStatus`, `TimeInForce`: Trading enums
//! - `Ticker`, `OpenOrder`, `Position`: Exchange state snapshots

pub mod decimal;
pub mod error;
pub mod order;
pub mod types;

pub use decimal::{Price, Size};
pub use error::{CoreError, Result};
pub use order::{ClientOrderId, OrderAck, OrderRequest, OrderSide, OrderStatus, OrderType, TimeInForce};
pub use types::{BalanceSnapshot, OpenOrder, Position, PositionSide, Symbol, Ticker};
