//! Exchange connectivity for the grid market-making bot.
//!
//! Defines the [`ExchangeAdapter`] trait the engine is written against
//! and a REST implementation of it.

pub mod error;
pub mod exchange;
pub mod rest;

pub use error::{AdapterError, AdapterResult};
pub use exchange::ExchangeAdapter;
pub use rest::{RestAdapter, RestConfig};
