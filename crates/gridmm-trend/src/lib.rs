//! Directional trend strength for the grid bot.
//!
//! A lightweight substitute for chart-derived trend indicators: the bot
//! only needs a 0..100 strength scalar and a trend/range classification,
//! both derived from the direction of recent reference-price moves.

pub mod indicator;

pub use indicator::{DirectionalIndex, TrendState};
