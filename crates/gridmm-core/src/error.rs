//! Errors shared across the bot's crates.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// A wire or config value that should be a decimal is not.
    #[error("Unparseable decimal: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    /// A knob failed validation before the engine started.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
