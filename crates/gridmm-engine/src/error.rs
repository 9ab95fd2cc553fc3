//! Engine error types.

use thiserror::Error;

use gridmm_adapter::AdapterError;
use gridmm_core::{CoreError, Symbol};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    #[error("Adapter error: {0}")]
    Adapter(#[from] AdapterError),

    #[error("No usable reference price for {0}")]
    MissingReferencePrice(Symbol),
}

pub type EngineResult<T> = Result<T, EngineError>;
