//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Core error: {0}")]
    Core(#[from] gridmm_core::CoreError),

    #[error("Adapter error: {0}")]
    Adapter(#[from] gridmm_adapter::AdapterError),

    #[error("Engine error: {0}")]
    Engine(#[from] gridmm_engine::EngineError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] gridmm_telemetry::TelemetryError),

    #[error("Preflight error: {0}")]
    Preflight(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
