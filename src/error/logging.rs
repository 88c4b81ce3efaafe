use thiserror::Error;
use tracing_subscriber::{filter::ParseError, util::TryInitError};

/// Ошибки инициализации логирования.
#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    #[error("Invalid log filter directive: {0}")]
    InvalidFilter(#[from] ParseError),

    /// Глобальный subscriber уже установлен.
    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(#[from] TryInitError),
}
