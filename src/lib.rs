/// QuickList configuration loading.
pub mod config;
/// Built-in data structures (QuickList and its blocks).
pub mod database;
/// Common error types: block, list and logging errors.
pub mod error;
/// Logging setup (formatting, filters).
pub mod logging;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// config
pub use crate::config::{QuickListConfig, DEFAULT_BLOCK_CAPACITY};
/// Data types: QuickList, Block and iteration helpers.
pub use database::{
    Block, Cursor, IntoIter, Iter, QuickList, QuickListStatistics, ValidationError,
};
/// Operation errors and result types.
pub use error::{BlockError, BlockResult, LoggingError, QuickListError, QuickListResult};
/// Logging entry point.
pub use logging::{init_logging, LogFormat, LoggingConfig};
