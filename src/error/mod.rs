pub mod logging;
pub mod quicklist;

pub use logging::LoggingError;
pub use quicklist::{BlockError, BlockResult, QuickListError, QuickListResult};
