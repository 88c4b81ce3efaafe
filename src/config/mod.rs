pub mod settings;

pub use settings::{QuickListConfig, DEFAULT_BLOCK_CAPACITY};
