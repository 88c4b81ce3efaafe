pub mod quicklist;

pub use quicklist::*;
