//! QuickList - двусвязный список блоков фиксированной ёмкости.
//!
//! # Модули
//!
//! - `block`: кольцевой буфер фиксированной ёмкости.
//! - `quicklist_base`: цепочка блоков с разделением и слиянием.
//! - `iter`: итераторы и курсор для живого обхода.
//! - `safety`: валидация и статистика.

pub mod block;
pub mod iter;
pub mod quicklist_base;
pub mod safety;

pub use block::*;
pub use iter::*;
pub use quicklist_base::QuickList;
pub use safety::*;
