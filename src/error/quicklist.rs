use thiserror::Error;

pub type BlockResult<T> = Result<T, BlockError>;
pub type QuickListResult<T> = Result<T, QuickListError>;

/// Ошибки операций над отдельным блоком.
///
/// `CapacityExceeded` сигнализирует о нарушении внутреннего инварианта и
/// никогда не покидает `QuickList`: список проверяет заполненность блока
/// до каждой вставки.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockError {
    #[error("Block capacity exceeded: capacity is {capacity}")]
    CapacityExceeded { capacity: usize },

    #[error("Block is empty")]
    EmptyBlock,

    #[error("Block index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Ошибки, которые `QuickList` возвращает вызывающему коду.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickListError {
    #[error("QuickList is empty")]
    EmptySequence,

    /// Индекс (или граница диапазона) вне допустимых пределов после
    /// нормализации отрицательного индекса.
    #[error("Index {index} out of range for length {len}")]
    IndexOutOfRange { index: isize, len: usize },
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
