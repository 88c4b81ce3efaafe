/// Макрос для debug-time проверки инвариантов.
///
/// В release-сборках компилируется в no-op.
#[macro_export]
macro_rules! debug_assert_invariant {
    ($cond:expr, $($arg:tt)*) => {
        #[cfg(debug_assertions)]
        {
            if !$cond {
                panic!("Invariant violation: {}", format!($($arg)*));
            }
        }
    };
}

/// Макрос для валидации условий с возвратом ошибки.
#[macro_export]
macro_rules! validate {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// В цепочке остался пустой блок
    EmptyBlock { position: usize },
    /// Блок превышает допустимую ёмкость
    BlockOverflow { position: usize, len: usize, capacity: usize },
    /// `prev` блока не указывает на предыдущий блок цепочки
    BrokenLink { position: usize },
    /// Блок и его предшественник оба заполнены меньше чем наполовину
    UnderfilledPair { position: usize },
    /// `head`/`tail` списка не совпадают с концами цепочки
    EndpointMismatch { message: String },
    /// Кэшированное кол-во элементов не совпадает с реальным
    LengthMismatch { expected: usize, actual: usize },
    /// Кэшированное кол-во блоков не совпадает с реальным
    BlockCountMismatch { expected: usize, actual: usize },
}

/// Статистика заполнения блоков `QuickList`.
#[derive(Debug, Clone, PartialEq)]
pub struct QuickListStatistics {
    /// Количество блоков в цепочке
    pub block_count: usize,
    /// Общее количество элементов
    pub element_count: usize,
    /// Настроенная ёмкость блока
    pub block_capacity: usize,
    /// Минимальная заполненность блока
    pub min_fill: usize,
    /// Максимальная заполненность блока
    pub max_fill: usize,
    /// Средняя заполненность блока
    pub average_fill: f64,
    /// Блоки ниже порога слияния
    pub underfilled_blocks: usize,
}

impl QuickListStatistics {
    /// Создаёт пустую статистику.
    pub fn empty(block_capacity: usize) -> Self {
        Self {
            block_count: 0,
            element_count: 0,
            block_capacity,
            min_fill: 0,
            max_fill: 0,
            average_fill: 0.0,
            underfilled_blocks: 0,
        }
    }

    /// Доля занятых слотов относительно `block_count * block_capacity`.
    pub fn utilization(&self) -> f64 {
        if self.block_count == 0 || self.block_capacity == 0 {
            return 0.0;
        }

        self.element_count as f64 / (self.block_count * self.block_capacity) as f64
    }

    /// Форматирует статистику для вывода.
    pub fn format_report(&self) -> String {
        let mut report = String::new();
        report.push_str("QuickList Statistics:\n");
        report.push_str(&format!("  Blocks: {}\n", self.block_count));
        report.push_str(&format!("  Elements: {}\n", self.element_count));
        report.push_str(&format!("  Block capacity: {}\n", self.block_capacity));
        report.push_str(&format!(
            "  Fill: min {} / max {} / avg {:.2}\n",
            self.min_fill, self.max_fill, self.average_fill
        ));
        report.push_str(&format!(
            "  Utilization: {:.1}%\n",
            self.utilization() * 100.0
        ));
        report.push_str(&format!(
            "  Underfilled blocks: {}\n",
            self.underfilled_blocks
        ));
        report
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            ValidationError::EmptyBlock { position } => {
                write!(f, "Empty block left in chain at position {position}")
            }
            ValidationError::BlockOverflow {
                position,
                len,
                capacity,
            } => {
                write!(
                    f,
                    "Block at position {position} holds {len} elements, capacity is {capacity}"
                )
            }
            ValidationError::BrokenLink { position } => {
                write!(f, "Broken prev link at block position {position}")
            }
            ValidationError::UnderfilledPair { position } => {
                write!(
                    f,
                    "Blocks at positions {} and {position} are both underfilled",
                    position.saturating_sub(1)
                )
            }
            ValidationError::EndpointMismatch { message } => {
                write!(f, "Endpoint mismatch: {message}")
            }
            ValidationError::LengthMismatch { expected, actual } => {
                write!(f, "Length mismatch: expected {expected}, got {actual}")
            }
            ValidationError::BlockCountMismatch { expected, actual } => {
                write!(
                    f,
                    "Block count mismatch: expected {expected}, got {actual}"
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}
