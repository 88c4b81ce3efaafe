use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Ёмкость блока по умолчанию.
pub const DEFAULT_BLOCK_CAPACITY: usize = 128;

/// Префикс переменных окружения (`QUICKLIST_BLOCK_CAPACITY=64`).
const ENV_PREFIX: &str = "QUICKLIST";

/// Настройки, которые `QuickList` принимает при создании.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuickListConfig {
    /// Максимальное кол-во элементов в одном блоке
    pub block_capacity: usize,
}

impl Default for QuickListConfig {
    fn default() -> Self {
        Self {
            block_capacity: DEFAULT_BLOCK_CAPACITY,
        }
    }
}

impl QuickListConfig {
    /// Создаёт конфигурацию с заданной ёмкостью блока.
    pub fn with_block_capacity(block_capacity: usize) -> Self {
        Self { block_capacity }
    }

    /// Загружает конфигурацию из значений по умолчанию и переменных
    /// окружения с префиксом `QUICKLIST_`.
    pub fn load() -> Result<Self, ConfigError> {
        Self::build(None)
    }

    /// То же, что [`QuickListConfig::load`], но сначала читает файл `path`
    /// (формат определяется по расширению). Переменные окружения имеют
    /// приоритет над файлом.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::build(Some(path.as_ref()))
    }

    /// Проверяет корректность значений.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_capacity == 0 {
            return Err(ConfigError::Message(
                "block_capacity must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }

    fn build(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder =
            Config::builder().set_default("block_capacity", DEFAULT_BLOCK_CAPACITY as i64)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let cfg = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let settings: Self = cfg.try_deserialize()?;
        settings.validate()?;

        Ok(settings)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
