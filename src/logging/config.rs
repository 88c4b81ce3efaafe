use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::Directive;

use crate::error::LoggingError;

const LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Формат вывода событий.
#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Многострочный человекочитаемый вывод
    Pretty,
    /// Одна строка на событие
    #[default]
    Compact,
    /// JSON, одна строка на событие
    Json,
}

/// Конфигурация логирования.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Базовый уровень (`trace`, `debug`, `info`, `warn`, `error`, `off`)
    pub level: String,
    /// Дополнительные директивы вида `quicklist=trace`
    pub directives: Vec<String>,
    pub format: LogFormat,
    pub with_ansi: bool,
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directives: Vec::new(),
            format: LogFormat::default(),
            with_ansi: true,
            with_target: true,
        }
    }
}

impl LoggingConfig {
    /// Проверяет уровень и все директивы.
    pub fn validate(&self) -> Result<(), LoggingError> {
        let level = self.level.to_ascii_lowercase();
        if !LEVELS.contains(&level.as_str()) {
            return Err(LoggingError::InvalidLevel(self.level.clone()));
        }

        for directive in &self.directives {
            directive.parse::<Directive>()?;
        }

        Ok(())
    }

    /// Собирает строку фильтра для `EnvFilter`: уровень и директивы через
    /// запятую.
    pub fn build_filter_directive(&self) -> String {
        std::iter::once(self.level.to_ascii_lowercase())
            .chain(self.directives.iter().cloned())
            .collect::<Vec<_>>()
            .join(",")
    }
}
