use thiserror::Error;

#[derive(Error, Debug)]
pub enum OverviewError {
    #[error("Ошибка конфигурации: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    /// Нарушение инварианта: событие окна, для которого нет активности
    #[error("Активность для окна {0} не найдена")]
    ActivityNotFound(String),

    #[error("Нет startup-id для {0}, сплэш не поднять")]
    MissingStartupId(String),

    #[error("Недопустимый размер карточки: {width}x{height}")]
    InvalidSize { width: i32, height: i32 },

    #[error("Канал событий закрыт: {0}")]
    Channel(String),
}

impl OverviewError {
    pub fn activity_not_found<T>(msg: impl Into<String>) -> Result<T> {
        Err(OverviewError::ActivityNotFound(msg.into()))
    }

    /// Ошибка означает рассинхронизацию с реестром окон
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, OverviewError::ActivityNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, OverviewError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! overview_error {
    (activity_not_found, $($arg:tt)*) => {
        $crate::error::OverviewError::ActivityNotFound(format!($($arg)*))
    };
    (channel, $($arg:tt)*) => {
        $crate::error::OverviewError::Channel(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invariant_violations_are_classified() {
        let err = overview_error!(activity_not_found, "{}", "toplevel-7");
        assert!(err.is_invariant_violation());
        assert_eq!(err.to_string(), "Активность для окна toplevel-7 не найдена");

        let err = OverviewError::MissingStartupId("org.example.App".into());
        assert!(!err.is_invariant_violation());
    }

    #[test]
    fn activity_not_found_helper_returns_err() {
        let res: Result<()> = OverviewError::activity_not_found("toplevel-1");
        assert!(matches!(res, Err(OverviewError::ActivityNotFound(_))));
    }
}
