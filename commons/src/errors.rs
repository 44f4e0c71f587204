//! Собственные типы ошибок приложения.
//!
//! Для поддержки функциональности применяется крейт `thiserror`.

use std::sync::PoisonError;
use thiserror::Error;

/// Дерево ошибок биржевого реестра.
///
/// Все варианты восстановимы: вызывающая сторона решает, как их показать.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Тикер отсутствует в реестре.
    #[error("неизвестный тикер: {0}")]
    UnknownSymbol(String),

    /// Некорректное значение.
    ///
    /// Например, неположительная цена или количество, либо процент
    /// фиксированного дивиденда вне диапазона `[0, 1]`.
    #[error("неверное значение: {0}")]
    InvalidInput(String),

    /// Деление на ноль: у акции нулевой последний дивиденд (расчёт P/E).
    #[error("деление на ноль: {0}")]
    DivisionByZero(String),

    /// Нет сделок, подходящих под запрос.
    #[error("нет сделок: {0}")]
    NoTrades(String),

    /// Ошибка блокировки mutex.
    #[error("ошибка блокировки: {0}")]
    LockError(String),

    /// Ошибка загрузки данных из файла.
    #[error("ошибка загрузки данных: {0}")]
    Fixture(String),
}

impl<T> From<PoisonError<T>> for LedgerError {
    fn from(err: PoisonError<T>) -> Self {
        LedgerError::LockError(err.to_string())
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Fixture(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Fixture(err.to_string())
    }
}

impl LedgerError {
    /// Конструктор для ошибки [`LedgerError::UnknownSymbol`].
    pub fn unknown_symbol(symbol: impl Into<String>) -> LedgerError {
        Self::UnknownSymbol(symbol.into())
    }

    /// Конструктор для ошибки [`LedgerError::InvalidInput`].
    pub fn invalid_input(message: impl Into<String>) -> LedgerError {
        Self::InvalidInput(message.into())
    }

    /// Конструктор для ошибки [`LedgerError::DivisionByZero`].
    pub fn division_by_zero(message: impl Into<String>) -> LedgerError {
        Self::DivisionByZero(message.into())
    }

    /// Конструктор для ошибки [`LedgerError::NoTrades`].
    pub fn no_trades(message: impl Into<String>) -> LedgerError {
        Self::NoTrades(message.into())
    }
}
