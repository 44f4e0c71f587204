//! Модели данных для приложений.

use crate::errors::LedgerError;
use macros::{LedgerEnum, PipeDisplay};
use serde::Deserialize;

/// Вид акции.
#[derive(Debug, Clone, Copy, PartialEq, Eq, LedgerEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockKind {
    /// Обыкновенная акция: доходность считается от последнего дивиденда.
    #[ledger(name = "common", alias = "c")]
    Common,
    /// Привилегированная акция: доходность считается от фиксированного
    /// дивиденда.
    #[ledger(name = "preferred", alias = "p", alias = "pref")]
    Preferred,
}

/// Направление сделки.
#[derive(Debug, Clone, Copy, PartialEq, Eq, LedgerEnum)]
pub enum TradeIndicator {
    /// Покупка.
    #[ledger(name = "buy", alias = "b")]
    Buy,
    /// Продажа.
    #[ledger(name = "sell", alias = "s")]
    Sell,
}

/// Акция, торгуемая на бирже.
///
/// Экземпляр создаётся через [`Stock::new`], который проверяет атрибуты;
/// после создания не изменяется. Денежные величины (дивиденд, номинал)
/// выражены в одних единицах (пенсы).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Stock {
    /// Тикер (в верхнем регистре).
    pub symbol: String,
    /// Вид акции.
    pub kind: StockKind,
    /// Последний дивиденд.
    pub last_dividend: f64,
    /// Фиксированный дивиденд, доля от номинала в `[0, 1]`. Только для
    /// [`StockKind::Preferred`].
    #[serde(default)]
    pub fixed_dividend: Option<f64>,
    /// Номинальная стоимость.
    pub par_value: f64,
}

impl Stock {
    /// Создать акцию с проверкой атрибутов.
    ///
    /// Тикер приводится к верхнему регистру.
    ///
    /// ## Ошибки
    ///
    /// [`LedgerError::InvalidInput`], если тикер пустой, дивиденд
    /// отрицательный, номинал неположительный, либо фиксированный дивиденд
    /// отсутствует у привилегированной акции, задан у обыкновенной или
    /// лежит вне `[0, 1]`.
    pub fn new(
        symbol: &str,
        kind: StockKind,
        last_dividend: f64,
        fixed_dividend: Option<f64>,
        par_value: f64,
    ) -> Result<Self, LedgerError> {
        let stock = Self {
            symbol: normalize_symbol(symbol),
            kind,
            last_dividend,
            fixed_dividend,
            par_value,
        };
        stock.validate()?;
        Ok(stock)
    }

    /// Обыкновенная акция.
    pub fn common(symbol: &str, last_dividend: f64, par_value: f64) -> Result<Self, LedgerError> {
        Self::new(symbol, StockKind::Common, last_dividend, None, par_value)
    }

    /// Привилегированная акция.
    pub fn preferred(
        symbol: &str,
        last_dividend: f64,
        fixed_dividend: f64,
        par_value: f64,
    ) -> Result<Self, LedgerError> {
        Self::new(
            symbol,
            StockKind::Preferred,
            last_dividend,
            Some(fixed_dividend),
            par_value,
        )
    }

    /// Проверить атрибуты акции.
    ///
    /// Нужна и после десериализации, где [`Stock::new`] не вызывается.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.symbol.trim().is_empty() {
            return Err(LedgerError::invalid_input("пустой тикер"));
        }
        if !self.last_dividend.is_finite() || self.last_dividend < 0.0 {
            return Err(LedgerError::invalid_input(format!(
                "{}: отрицательный последний дивиденд {}",
                self.symbol, self.last_dividend
            )));
        }
        if !self.par_value.is_finite() || self.par_value <= 0.0 {
            return Err(LedgerError::invalid_input(format!(
                "{}: номинал должен быть положительным, получено {}",
                self.symbol, self.par_value
            )));
        }
        match (self.kind, self.fixed_dividend) {
            (StockKind::Common, None) => Ok(()),
            (StockKind::Common, Some(_)) => Err(LedgerError::invalid_input(format!(
                "{}: фиксированный дивиденд допустим только для привилегированных акций",
                self.symbol
            ))),
            (StockKind::Preferred, None) => Err(LedgerError::invalid_input(format!(
                "{}: не задан фиксированный дивиденд",
                self.symbol
            ))),
            (StockKind::Preferred, Some(fixed)) if (0.0..=1.0).contains(&fixed) => Ok(()),
            (StockKind::Preferred, Some(fixed)) => Err(LedgerError::invalid_input(format!(
                "{}: фиксированный дивиденд {} вне диапазона [0, 1]",
                self.symbol, fixed
            ))),
        }
    }

    /// Дивиденд на одну акцию: последний дивиденд для обыкновенной,
    /// фиксированная доля номинала для привилегированной.
    pub fn dividend(&self) -> f64 {
        match self.kind {
            StockKind::Common => self.last_dividend,
            StockKind::Preferred => self.fixed_dividend.unwrap_or(0.0) * self.par_value,
        }
    }

    /// Дивидендная доходность при цене `market_price`.
    pub fn dividend_yield(&self, market_price: f64) -> Result<f64, LedgerError> {
        check_positive("рыночная цена", market_price)?;
        Ok(self.dividend() / market_price)
    }

    /// Коэффициент P/E при цене `market_price`: цена, делённая на последний
    /// дивиденд.
    ///
    /// ## Ошибки
    ///
    /// [`LedgerError::DivisionByZero`], если последний дивиденд равен нулю.
    pub fn pe_ratio(&self, market_price: f64) -> Result<f64, LedgerError> {
        check_positive("рыночная цена", market_price)?;
        if self.last_dividend == 0.0 {
            return Err(LedgerError::division_by_zero(format!(
                "у {} нулевой последний дивиденд",
                self.symbol
            )));
        }
        Ok(market_price / self.last_dividend)
    }
}

/// Сделка по акции.
///
/// Строковое представление: `SYMBOL|TIMESTAMP|QUANTITY|buy|PRICE`.
#[derive(Debug, Clone, PartialEq, PipeDisplay)]
pub struct Trade {
    /// Тикер акции.
    pub symbol: String,
    /// Временная метка сделки (секунды UNIX).
    pub timestamp: u64,
    /// Количество акций.
    pub quantity: u32,
    /// Покупка или продажа.
    pub indicator: TradeIndicator,
    /// Цена за одну акцию.
    pub price: f64,
}

impl Trade {
    /// Создать сделку. Тикер приводится к верхнему регистру; проверка
    /// значений выполняется при записи в реестр.
    pub fn new(
        symbol: &str,
        timestamp: u64,
        quantity: u32,
        indicator: TradeIndicator,
        price: f64,
    ) -> Self {
        Self {
            symbol: normalize_symbol(symbol),
            timestamp,
            quantity,
            indicator,
            price,
        }
    }

    /// Проверить количество и цену.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.quantity == 0 {
            return Err(LedgerError::invalid_input(format!(
                "{}: количество должно быть положительным",
                self.symbol
            )));
        }
        check_positive("цена сделки", self.price)
    }

    /// Средневзвешенная по объёму цена для набора сделок.
    ///
    /// Считается как накопительное взвешенное среднее: для одной сделки (или
    /// сделок по одной цене) результат в точности равен цене.
    ///
    /// `None`, если набор пустой.
    pub fn volume_weighted_price<'a, I>(trades: I) -> Option<f64>
    where
        I: IntoIterator<Item = &'a Trade>,
    {
        let (mean, volume) = trades
            .into_iter()
            .fold((0.0, 0u64), |(mean, volume), trade| {
                let volume = volume + u64::from(trade.quantity);
                let weight = f64::from(trade.quantity) / volume as f64;
                (mean + (trade.price - mean) * weight, volume)
            });

        (volume > 0).then_some(mean)
    }
}

/// Привести тикер к каноническому виду.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

fn check_positive(what: &str, value: f64) -> Result<(), LedgerError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(LedgerError::invalid_input(format!(
            "{what} должна быть положительной, получено {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_coerced_to_uppercase() {
        let stock = Stock::common("tea", 0.0, 100.0).unwrap();
        assert_eq!(stock.symbol, "TEA");
        assert!(stock.fixed_dividend.is_none());
    }

    #[test]
    fn common_dividend_yield() {
        let stock = Stock::common("POP", 8.0, 100.0).unwrap();
        assert_eq!(stock.dividend_yield(100.0).unwrap(), 0.08);
    }

    #[test]
    fn common_zero_dividend_yield() {
        let stock = Stock::common("TEA", 0.0, 100.0).unwrap();
        assert_eq!(stock.dividend_yield(100.0).unwrap(), 0.0);
    }

    #[test]
    fn preferred_dividend_yield() {
        let stock = Stock::preferred("GIN", 8.0, 0.02, 100.0).unwrap();
        assert_eq!(stock.dividend(), 2.0);
        assert_eq!(stock.dividend_yield(100.0).unwrap(), 0.02);
    }

    #[test]
    fn dividend_yield_rejects_non_positive_price() {
        let stock = Stock::common("POP", 8.0, 100.0).unwrap();
        assert!(matches!(
            stock.dividend_yield(0.0),
            Err(LedgerError::InvalidInput(_))
        ));
        assert!(matches!(
            stock.dividend_yield(-5.0),
            Err(LedgerError::InvalidInput(_))
        ));
    }

    #[test]
    fn pe_ratio_uses_last_dividend() {
        let pop = Stock::common("POP", 8.0, 100.0).unwrap();
        assert_eq!(pop.pe_ratio(100.0).unwrap(), 12.5);

        let gin = Stock::preferred("GIN", 8.0, 0.02, 100.0).unwrap();
        assert_eq!(gin.pe_ratio(100.0).unwrap(), 12.5);
    }

    #[test]
    fn pe_ratio_zero_dividend_is_division_by_zero() {
        let tea = Stock::common("TEA", 0.0, 100.0).unwrap();
        assert!(matches!(
            tea.pe_ratio(100.0),
            Err(LedgerError::DivisionByZero(_))
        ));
    }

    #[test]
    fn stock_validation() {
        assert!(Stock::common("", 1.0, 100.0).is_err());
        assert!(Stock::common("BAD", -1.0, 100.0).is_err());
        assert!(Stock::common("BAD", 1.0, 0.0).is_err());
        assert!(Stock::preferred("BAD", 1.0, 1.5, 100.0).is_err());
        assert!(Stock::preferred("BAD", 1.0, -0.1, 100.0).is_err());
        assert!(Stock::new("BAD", StockKind::Common, 1.0, Some(0.1), 100.0).is_err());
        assert!(Stock::new("BAD", StockKind::Preferred, 1.0, None, 100.0).is_err());
    }

    #[test]
    fn trade_validation() {
        assert!(Trade::new("POP", 0, 0, TradeIndicator::Buy, 10.0).validate().is_err());
        assert!(Trade::new("POP", 0, 1, TradeIndicator::Buy, 0.0).validate().is_err());
        assert!(Trade::new("POP", 0, 1, TradeIndicator::Sell, 10.0).validate().is_ok());
    }

    #[test]
    fn volume_weighted_price() {
        let trades = vec![
            Trade::new("TEST", 0, 16, TradeIndicator::Buy, 100.0),
            Trade::new("TEST", 0, 8, TradeIndicator::Buy, 50.0),
        ];
        let price = Trade::volume_weighted_price(&trades).unwrap();
        assert!((price - 83.333_333_3).abs() < 1e-6);
    }

    #[test]
    fn volume_weighted_price_of_nothing_is_none() {
        let trades: Vec<Trade> = vec![];
        assert!(Trade::volume_weighted_price(&trades).is_none());
    }

    #[test]
    fn trade_pipe_format() {
        let trade = Trade::new("gin", 1_700_000_000, 1000, TradeIndicator::Sell, 256.5);
        assert_eq!(trade.to_string(), "GIN|1700000000|1000|sell|256.5");

        let parsed: Trade = " GIN | 1700000000 | 1000 | SELL | 256.5 ".parse().unwrap();
        assert_eq!(parsed, trade);
    }

    #[test]
    fn trade_pipe_format_errors() {
        assert!(matches!(
            "GIN|1|2|buy".parse::<Trade>(),
            Err(LedgerError::InvalidInput(_))
        ));
        assert!(matches!(
            "GIN|1|2|hold|3".parse::<Trade>(),
            Err(LedgerError::InvalidInput(_))
        ));
        assert!("GIN|1|-2|buy|3".parse::<Trade>().is_err());
    }

    #[test]
    fn kinds_from_str() {
        assert_eq!("Preferred".parse::<StockKind>().unwrap(), StockKind::Preferred);
        assert_eq!(TradeIndicator::Buy.to_string(), "buy");
    }

    #[test]
    fn kinds_accept_aliases() {
        assert_eq!("PREF".parse::<StockKind>().unwrap(), StockKind::Preferred);
        assert_eq!(" c ".parse::<StockKind>().unwrap(), StockKind::Common);
        assert_eq!("S".parse::<TradeIndicator>().unwrap(), TradeIndicator::Sell);
        // Синоним не меняет каноническое имя.
        assert_eq!("b".parse::<TradeIndicator>().unwrap().as_str(), "buy");
    }

    #[test]
    fn unknown_kind_lists_allowed_names() {
        match "hold".parse::<TradeIndicator>() {
            Err(LedgerError::InvalidInput(msg)) => {
                assert!(msg.contains("hold"), "{msg}");
                assert!(msg.contains("buy, sell"), "{msg}");
            }
            other => panic!("ожидалась ошибка разбора, получено {other:?}"),
        }
    }

    #[test]
    fn variants_in_declaration_order() {
        assert_eq!(StockKind::VARIANTS, &[StockKind::Common, StockKind::Preferred]);
        let names: Vec<_> = TradeIndicator::VARIANTS.iter().map(|v| v.as_str()).collect();
        assert_eq!(names, vec!["buy", "sell"]);
    }

    #[test]
    fn trade_line_accepts_side_alias() {
        let trade: Trade = "POP|10|5|s|8".parse().unwrap();
        assert_eq!(trade.indicator, TradeIndicator::Sell);
        assert_eq!(trade.to_string(), "POP|10|5|sell|8");
    }
}
