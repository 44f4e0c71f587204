//! Генератор демонстрационных сделок.

use crate::config::{DEMO_SETTINGS, DemoSettings};
use commons::errors::LedgerError;
use commons::models::{Stock, Trade, TradeIndicator};
use rand::Rng;
use rand::rngs::ThreadRng;

/// Генератор случайных сделок по набору акций.
///
/// Стартовая цена каждой акции равна её номиналу, далее цена плавно
/// колеблется (+/- [`DemoSettings::price_swing`] от предыдущей). Источник
/// случайности подставляется, что позволяет воспроизводить серии в тестах.
///
/// ## Пример
///
/// ```ignore
/// let mut generator = TradeGenerator::new(&sample_stocks())?;
/// let trade = generator.next_trade(get_timestamp());
/// ```
pub struct TradeGenerator<R: Rng = ThreadRng> {
    /// Параметры генерации.
    settings: &'static DemoSettings,
    /// Последняя цена по тикеру ("табло котировок"), в порядке тикеров.
    price_board: Vec<(String, f64)>,
    /// Источник случайности.
    rng: R,
}

impl TradeGenerator {
    /// Создать генератор для предоставленных акций.
    ///
    /// ## Ошибки
    ///
    /// [`LedgerError::InvalidInput`], если набор акций пустой.
    pub fn new(stocks: &[Stock]) -> Result<Self, LedgerError> {
        Self::with_rng(stocks, rand::rng())
    }
}

impl<R: Rng> TradeGenerator<R> {
    /// Создать генератор с заданным источником случайности.
    pub fn with_rng(stocks: &[Stock], rng: R) -> Result<Self, LedgerError> {
        if stocks.is_empty() {
            return Err(LedgerError::invalid_input(
                "нет акций для генерации сделок",
            ));
        }

        let mut price_board: Vec<(String, f64)> = stocks
            .iter()
            .map(|stock| (stock.symbol.clone(), stock.par_value))
            .collect();
        price_board.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(Self {
            settings: &DEMO_SETTINGS,
            price_board,
            rng,
        })
    }

    /// Сформировать очередную сделку с меткой времени не позже `now`.
    pub fn next_trade(&mut self, now: u64) -> Trade {
        let slot = self.rng.random_range(0..self.price_board.len());
        let price = self.step_price(slot);
        let quantity = self.sample_quantity();
        let indicator = self.sample_side();
        let timestamp = self.sample_timestamp(now);

        Trade::new(&self.price_board[slot].0, timestamp, quantity, indicator, price)
    }

    /// Сдвинуть цену тикера на табло не более чем на
    /// [`DemoSettings::price_swing`] и вернуть новую (с точностью до сотых).
    fn step_price(&mut self, slot: usize) -> f64 {
        let settings = self.settings;
        let old = self.price_board[slot].1;

        let min = (old * (1.0 - settings.price_swing)).max(settings.min_price);
        let max = (old * (1.0 + settings.price_swing)).max(min);
        let stepped = (self.rng.random_range(min..=max) * 100.0).round() / 100.0;
        let new_price = stepped.max(settings.min_price);

        self.price_board[slot].1 = new_price;
        new_price
    }

    /// Количество акций в сделке из [`DemoSettings::units_per_trade`].
    fn sample_quantity(&mut self) -> u32 {
        let (min, max) = self.settings.units_per_trade;
        self.rng.random_range(min..=max)
    }

    /// Продажа с вероятностью [`DemoSettings::probability_sell`].
    fn sample_side(&mut self) -> TradeIndicator {
        if self.rng.random_bool(self.settings.probability_sell) {
            TradeIndicator::Sell
        } else {
            TradeIndicator::Buy
        }
    }

    /// Метка времени не старше [`DemoSettings::max_age_secs`] от `now`.
    fn sample_timestamp(&mut self, now: u64) -> u64 {
        now.saturating_sub(self.rng.random_range(0..=self.settings.max_age_secs))
    }
}
