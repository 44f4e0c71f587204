//! Биржевой реестр: справочник акций, журнал сделок и расчёт показателей.

use crate::errors::LedgerError;
use crate::models::{Stock, StockKind, Trade, TradeIndicator, normalize_symbol};
use crate::utils::window_start;
use log::{debug, info, warn};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

/// Окно расчёта средневзвешенной цены по умолчанию, в минутах.
pub const DEFAULT_WINDOW_MINUTES: u64 = 15;

/// Стартовый набор акций биржи GBCE.
pub fn sample_stocks() -> Vec<Stock> {
    let common = |symbol: &str, last_dividend: f64, par_value: f64| Stock {
        symbol: symbol.to_string(),
        kind: StockKind::Common,
        last_dividend,
        fixed_dividend: None,
        par_value,
    };

    vec![
        common("TEA", 0.0, 100.0),
        common("POP", 8.0, 100.0),
        common("ALE", 23.0, 60.0),
        Stock {
            symbol: "GIN".to_string(),
            kind: StockKind::Preferred,
            last_dividend: 8.0,
            fixed_dividend: Some(0.02),
            par_value: 100.0,
        },
        common("JOE", 13.0, 250.0),
    ]
}

/// Реестр акций и сделок.
///
/// Набор акций фиксируется при создании. Сделки только добавляются; журнал
/// защищён одним [`Mutex`], поэтому запись и оконные выборки не
/// перемежаются, а реестр можно разделять между потоками через `Arc`.
///
/// ## Пример
///
/// ```
/// use commons::ledger::StockLedger;
/// use commons::models::TradeIndicator;
///
/// let ledger = StockLedger::with_sample_stocks();
/// ledger.record_trade("POP", 1_000, 10, TradeIndicator::Buy, 12.0).unwrap();
///
/// assert_eq!(ledger.dividend_yield("POP", 100.0).unwrap(), 0.08);
/// assert_eq!(ledger.volume_weighted_stock_price("POP", 1_000).unwrap(), 12.0);
/// ```
#[derive(Debug)]
pub struct StockLedger {
    /// Акции по тикеру.
    stocks: HashMap<String, Stock>,
    /// Журнал сделок в порядке записи.
    trades: Mutex<Vec<Trade>>,
}

impl StockLedger {
    /// Создать реестр с заданным набором акций.
    ///
    /// ## Ошибки
    ///
    /// [`LedgerError::InvalidInput`], если акция не проходит проверку или
    /// тикер повторяется.
    pub fn new(stocks: impl IntoIterator<Item = Stock>) -> Result<Self, LedgerError> {
        let mut map = HashMap::new();

        for mut stock in stocks {
            stock.symbol = normalize_symbol(&stock.symbol);
            stock.validate()?;
            if map.contains_key(&stock.symbol) {
                return Err(LedgerError::invalid_input(format!(
                    "тикер {} указан повторно",
                    stock.symbol
                )));
            }
            map.insert(stock.symbol.clone(), stock);
        }

        info!("Реестр создан: {} акций", map.len());

        Ok(Self {
            stocks: map,
            trades: Mutex::new(Vec::new()),
        })
    }

    /// Реестр со стартовым набором акций ([`sample_stocks`]).
    pub fn with_sample_stocks() -> Self {
        let stocks = sample_stocks()
            .into_iter()
            .map(|stock| (stock.symbol.clone(), stock))
            .collect();

        Self {
            stocks,
            trades: Mutex::new(Vec::new()),
        }
    }

    /// Найти акцию по тикеру (без учёта регистра).
    pub fn stock(&self, symbol: &str) -> Result<&Stock, LedgerError> {
        self.stocks
            .get(&normalize_symbol(symbol))
            .ok_or_else(|| LedgerError::unknown_symbol(symbol))
    }

    /// Тикеры реестра в алфавитном порядке.
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.stocks.keys().cloned().collect();
        symbols.sort();
        symbols
    }

    /// Дивидендная доходность акции при цене `market_price`.
    ///
    /// Для обыкновенной акции `last_dividend / market_price`, для
    /// привилегированной `fixed_dividend * par_value / market_price`.
    pub fn dividend_yield(&self, symbol: &str, market_price: f64) -> Result<f64, LedgerError> {
        self.stock(symbol)?.dividend_yield(market_price)
    }

    /// Коэффициент P/E акции при цене `market_price`.
    ///
    /// ## Ошибки
    ///
    /// [`LedgerError::DivisionByZero`], если последний дивиденд равен нулю.
    pub fn pe_ratio(&self, symbol: &str, market_price: f64) -> Result<f64, LedgerError> {
        self.stock(symbol)?.pe_ratio(market_price)
    }

    /// Записать сделку.
    ///
    /// ## Ошибки
    ///
    /// - [`LedgerError::UnknownSymbol`] — тикер отсутствует в реестре
    /// - [`LedgerError::InvalidInput`] — нулевое количество или
    ///   неположительная цена
    pub fn record_trade(
        &self,
        symbol: &str,
        timestamp: u64,
        quantity: u32,
        indicator: TradeIndicator,
        price: f64,
    ) -> Result<(), LedgerError> {
        self.record(Trade::new(symbol, timestamp, quantity, indicator, price))
    }

    /// Записать готовую сделку (с теми же проверками, что
    /// [`StockLedger::record_trade`]).
    pub fn record(&self, mut trade: Trade) -> Result<(), LedgerError> {
        trade.symbol = normalize_symbol(&trade.symbol);

        if let Err(err) = self.stock(&trade.symbol).and_then(|_| trade.validate()) {
            warn!("Сделка отклонена ({trade}): {err}");
            return Err(err);
        }

        info!("Сделка записана: {trade}");
        self.trades.lock()?.push(trade);
        Ok(())
    }

    /// Количество записанных сделок.
    pub fn trade_count(&self) -> Result<usize, LedgerError> {
        Ok(self.trades.lock()?.len())
    }

    /// Снимок журнала сделок в порядке записи.
    pub fn trades(&self) -> Result<Vec<Trade>, LedgerError> {
        Ok(self.trades.lock()?.clone())
    }

    /// Сделки по одному тикеру в порядке записи.
    pub fn trades_for(&self, symbol: &str) -> Result<Vec<Trade>, LedgerError> {
        let symbol = &self.stock(symbol)?.symbol;
        Ok(self
            .trades
            .lock()?
            .iter()
            .filter(|trade| &trade.symbol == symbol)
            .cloned()
            .collect())
    }

    /// Средневзвешенная по объёму цена акции за последние
    /// [`DEFAULT_WINDOW_MINUTES`] минут на момент `now`.
    pub fn volume_weighted_stock_price(&self, symbol: &str, now: u64) -> Result<f64, LedgerError> {
        self.volume_weighted_stock_price_within(symbol, now, DEFAULT_WINDOW_MINUTES)
    }

    /// Средневзвешенная по объёму цена акции по сделкам с меткой времени
    /// в `[now − window_minutes, now]`.
    ///
    /// ## Ошибки
    ///
    /// - [`LedgerError::UnknownSymbol`] — тикер отсутствует в реестре
    /// - [`LedgerError::NoTrades`] — в окне нет сделок по тикеру
    pub fn volume_weighted_stock_price_within(
        &self,
        symbol: &str,
        now: u64,
        window_minutes: u64,
    ) -> Result<f64, LedgerError> {
        let symbol = &self.stock(symbol)?.symbol;
        let from = window_start(now, window_minutes);

        let trades = self.trades.lock()?;
        let in_window = trades.iter().filter(|trade| {
            &trade.symbol == symbol && (from..=now).contains(&trade.timestamp)
        });

        Trade::volume_weighted_price(in_window).ok_or_else(|| {
            LedgerError::no_trades(format!(
                "{symbol}: нет сделок за {window_minutes} мин. до {now}"
            ))
        })
    }

    /// Индекс GBCE All Share: среднее геометрическое средневзвешенных цен
    /// по всем акциям, имеющим сделки в окне [`DEFAULT_WINDOW_MINUTES`].
    pub fn all_share_index(&self, now: u64) -> Result<f64, LedgerError> {
        self.all_share_index_over(now, Some(DEFAULT_WINDOW_MINUTES))
    }

    /// Индекс GBCE All Share для произвольного окна.
    ///
    /// `window_minutes = None` означает все сделки с меткой не позже `now`.
    /// Акции без сделок в окне не входят ни в произведение, ни в число `n`.
    ///
    /// ## Ошибки
    ///
    /// [`LedgerError::NoTrades`], если ни у одной акции нет сделок в окне.
    pub fn all_share_index_over(
        &self,
        now: u64,
        window_minutes: Option<u64>,
    ) -> Result<f64, LedgerError> {
        let from = window_minutes.map_or(0, |window| window_start(now, window));

        let trades = self.trades.lock()?;
        let mut by_symbol: BTreeMap<&str, Vec<&Trade>> = BTreeMap::new();
        for trade in trades
            .iter()
            .filter(|trade| (from..=now).contains(&trade.timestamp))
        {
            by_symbol.entry(trade.symbol.as_str()).or_default().push(trade);
        }

        let prices: Vec<f64> = by_symbol
            .values()
            .filter_map(|group| Trade::volume_weighted_price(group.iter().copied()))
            .collect();

        if prices.is_empty() {
            return Err(LedgerError::no_trades(format!(
                "нет сделок для расчёта индекса на {now}"
            )));
        }

        debug!("Индекс по {} акциям: {:?}", prices.len(), by_symbol.keys());

        Ok(geometric_mean(&prices))
    }
}

impl Default for StockLedger {
    fn default() -> Self {
        Self::with_sample_stocks()
    }
}

/// Среднее геометрическое непустого набора положительных чисел.
fn geometric_mean(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let product: f64 = values.iter().product();
    if product.is_finite() && product > 0.0 {
        product.powf(1.0 / n)
    } else {
        // Переполнение или потеря точности произведения: считаем через логарифмы.
        (values.iter().map(|v| v.ln()).sum::<f64>() / n).exp()
    }
}
