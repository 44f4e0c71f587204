//! Конфигурация приложения.

use std::ops::RangeInclusive;

/// Название директории для log-файлов.
pub const LOG_FOLDER: &str = "log";

/// Название каталога с файлами данных (акции, сделки).
pub const DATA_FOLDER: &str = "data";

/// Первый код завершения приложения при ошибках реестра (1 и 2 занимает
/// `clap`).
pub const FIRST_EXIT_CODE: u8 = 3;

/// Допустимая длина окна расчёта, в минутах (не более суток).
pub const WINDOW_MINUTES_ALLOWED: RangeInclusive<u64> = 1..=1440;

/// Количество сделок, генерируемых командой `demo` по умолчанию.
pub const DEMO_TRADES_COUNT: usize = 20;

/// Параметры генерации демонстрационных сделок.
pub struct DemoSettings {
    /// Максимальное отклонение новой цены от предыдущей (доля).
    pub price_swing: f64,
    /// Минимально допустимая цена.
    pub min_price: f64,
    /// Диапазон количества акций в одной сделке.
    pub units_per_trade: (u32, u32),
    /// Вероятность того, что сделка будет продажей.
    pub probability_sell: f64,
    /// Насколько раньше `now` может стоять метка сделки, в секундах.
    pub max_age_secs: u64,
}

/// Настройки генератора по умолчанию.
pub const DEMO_SETTINGS: DemoSettings = DemoSettings {
    price_swing: 0.10,
    min_price: 0.01,
    units_per_trade: (1, 5_000),
    probability_sell: 0.5,
    max_age_secs: 300,
};
