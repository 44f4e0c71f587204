use log::*;
use simplelog::{CombinedLogger, Config, WriteLogger};
use std::fs;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::path::PathBuf;

pub mod errors;
pub mod ledger;
pub mod models;
pub mod utils;

use errors::LedgerError;
use models::{Stock, Trade};

/// Загрузить набор акций из JSON-файла.
///
/// Файл содержит массив объектов с полями `symbol`, `kind`
/// (`"common"`/`"preferred"`), `last_dividend`, `fixed_dividend`
/// (необязательно) и `par_value`. Каждая акция проверяется.
///
/// ## Пример
///
/// ```no_run
/// use commons::load_stocks;
/// use commons::utils::get_workspace_root;
///
/// let path = get_workspace_root().join("data").join("stocks.json");
/// let stocks = load_stocks(&path).unwrap();
///
/// println!("Акций: {}", stocks.len());
/// ```
///
/// ## Ошибки
///
/// - [`LedgerError::Fixture`] — файл не открывается или не является JSON
/// - [`LedgerError::InvalidInput`] — атрибуты акции некорректны
pub fn load_stocks(path: &Path) -> Result<Vec<Stock>, LedgerError> {
    let file = File::open(path)
        .map_err(|e| LedgerError::Fixture(format!("не удалось открыть {:?}: {e}", path)))?;

    let stocks: Vec<Stock> = serde_json::from_reader(BufReader::new(file))?;
    for stock in &stocks {
        stock.validate()?;
    }

    info!("Загружено {} акций из {}", stocks.len(), path.display());
    Ok(stocks)
}

/// Загрузить сделки из текстового файла.
///
/// Одна сделка на строку в формате `SYMBOL|TIMESTAMP|QUANTITY|buy|PRICE`.
/// Пустые строки и строки, начинающиеся с `#`, пропускаются. Значения
/// сделок не проверяются: это делает реестр при записи.
///
/// ## Ошибки
///
/// - [`LedgerError::Fixture`] — ошибка чтения файла
/// - [`LedgerError::InvalidInput`] — строка не разбирается (с номером строки)
pub fn load_trades(path: &Path) -> Result<Vec<Trade>, LedgerError> {
    let file = File::open(path)
        .map_err(|e| LedgerError::Fixture(format!("не удалось открыть {:?}: {e}", path)))?;

    let mut trades = Vec::new();
    for (number, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let trade = line.parse::<Trade>().map_err(|err| {
            LedgerError::invalid_input(format!("{}:{}: {err}", path.display(), number + 1))
        })?;
        trades.push(trade);
    }

    info!("Загружено {} сделок из {}", trades.len(), path.display());
    Ok(trades)
}

/// Фабрика по созданию индивидуальных логгеров для приложений.
///
/// Инициализация требуется один раз при запуске приложения. Далее
/// используются стандартные макросы [`log::info`], [`log::warn`],
/// [`log::error`].
///
/// ## Args
///
/// - `app_name` — название приложения (будет использовано для имени файла)
/// - `log_dir` — путь к директории log-файлов (при отсутствии создаётся)
///
/// ## Пример
///
/// ```no_run
/// use log::*;
/// use commons::init_simple_logger;
/// use commons::utils::get_workspace_root;
///
/// let log_dir = get_workspace_root().join("log");
/// init_simple_logger("sssm", log_dir).unwrap();
///
/// info!("Реестр готов");
/// ```
///
/// ## Ошибки
///
/// [`LedgerError::Fixture`] при ошибке создания директории или log-файла,
/// либо если логгер уже инициализирован.
pub fn init_simple_logger(app_name: &str, log_dir: PathBuf) -> Result<(), LedgerError> {
    let config = Config::default();
    let log_file_path = log_dir.join(format!("{}.log", app_name));

    if !log_dir.exists() {
        fs::create_dir_all(&log_dir).map_err(|e| {
            LedgerError::Fixture(format!("не удалось создать {}: {e}", log_dir.display()))
        })?;
    }

    let log_file = File::create(&log_file_path).map_err(|e| {
        LedgerError::Fixture(format!(
            "ошибка работы с log-файлом {}: {e}",
            log_file_path.display()
        ))
    })?;

    let logger = WriteLogger::new(LevelFilter::Info, config, log_file);

    CombinedLogger::init(vec![logger])
        .map_err(|e| LedgerError::Fixture(format!("ошибка инициализации логгера: {e}")))
}
