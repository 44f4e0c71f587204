//! Обработка аргументов командной строки при запуске приложения.
//!
//! ## Пример
//!
//! ```text
//! $ sssm yield --symbol POP --price 100
//! $ sssm --trades data/trades.txt --now 1700000300 index
//! $ sssm demo --count 50
//! ```

use crate::config::{DATA_FOLDER, DEMO_TRADES_COUNT, FIRST_EXIT_CODE, WINDOW_MINUTES_ALLOWED};
use clap::{Parser, Subcommand};
use commons::errors::LedgerError;
use commons::ledger::DEFAULT_WINDOW_MINUTES;
use commons::utils::{get_timestamp, get_workspace_root};
use std::path::{Path, PathBuf};

/// Коды завершения приложения при ошибках.
///
/// Нумерация начинается с [`FIRST_EXIT_CODE`]: коды 1 и 2 заняты `clap`
/// (ошибки аргументов командной строки).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Неизвестный тикер.
    UnknownSymbol = FIRST_EXIT_CODE,
    /// Некорректные входные данные.
    InvalidInput,
    /// Деление на ноль.
    DivisionByZero,
    /// Нет сделок для расчёта.
    NoTrades,
    /// Ошибка блокировки.
    Lock,
    /// Ошибка загрузки данных.
    Fixture,
}

impl ExitCode {
    /// Все коды в порядке нумерации.
    pub const ALL: [ExitCode; 6] = [
        Self::UnknownSymbol,
        Self::InvalidInput,
        Self::DivisionByZero,
        Self::NoTrades,
        Self::Lock,
        Self::Fixture,
    ];

    /// Предоставить цифровое значение выбранного перечисления (`u8`).
    pub fn value(&self) -> u8 {
        *self as u8
    }

    /// Код завершения для ошибки реестра.
    pub fn from_error(err: &LedgerError) -> Self {
        match err {
            LedgerError::UnknownSymbol(_) => Self::UnknownSymbol,
            LedgerError::InvalidInput(_) => Self::InvalidInput,
            LedgerError::DivisionByZero(_) => Self::DivisionByZero,
            LedgerError::NoTrades(_) => Self::NoTrades,
            LedgerError::LockError(_) => Self::Lock,
            LedgerError::Fixture(_) => Self::Fixture,
        }
    }
}

#[derive(Debug, Parser)]
#[command(about = "Super Simple Stock Market. GBCE stock metrics.")]
#[command(author, version, long_about = None)]
struct CliArgs {
    /// JSON file with stock definitions (default: built-in GBCE sample set).
    /// A bare file name is also looked up in the project `data` folder.
    #[arg(short, long, required = false, value_name = "FILE")]
    stocks: Option<PathBuf>,

    /// Trades file, one `SYMBOL|TIMESTAMP|QUANTITY|buy|PRICE` per line.
    /// A bare file name is also looked up in the project `data` folder.
    #[arg(short, long, required = false, value_name = "FILE")]
    trades: Option<PathBuf>,

    /// Trailing window for the volume weighted price, in minutes.
    #[arg(short, long, required = false, default_value_t = DEFAULT_WINDOW_MINUTES, value_parser = validate_window)]
    window: u64,

    /// Reference time as UNIX seconds (default: current time).
    #[arg(short, long, required = false)]
    now: Option<u64>,

    /// Calculation to run.
    #[command(subcommand)]
    command: Commands,
}

/// Supported calculations.
#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Commands {
    /// Dividend yield of a stock at the given market price.
    Yield {
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long)]
        price: f64,
    },
    /// P/E ratio of a stock at the given market price.
    Pe {
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long)]
        price: f64,
    },
    /// Volume weighted stock price over the trailing window.
    Vwsp {
        #[arg(short, long)]
        symbol: String,
    },
    /// GBCE All Share Index over the trailing window.
    Index,
    /// All metrics for every stock. Without `--price` each stock is priced
    /// at its volume weighted price (or par value when there are no trades).
    Report {
        #[arg(short, long)]
        price: Option<f64>,
    },
    /// Record random trades, then print the report.
    Demo {
        #[arg(short, long, default_value_t = DEMO_TRADES_COUNT)]
        count: usize,
    },
}

/// Валидатор для поля `window`.
fn validate_window(s: &str) -> Result<u64, String> {
    let minutes: u64 = s.parse().map_err(|_| format!("invalid window: {s}"))?;
    if WINDOW_MINUTES_ALLOWED.contains(&minutes) {
        Ok(minutes)
    } else {
        Err(format!(
            "window {} not in range {} — {} minutes",
            s,
            WINDOW_MINUTES_ALLOWED.start(),
            WINDOW_MINUTES_ALLOWED.end()
        ))
    }
}

/// Параметры, полученные из командной строки при запуске приложения.
#[derive(Debug)]
pub struct AppSet {
    /// Файл с описанием акций (`None` — стартовый набор GBCE).
    pub stocks: Option<PathBuf>,
    /// Файл со сделками.
    pub trades: Option<PathBuf>,
    /// Окно расчёта, в минутах.
    pub window: u64,
    /// Момент времени для оконных расчётов (секунды UNIX).
    pub now: u64,
    /// Выбранная команда.
    pub command: Commands,
}

impl AppSet {
    /// Создать экземпляр на основе аргументов из командной строки.
    fn new(args: CliArgs) -> Self {
        Self {
            stocks: args.stocks.map(|p| resolve_data_file(&p)),
            trades: args.trades.map(|p| resolve_data_file(&p)),
            window: args.window,
            now: args.now.unwrap_or_else(get_timestamp),
            command: args.command,
        }
    }
}

/// Найти файл с данными: путь как есть, если файл существует, иначе тот же
/// путь внутри каталога [`DATA_FOLDER`] проекта. Если не найден нигде,
/// путь возвращается без изменений (ошибку сообщит загрузчик).
pub fn resolve_data_file(path: &Path) -> PathBuf {
    if path.exists() || path.is_absolute() {
        return path.to_path_buf();
    }
    let in_data = get_workspace_root().join(DATA_FOLDER).join(path);
    if in_data.exists() {
        in_data
    } else {
        path.to_path_buf()
    }
}

/// Получить от пользователя настройки запуска.
pub fn parse_cli_args() -> AppSet {
    AppSet::new(CliArgs::parse())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_validator_accepts_allowed() {
        let ok = WINDOW_MINUTES_ALLOWED.start().to_string();
        assert!(validate_window(&ok).is_ok());
    }

    #[test]
    fn window_validator_rejects_out_of_range() {
        assert!(validate_window("0").is_err());
        let bad = (WINDOW_MINUTES_ALLOWED.end() + 1).to_string();
        assert!(validate_window(&bad).is_err());
        assert!(validate_window("quarter").is_err());
    }

    #[test]
    fn defaults_applied() {
        let args = CliArgs::parse_from(["sssm", "index"]);
        let set = AppSet::new(args);

        assert_eq!(set.window, DEFAULT_WINDOW_MINUTES);
        assert!(set.stocks.is_none());
        assert!(set.now > 0);
        assert_eq!(set.command, Commands::Index);
    }

    #[test]
    fn yield_command_parsed() {
        let args = CliArgs::parse_from([
            "sssm", "--now", "1700000000", "-w", "5", "yield", "--symbol", "POP", "--price", "100",
        ]);
        let set = AppSet::new(args);

        assert_eq!(set.now, 1_700_000_000);
        assert_eq!(set.window, 5);
        assert_eq!(
            set.command,
            Commands::Yield {
                symbol: "POP".to_string(),
                price: 100.0
            }
        );
    }

    #[test]
    fn demo_count_default() {
        let args = CliArgs::parse_from(["sssm", "demo"]);
        assert_eq!(
            args.command,
            Commands::Demo {
                count: DEMO_TRADES_COUNT
            }
        );
    }

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [
            ExitCode::from_error(&LedgerError::unknown_symbol("X")),
            ExitCode::from_error(&LedgerError::invalid_input("x")),
            ExitCode::from_error(&LedgerError::division_by_zero("x")),
            ExitCode::from_error(&LedgerError::no_trades("x")),
            ExitCode::from_error(&LedgerError::LockError("x".into())),
            ExitCode::from_error(&LedgerError::Fixture("x".into())),
        ];
        assert_eq!(codes, ExitCode::ALL);
        for (i, code) in codes.iter().enumerate() {
            assert_eq!(code.value() as usize, FIRST_EXIT_CODE as usize + i);
        }
    }

    #[test]
    fn exit_codes_differ_from_clap_usage_errors() {
        let bad_args: [&[&str]; 4] = [
            &["sssm", "--window", "0", "index"],
            &["sssm", "--window", "quarter", "index"],
            &["sssm", "yield", "--symbol", "POP"],
            &["sssm", "unknown"],
        ];

        for args in bad_args {
            let clap_code = CliArgs::try_parse_from(args).unwrap_err().exit_code();
            assert_ne!(clap_code, 0, "{args:?}");
            for code in ExitCode::ALL {
                assert_ne!(clap_code, i32::from(code.value()), "{args:?} vs {code:?}");
            }
        }
    }

    #[test]
    fn bare_file_name_resolved_in_data_folder() {
        let resolved = resolve_data_file(Path::new("stocks.json"));
        assert_eq!(
            resolved,
            get_workspace_root().join(DATA_FOLDER).join("stocks.json")
        );
        assert!(resolved.exists());
    }

    #[test]
    fn missing_file_left_as_is() {
        let path = Path::new("no_such_trades.txt");
        assert_eq!(resolve_data_file(path), path.to_path_buf());
    }
}
