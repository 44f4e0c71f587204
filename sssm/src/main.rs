//! Super Simple Stock Market. Консольное приложение для расчёта показателей
//! акций биржи GBCE: дивидендной доходности, P/E, средневзвешенной цены
//! и индекса All Share.

#![warn(missing_docs)]

use log::{error, info};

mod cli;
mod commands;
mod config;
mod generator;

use cli::{ExitCode, parse_cli_args};
use commons::init_simple_logger;
use commons::utils::get_workspace_root;
use config::LOG_FOLDER;

fn main() -> std::process::ExitCode {
    init_logger();

    let set = parse_cli_args();
    info!("SSSM запущен");

    match commands::run(&set) {
        Ok(output) => {
            println!("{output}");
            std::process::ExitCode::SUCCESS
        }
        Err(err) => {
            let code = ExitCode::from_error(&err);
            error!("Ошибка: {} (код {})", err, code.value());
            eprintln!("Ошибка: {}", err);
            std::process::ExitCode::from(code.value())
        }
    }
}

/// Инициализировать логгер приложения.
///
/// Используется метод [`init_simple_logger`] из крейта [`commons`]. Без
/// логгера приложение продолжает работу.
fn init_logger() {
    let log_folder = get_workspace_root().join(LOG_FOLDER);
    let app_name = env!("CARGO_PKG_NAME");
    if let Err(err) = init_simple_logger(app_name, log_folder) {
        eprintln!("Логирование недоступно: {err}");
    }
}
