//! Исполнение команд приложения над реестром.

use crate::cli::{AppSet, Commands};
use crate::generator::TradeGenerator;
use commons::errors::LedgerError;
use commons::ledger::{StockLedger, sample_stocks};
use commons::{load_stocks, load_trades};
use log::info;

/// Подготовить реестр: акции из файла или стартовый набор, затем сделки
/// из файла, если он указан.
pub fn build_ledger(set: &AppSet) -> Result<StockLedger, LedgerError> {
    let stocks = match &set.stocks {
        Some(path) => load_stocks(path)?,
        None => sample_stocks(),
    };
    let ledger = StockLedger::new(stocks)?;

    if let Some(path) = &set.trades {
        for trade in load_trades(path)? {
            ledger.record(trade)?;
        }
    }

    Ok(ledger)
}

/// Выполнить выбранную команду и вернуть текст для вывода.
pub fn run(set: &AppSet) -> Result<String, LedgerError> {
    let ledger = build_ledger(set)?;
    execute(&ledger, set)
}

/// Выполнить команду над подготовленным реестром.
pub fn execute(ledger: &StockLedger, set: &AppSet) -> Result<String, LedgerError> {
    info!("Команда: {:?} (now: {}, окно: {} мин.)", set.command, set.now, set.window);

    match &set.command {
        Commands::Yield { symbol, price } => {
            let value = ledger.dividend_yield(symbol, *price)?;
            Ok(format!("Dividend yield {} @ {}: {:.4}", symbol.to_uppercase(), price, value))
        }
        Commands::Pe { symbol, price } => {
            let value = format_pe(ledger.pe_ratio(symbol, *price))?;
            Ok(format!("P/E ratio {} @ {}: {}", symbol.to_uppercase(), price, value))
        }
        Commands::Vwsp { symbol } => {
            let value = ledger.volume_weighted_stock_price_within(symbol, set.now, set.window)?;
            Ok(format!(
                "Volume weighted price {} ({} min): {:.4}",
                symbol.to_uppercase(),
                set.window,
                value
            ))
        }
        Commands::Index => {
            let value = ledger.all_share_index_over(set.now, Some(set.window))?;
            Ok(format!("GBCE All Share Index ({} min): {:.4}", set.window, value))
        }
        Commands::Report { price } => report(ledger, set, *price),
        Commands::Demo { count } => {
            let stocks: Vec<_> = ledger
                .symbols()
                .iter()
                .map(|symbol| ledger.stock(symbol).cloned())
                .collect::<Result<_, _>>()?;
            let mut generator = TradeGenerator::new(&stocks)?;
            for _ in 0..*count {
                ledger.record(generator.next_trade(set.now))?;
            }
            info!("Демо: записано {count} сделок");
            report(ledger, set, None)
        }
    }
}

/// Таблица показателей по всем акциям и индекс.
///
/// Ошибки расчёта отдельных показателей (нулевой дивиденд, нет сделок)
/// выводятся как `n/a`; прочие ошибки прерывают отчёт.
fn report(ledger: &StockLedger, set: &AppSet, price: Option<f64>) -> Result<String, LedgerError> {
    let mut lines = vec![format!(
        "{:<6} {:<10} {:>12} {:>12} {:>10} {:>12}",
        "Symbol", "Type", "Price", "Yield", "P/E", "VWSP"
    )];

    for symbol in ledger.symbols() {
        let stock = ledger.stock(&symbol)?;
        let vwsp = optional(ledger.volume_weighted_stock_price_within(&symbol, set.now, set.window))?;
        let market_price = price.or(vwsp).unwrap_or(stock.par_value);

        lines.push(format!(
            "{:<6} {:<10} {:>12.2} {:>12.4} {:>10} {:>12}",
            stock.symbol,
            stock.kind.as_str(),
            market_price,
            ledger.dividend_yield(&symbol, market_price)?,
            format_pe(ledger.pe_ratio(&symbol, market_price))?,
            format_optional(vwsp),
        ));
    }

    let index = optional(ledger.all_share_index_over(set.now, Some(set.window)))?;
    lines.push(format!(
        "GBCE All Share Index ({} min): {}",
        set.window,
        format_optional(index)
    ));

    Ok(lines.join("\n"))
}

/// Значение с четырьмя знаками или `n/a`.
fn format_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.4}"))
}

/// P/E для вывода: деление на ноль отображается как `n/a`.
fn format_pe(result: Result<f64, LedgerError>) -> Result<String, LedgerError> {
    match result {
        Ok(value) => Ok(format!("{value:.4}")),
        Err(LedgerError::DivisionByZero(_)) => Ok("n/a".to_string()),
        Err(err) => Err(err),
    }
}

/// Превратить [`LedgerError::NoTrades`] в `None`.
fn optional(result: Result<f64, LedgerError>) -> Result<Option<f64>, LedgerError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(LedgerError::NoTrades(_)) => Ok(None),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::resolve_data_file;
    use commons::models::TradeIndicator;
    use std::path::Path;

    const NOW: u64 = 1_700_000_000;

    fn set(command: Commands) -> AppSet {
        AppSet {
            stocks: None,
            trades: None,
            window: 15,
            now: NOW,
            command,
        }
    }

    #[test]
    fn yield_output() {
        let out = run(&set(Commands::Yield {
            symbol: "gin".to_string(),
            price: 100.0,
        }))
        .unwrap();
        assert_eq!(out, "Dividend yield GIN @ 100: 0.0200");
    }

    #[test]
    fn pe_zero_dividend_is_na() {
        let out = run(&set(Commands::Pe {
            symbol: "TEA".to_string(),
            price: 100.0,
        }))
        .unwrap();
        assert!(out.ends_with("n/a"), "{out}");
    }

    #[test]
    fn unknown_symbol_is_error() {
        let result = run(&set(Commands::Yield {
            symbol: "XYZ".to_string(),
            price: 100.0,
        }));
        assert!(matches!(result, Err(LedgerError::UnknownSymbol(_))));
    }

    #[test]
    fn index_without_trades_is_error() {
        assert!(matches!(
            run(&set(Commands::Index)),
            Err(LedgerError::NoTrades(_))
        ));
    }

    #[test]
    fn vwsp_and_index_with_trades() {
        let ledger = StockLedger::with_sample_stocks();
        ledger.record_trade("POP", NOW, 10, TradeIndicator::Buy, 12.0).unwrap();

        let out = execute(
            &ledger,
            &set(Commands::Vwsp {
                symbol: "POP".to_string(),
            }),
        )
        .unwrap();
        assert_eq!(out, "Volume weighted price POP (15 min): 12.0000");

        let out = execute(&ledger, &set(Commands::Index)).unwrap();
        assert_eq!(out, "GBCE All Share Index (15 min): 12.0000");
    }

    #[test]
    fn report_lists_every_stock() {
        let ledger = StockLedger::with_sample_stocks();
        ledger.record_trade("ALE", NOW, 1, TradeIndicator::Sell, 50.0).unwrap();

        let out = execute(&ledger, &set(Commands::Report { price: None })).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 7);
        assert!(lines[1].starts_with("ALE"));
        assert!(lines[1].ends_with("50.0000"));
        assert!(lines[6].ends_with("50.0000"));
    }

    #[test]
    fn report_from_shipped_fixtures() {
        let set = AppSet {
            stocks: Some(resolve_data_file(Path::new("stocks.json"))),
            trades: Some(resolve_data_file(Path::new("trades.txt"))),
            window: 5,
            now: 1_700_000_300,
            command: Commands::Report { price: None },
        };

        let ledger = build_ledger(&set).unwrap();
        assert_eq!(ledger.symbols().len(), 5);
        assert_eq!(ledger.trade_count().unwrap(), 7);

        let out = execute(&ledger, &set).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 7);

        let tea = lines.iter().find(|l| l.starts_with("TEA")).unwrap();
        assert!(tea.contains(" n/a "), "{tea}");
        // У ALE сделка старше окна.
        let ale = lines.iter().find(|l| l.starts_with("ALE")).unwrap();
        assert!(ale.ends_with("n/a"), "{ale}");
        assert!(lines[6].ends_with("46.1520"), "{}", lines[6]);
    }

    #[test]
    fn missing_fixture_is_fixture_error() {
        let mut set = set(Commands::Index);
        set.trades = Some(Path::new("/definitely/not/here.txt").to_path_buf());
        assert!(matches!(run(&set), Err(LedgerError::Fixture(_))));
    }

    #[test]
    fn demo_records_trades() {
        let ledger = StockLedger::with_sample_stocks();
        let out = execute(&ledger, &set(Commands::Demo { count: 10 })).unwrap();

        assert_eq!(ledger.trade_count().unwrap(), 10);
        assert!(!out.ends_with("n/a"));
    }
}
