//! Multi-ticker orchestration over a trailing window.
//!
//! `backtest_all` runs the engine independently for every ticker in a batch,
//! slicing each series to its own trailing window of calendar months before
//! simulating. Tickers are fully isolated: one bad series degrades to an
//! empty trade list and a zero-activity summary without touching the rest,
//! and every input ticker gets an entry in the output either way.
//!
//! With the `parallel` feature enabled, tickers are fanned out over a rayon
//! pool; each ticker still owns its private state and output slot.

use std::collections::HashMap;

use chrono::Months;
use tracing::{error, info, warn};

use crate::engine::{Backtest, Bar, Trade};
use crate::errors::Result;
use crate::metrics::Summary;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Configuration for a batch run.
///
/// Passed explicitly into `backtest_all`; there is no process-wide state.
#[derive(Debug, Clone)]
pub struct BacktestConfig {
    /// Starting capital allocated to each ticker.
    pub initial_capital: f64,
    /// Trailing window length in calendar months, anchored at each ticker's
    /// own last available timestamp.
    pub months: u32,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_capital: 100_000.0,
            months: 6,
        }
    }
}

/// Results of a batch run: one trade list and one summary per input ticker.
#[derive(Debug, Default)]
pub struct BatchReport {
    trades: HashMap<String, Vec<Trade>>,
    summaries: HashMap<String, Summary>,
}

impl BatchReport {
    /// Returns the trade sequences, keyed by ticker.
    pub fn trades(&self) -> &HashMap<String, Vec<Trade>> {
        &self.trades
    }

    /// Returns the summaries, keyed by ticker.
    pub fn summaries(&self) -> &HashMap<String, Summary> {
        &self.summaries
    }

    /// Consumes the report into its two mappings.
    pub fn into_parts(self) -> (HashMap<String, Vec<Trade>>, HashMap<String, Summary>) {
        (self.trades, self.summaries)
    }

    fn insert(&mut self, ticker: String, trades: Vec<Trade>, summary: Summary) {
        self.trades.insert(ticker.clone(), trades);
        self.summaries.insert(ticker, summary);
    }
}

/// Backtests every ticker in `data` over its trailing window.
///
/// A per-ticker failure is logged and substituted with an empty trade list
/// plus a zero-activity summary; it never aborts the batch.
#[cfg(not(feature = "parallel"))]
pub fn backtest_all(data: HashMap<String, Vec<Bar>>, config: &BacktestConfig) -> BatchReport {
    let mut report = BatchReport::default();
    for (ticker, bars) in data {
        let (trades, summary) = run_ticker(&ticker, bars, config);
        report.insert(ticker, trades, summary);
    }
    report
}

/// Backtests every ticker in `data` over its trailing window, in parallel.
///
/// Same contract as the sequential version: per-ticker isolation, one output
/// entry per input ticker. Tickers are chunked across the available cores.
#[cfg(feature = "parallel")]
pub fn backtest_all(data: HashMap<String, Vec<Bar>>, config: &BacktestConfig) -> BatchReport {
    let num_cpus = num_cpus::get();
    let tickers = data.into_iter().collect::<Vec<_>>();
    let chunk_size = tickers.len().div_ceil(num_cpus).max(1);

    let results = tickers
        .into_par_iter()
        .chunks(chunk_size)
        .map(|chunk| {
            chunk
                .into_iter()
                .map(|(ticker, bars)| {
                    let (trades, summary) = run_ticker(&ticker, bars, config);
                    (ticker, trades, summary)
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let mut report = BatchReport::default();
    for (ticker, trades, summary) in results.into_iter().flatten() {
        report.insert(ticker, trades, summary);
    }
    report
}

/// Runs one ticker end to end, absorbing any failure into the zero result.
fn run_ticker(ticker: &str, bars: Vec<Bar>, config: &BacktestConfig) -> (Vec<Trade>, Summary) {
    info!("Backtesting {ticker} (last {} months)...", config.months);

    if bars.is_empty() {
        warn!("No data for {ticker}");
        return (Vec::new(), Summary::flat(config.initial_capital));
    }

    let window = trailing_window(bars, config.months);
    match simulate(window, config.initial_capital) {
        Ok((trades, summary)) => {
            info!(
                "{ticker} - Final Capital: {:.2} | Return: {:.2}% | Trades: {}",
                summary.final_capital(),
                summary.return_pct(),
                summary.total_trades()
            );
            (trades, summary)
        }
        Err(e) => {
            error!("Error backtesting {ticker}: {e}");
            (Vec::new(), Summary::flat(config.initial_capital))
        }
    }
}

fn simulate(bars: Vec<Bar>, initial_capital: f64) -> Result<(Vec<Trade>, Summary)> {
    let mut bt = Backtest::new(bars, initial_capital)?;
    bt.run()?;
    let summary = Summary::from(&bt);
    Ok((bt.trades().to_vec(), summary))
}

/// Slices a series to `[last − months, last]`, inclusive of both ends.
///
/// The window is anchored at this series' own last timestamp, so tickers
/// with different date ranges get independently anchored windows. If the
/// subtraction is not representable the full series is kept.
fn trailing_window(mut bars: Vec<Bar>, months: u32) -> Vec<Bar> {
    bars.sort_by_key(|b| b.timestamp());

    let Some(last) = bars.last().map(|b| b.timestamp()) else {
        return bars;
    };
    match last.checked_sub_months(Months::new(months)) {
        Some(start) => bars.into_iter().filter(|b| b.timestamp() >= start).collect(),
        None => bars,
    }
}

#[cfg(test)]
use crate::engine::Signal;
#[cfg(test)]
use chrono::{DateTime, TimeZone, Utc};

#[cfg(test)]
fn month(y: i32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, 15, 0, 0, 0).unwrap()
}

#[cfg(test)]
fn flat_series(y: i32, signals: &[(u32, Signal)]) -> Vec<Bar> {
    signals
        .iter()
        .map(|&(m, signal)| Bar::from((month(y, m), 10.0, 10.0, signal)))
        .collect()
}

#[cfg(test)]
#[test]
fn one_output_entry_per_input_ticker() {
    use Signal::*;

    let mut data = HashMap::new();
    data.insert("GOOD.NS".to_string(), flat_series(2024, &[(1, Buy), (2, Sell), (3, Hold)]));
    data.insert("EMPTY.NS".to_string(), Vec::new());
    data.insert("THIN.NS".to_string(), flat_series(2024, &[(1, Buy)]));

    let config = BacktestConfig {
        initial_capital: 1_000.0,
        months: 12,
    };
    let report = backtest_all(data, &config);

    assert_eq!(report.trades().len(), 3);
    assert_eq!(report.summaries().len(), 3);
    assert_eq!(report.summaries()["EMPTY.NS"], Summary::flat(1_000.0));
    assert_eq!(report.summaries()["THIN.NS"], Summary::flat(1_000.0));
    assert_eq!(report.trades()["GOOD.NS"].len(), 1);
}

#[cfg(test)]
#[test]
fn bad_ticker_does_not_block_the_rest() {
    use Signal::*;

    let mut data = HashMap::new();
    data.insert("EMPTY.NS".to_string(), Vec::new());
    data.insert("GOOD.NS".to_string(), flat_series(2024, &[(1, Buy), (2, Sell), (3, Hold)]));

    let report = backtest_all(data, &BacktestConfig::default());
    assert_eq!(report.summaries()["GOOD.NS"].total_trades(), 1);
    assert!(report.trades()["EMPTY.NS"].is_empty());
}

#[cfg(test)]
#[test]
fn signals_before_the_window_are_ignored() {
    use Signal::*;

    // BUY in February falls outside a 6-month window anchored in December;
    // only the October round trip is simulated.
    let signals = [
        (1, Hold),
        (2, Buy),
        (3, Sell),
        (4, Hold),
        (5, Hold),
        (6, Hold),
        (7, Hold),
        (8, Hold),
        (9, Hold),
        (10, Buy),
        (11, Sell),
        (12, Hold),
    ];
    let mut data = HashMap::new();
    data.insert("RELIANCE.NS".to_string(), flat_series(2024, &signals));

    let config = BacktestConfig {
        initial_capital: 1_000.0,
        months: 6,
    };
    let report = backtest_all(data, &config);

    let trades = &report.trades()["RELIANCE.NS"];
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].entry_date(), month(2024, 11));
    assert_eq!(report.summaries()["RELIANCE.NS"].total_trades(), 1);
}

#[cfg(test)]
#[test]
fn windows_are_anchored_per_ticker() {
    use Signal::*;

    // OLD.NS stopped trading in June; its window is anchored there, so its
    // early-year signals are still inside it.
    let mut data = HashMap::new();
    data.insert("OLD.NS".to_string(), flat_series(2024, &[(1, Buy), (2, Sell), (3, Hold), (6, Hold)]));
    data.insert("NEW.NS".to_string(), flat_series(2024, &[(10, Buy), (11, Sell), (12, Hold)]));

    let config = BacktestConfig {
        initial_capital: 1_000.0,
        months: 6,
    };
    let report = backtest_all(data, &config);

    assert_eq!(report.summaries()["OLD.NS"].total_trades(), 1);
    assert_eq!(report.summaries()["NEW.NS"].total_trades(), 1);
}

#[cfg(test)]
#[test]
fn unsorted_input_is_sliced_after_sorting() {
    use Signal::*;

    let mut bars = flat_series(2024, &[(10, Buy), (11, Sell), (12, Hold)]);
    bars.reverse();
    let mut data = HashMap::new();
    data.insert("TCS.NS".to_string(), bars);

    let report = backtest_all(data, &BacktestConfig::default());
    assert_eq!(report.summaries()["TCS.NS"].total_trades(), 1);
}
