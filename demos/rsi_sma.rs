//! # RSI + SMA Crossover Batch
//!
//! Labels each ticker's series with the classic mean-reversion rule —
//! BUY when RSI(14) < 30 while the 20-day SMA sits above the 50-day,
//! SELL when RSI(14) > 70 while it sits below — then backtests the whole
//! watchlist over the default 6-month trailing window.
mod data;

use std::collections::HashMap;
use std::error::Error;
use std::result::Result;

use sigbt::prelude::*;
use ta::{indicators::*, *};

const RSI_WINDOW: usize = 14;
const SMA_FAST: usize = 20;
const SMA_SLOW: usize = 50;
const RSI_BUY_THRESHOLD: f64 = 30.0;
const RSI_SELL_THRESHOLD: f64 = 70.0;

fn label_signals(series: &[(chrono::DateTime<chrono::Utc>, f64, f64)]) -> Result<Vec<Bar>, Box<dyn Error>> {
    let mut rsi = RelativeStrengthIndex::new(RSI_WINDOW)?;
    let mut sma_fast = SimpleMovingAverage::new(SMA_FAST)?;
    let mut sma_slow = SimpleMovingAverage::new(SMA_SLOW)?;

    Ok(series
        .iter()
        .map(|&(timestamp, open, close)| {
            let momentum = rsi.next(close);
            let fast = sma_fast.next(close);
            let slow = sma_slow.next(close);

            let signal = if momentum < RSI_BUY_THRESHOLD && fast > slow {
                Signal::Buy
            } else if momentum > RSI_SELL_THRESHOLD && fast < slow {
                Signal::Sell
            } else {
                Signal::Hold
            };

            Bar::from((timestamp, open, close, signal))
        })
        .collect())
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let mut universe = HashMap::new();
    for (ticker, seed) in [("RELIANCE.NS", 7), ("TCS.NS", 21), ("INFY.NS", 42)] {
        let series = data::generate_sample_days(400, seed, 100.0);
        universe.insert(ticker.to_string(), label_signals(&series)?);
    }

    let report = backtest_all(universe, &BacktestConfig::default());

    for (ticker, summary) in report.summaries() {
        println!("--- {ticker} ---");
        println!("{summary}");
        println!();
    }
    Ok(())
}
