//! Summary statistics for a finished backtest.
//!
//! `Summary` is a read-only aggregate over one ticker's **closed** trades:
//! final capital, trade count, wins, win ratio, total P&L, and return %.
//! It is recomputed in full from a `Backtest`, never updated incrementally.
//!
//! Return (%) is derived from the final capital while Total P&L sums the
//! per-trade pnl, and the two can legitimately diverge: a tail trade left
//! open with no closable price keeps capital at its pre-entry value while
//! its unrealized value is reflected nowhere. This is observable behavior,
//! preserved on purpose.

use std::fmt;

use crate::PercentCalculus;
use crate::engine::Backtest;

/// Key performance figures for one ticker's backtest run.
///
/// Only closed trades count toward `total_trades`, `wins`, `win_ratio` and
/// `total_pnl`. A win is a trade with strictly positive pnl. Ratios are
/// rounded to two decimals the way they are reported downstream.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    #[cfg_attr(feature = "serde", serde(rename = "Final Capital"))]
    final_capital: f64,
    #[cfg_attr(feature = "serde", serde(rename = "Total Trades"))]
    total_trades: usize,
    #[cfg_attr(feature = "serde", serde(rename = "Wins"))]
    wins: usize,
    #[cfg_attr(feature = "serde", serde(rename = "Win Ratio (%)"))]
    win_ratio: f64,
    #[cfg_attr(feature = "serde", serde(rename = "Total P&L"))]
    total_pnl: f64,
    #[cfg_attr(feature = "serde", serde(rename = "Return (%)"))]
    return_pct: f64,
}

impl From<&Backtest> for Summary {
    fn from(bt: &Backtest) -> Self {
        let closed = bt.trades().iter().filter_map(|t| t.pnl());

        let mut total_trades = 0;
        let mut wins = 0;
        let mut total_pnl = 0.0;
        for pnl in closed {
            total_trades += 1;
            if pnl > 0.0 {
                wins += 1;
            }
            total_pnl += pnl;
        }

        let win_ratio = if total_trades > 0 {
            (wins as f64 / total_trades as f64 * 100.0).round2()
        } else {
            0.0
        };

        Self {
            final_capital: bt.capital(),
            total_trades,
            wins,
            win_ratio,
            total_pnl,
            return_pct: bt.initial_capital().change(bt.capital()).round2(),
        }
    }
}

impl Summary {
    /// Creates the zero-activity summary: no trades, capital unchanged.
    ///
    /// This is the documented result for a failed or empty ticker run.
    pub fn flat(initial_capital: f64) -> Self {
        Self {
            final_capital: initial_capital,
            total_trades: 0,
            wins: 0,
            win_ratio: 0.0,
            total_pnl: 0.0,
            return_pct: 0.0,
        }
    }

    /// Returns the capital after the last settled trade.
    pub fn final_capital(&self) -> f64 {
        self.final_capital
    }

    /// Returns the number of closed trades.
    pub fn total_trades(&self) -> usize {
        self.total_trades
    }

    /// Returns the number of closed trades with strictly positive pnl.
    pub fn wins(&self) -> usize {
        self.wins
    }

    /// Returns the win ratio in percent, rounded to two decimals.
    pub fn win_ratio(&self) -> f64 {
        self.win_ratio
    }

    /// Returns the sum of closed-trade pnl.
    pub fn total_pnl(&self) -> f64 {
        self.total_pnl
    }

    /// Returns the capital change in percent, rounded to two decimals.
    pub fn return_pct(&self) -> f64 {
        self.return_pct
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Backtest Summary ===")?;
        writeln!(f, "Final Capital: {:.2}", self.final_capital)?;
        writeln!(f, "Total Trades: {}", self.total_trades)?;
        writeln!(f, "Wins: {}", self.wins)?;
        writeln!(f, "Win Ratio: {:.2}%", self.win_ratio)?;
        writeln!(f, "Total P&L: {:.2}", self.total_pnl)?;
        write!(f, "Return: {:.2}%", self.return_pct)
    }
}

#[cfg(test)]
use crate::engine::{Bar, Signal};
#[cfg(test)]
use chrono::{DateTime, TimeZone, Utc};

#[cfg(test)]
fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
}

#[cfg(test)]
fn run(bars: Vec<Bar>, capital: f64) -> Summary {
    let mut bt = Backtest::new(bars, capital).unwrap();
    bt.run().unwrap();
    Summary::from(&bt)
}

#[cfg(test)]
#[test]
fn flat_summary() {
    let summary = Summary::flat(100_000.0);
    assert_eq!(summary.final_capital(), 100_000.0);
    assert_eq!(summary.total_trades(), 0);
    assert_eq!(summary.wins(), 0);
    assert_eq!(summary.win_ratio(), 0.0);
    assert_eq!(summary.total_pnl(), 0.0);
    assert_eq!(summary.return_pct(), 0.0);
}

#[cfg(test)]
#[test]
fn no_buy_signal_means_zero_trades() {
    let bars = vec![
        Bar::from((day(1), 10.0, 10.0, Signal::Hold)),
        Bar::from((day(2), 11.0, 11.0, Signal::Sell)),
        Bar::from((day(3), 12.0, 12.0, Signal::Hold)),
    ];
    let summary = run(bars, 1_000.0);
    assert_eq!(summary, Summary::flat(1_000.0));
}

#[cfg(test)]
#[test]
fn win_ratio_rounds_to_two_decimals() {
    // three round trips: +1, -1, +2 per unit
    let bars = vec![
        Bar::from((day(1), 10.0, 10.0, Signal::Buy)),
        Bar::from((day(2), 10.0, 10.0, Signal::Sell)),
        Bar::from((day(3), 11.0, 11.0, Signal::Buy)),
        Bar::from((day(4), 11.0, 11.0, Signal::Sell)),
        Bar::from((day(5), 10.0, 10.0, Signal::Buy)),
        Bar::from((day(6), 10.0, 10.0, Signal::Sell)),
        Bar::from((day(7), 12.0, 12.0, Signal::Hold)),
    ];
    let summary = run(bars, 1_000.0);
    assert_eq!(summary.total_trades(), 3);
    assert_eq!(summary.wins(), 2);
    // 2/3 → 66.666… reported as 66.67
    assert_eq!(summary.win_ratio(), 66.67);
}

#[cfg(test)]
#[test]
fn breakeven_trade_is_not_a_win() {
    let bars = vec![
        Bar::from((day(1), 10.0, 10.0, Signal::Buy)),
        Bar::from((day(2), 10.0, 10.0, Signal::Sell)),
        Bar::from((day(3), 10.0, 10.0, Signal::Hold)),
    ];
    let summary = run(bars, 1_000.0);
    assert_eq!(summary.total_trades(), 1);
    assert_eq!(summary.wins(), 0);
    assert_eq!(summary.win_ratio(), 0.0);
}

#[cfg(test)]
#[test]
fn wins_never_exceed_total_trades() {
    let bars = vec![
        Bar::from((day(1), 10.0, 10.0, Signal::Buy)),
        Bar::from((day(2), 11.0, 11.0, Signal::Sell)),
        Bar::from((day(3), 10.0, 10.0, Signal::Buy)),
        Bar::from((day(4), 9.0, 9.0, Signal::Sell)),
        Bar::from((day(5), 9.0, 9.0, Signal::Hold)),
    ];
    let summary = run(bars, 1_000.0);
    assert!(summary.wins() <= summary.total_trades());
}
