//! Core simulation components.
//!
//! This module provides the fundamental types for replaying a signal series:
//! - `Bar`: one time-stamped Open/Close observation with its `Signal`.
//! - `Signal`: the closed BUY/SELL/HOLD enumeration.
//! - `Trade`: entry/exit records produced by the engine.
//! - `Ledger`: compounding capital for one ticker.
//! - `Backtest`: the engine itself.

mod bar;
mod ledger;
mod signal;
mod trade;

use chrono::{DateTime, Utc};

use crate::errors::{Error, Result};

pub use bar::*;
pub use ledger::*;
pub use signal::*;
pub use trade::*;

#[cfg(test)]
mod bt;

/// Replays one ticker's signal series into a sequence of trades.
///
/// Execution discipline:
/// - A signal on bar `i` is filled at bar `i + 1` — the Open if present,
///   otherwise the Close, otherwise the decision is dropped.
/// - BUY is accepted only while flat and sizes the whole current capital;
///   SELL is accepted only in position. Everything else is a no-op, so the
///   engine never stacks positions or sells short.
/// - A position still open when the series ends is force-closed at the last
///   bar's Close (or Open); with neither price the trade stays open and is
///   excluded from statistics.
///
/// Fewer than two bars is not an error: `run` books no trades and leaves
/// the capital untouched.
#[derive(Debug, Clone)]
pub struct Backtest {
    bars: Vec<Bar>,
    ledger: Ledger,
    trades: Vec<Trade>,
    position: Option<Position>,
}

impl std::ops::Deref for Backtest {
    type Target = Ledger;

    fn deref(&self) -> &Self::Target {
        &self.ledger
    }
}

impl Backtest {
    /// Creates a new backtest over `bars` with the given starting capital.
    ///
    /// The series is sorted ascending by timestamp; callers may pass
    /// unsorted data. The input is never mutated afterwards.
    ///
    /// ### Returns
    /// The new backtest instance, or an error when `initial_capital` is not positive.
    pub fn new(mut bars: Vec<Bar>, initial_capital: f64) -> Result<Self> {
        bars.sort_by_key(|b| b.timestamp());

        Ok(Self {
            bars,
            trades: Vec::new(),
            position: None,
            ledger: Ledger::new(initial_capital)?,
        })
    }

    /// Returns an iterator over the bars, ascending by timestamp.
    pub fn bars(&self) -> std::slice::Iter<'_, Bar> {
        self.bars.iter()
    }

    /// Returns the booked trades in entry order, including a still-open tail trade.
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Returns the open position, if the engine is currently in one.
    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    /// Runs the whole simulation.
    ///
    /// Walks every decision bar, books entries and exits, and finally
    /// force-closes a leftover position at the last available price.
    pub fn run(&mut self) -> Result<()> {
        if self.bars.len() < 2 {
            return Ok(());
        }

        for i in 0..self.bars.len() - 1 {
            let signal = self.bars[i].signal();

            // no price, no fill: the decision is dropped, not an error
            let Some(price) = self.bars[i + 1].execution_price() else {
                continue;
            };
            let date = self.bars[i + 1].timestamp();

            match signal {
                Signal::Buy if self.position.is_none() => self.enter(date, price),
                Signal::Sell if self.position.is_some() => self.exit(date, price)?,
                _ => {}
            }
        }

        self.force_close()
    }

    /// Opens a position sized against the whole current capital.
    fn enter(&mut self, date: DateTime<Utc>, price: f64) {
        let quantity = if price > 0.0 { self.ledger.capital() / price } else { 0.0 };
        let position = Position::from((price, quantity));
        self.trades.push(Trade::from((date, &position)));
        self.position = Some(position);
    }

    /// Closes the open position: fills the exit on the most recent trade and
    /// replaces capital with `quantity × exit_price`.
    fn exit(&mut self, date: DateTime<Utc>, price: f64) -> Result<()> {
        let position = self
            .position
            .take()
            .ok_or_else(|| Error::Unreachable("exit without an open position".into()))?;
        let trade = self
            .trades
            .last_mut()
            .ok_or_else(|| Error::Unreachable("open position without a trade record".into()))?;

        trade.close(date, price)?;
        self.ledger.settle(position.quantity(), price);
        Ok(())
    }

    /// Liquidates a position left open at the end of the series.
    ///
    /// Uses the last bar's Close, then its Open. With neither available the
    /// trade is left open rather than closed at a synthetic price.
    fn force_close(&mut self) -> Result<()> {
        if self.position.is_none() {
            return Ok(());
        }

        let (date, price) = match self.bars.last() {
            Some(last) => (last.timestamp(), last.liquidation_price()),
            None => return Err(Error::Unreachable("position open on an empty series".into())),
        };

        match price {
            Some(price) => self.exit(date, price),
            None => {
                self.position = None;
                Ok(())
            }
        }
    }

    /// Resets the backtest to its initial state, keeping the bars.
    pub fn reset(&mut self) {
        self.ledger.reset();
        self.trades = Vec::new();
        self.position = None;
    }
}
