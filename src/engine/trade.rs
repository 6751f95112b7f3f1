use chrono::{DateTime, Utc};

use crate::errors::{Error, Result};
use crate::utils::random_id;

/// Ephemeral state of a holding while the simulation is in position.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    entry_price: f64,
    quantity: f64,
}

impl Position {
    /// Returns the price the position was opened at.
    pub fn entry_price(&self) -> f64 {
        self.entry_price
    }

    /// Returns the held quantity.
    pub fn quantity(&self) -> f64 {
        self.quantity
    }
}

impl From<(f64, f64)> for Position {
    fn from((entry_price, quantity): (f64, f64)) -> Self {
        Self { entry_price, quantity }
    }
}

/// Exit side of a closed trade. All three fields appear together or not at all.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exit {
    date: DateTime<Utc>,
    price: f64,
    pnl: f64,
}

impl Exit {
    /// Returns the exit date.
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// Returns the exit price.
    pub fn price(&self) -> f64 {
        self.price
    }

    /// Returns the realized profit/loss.
    pub fn pnl(&self) -> f64 {
        self.pnl
    }
}

/// A single round trip: created open on an accepted BUY, closed exactly once
/// on an accepted SELL or an end-of-series liquidation.
///
/// A trade whose series ended without a usable exit price stays open forever;
/// it is kept in the trade list but never counts toward summary statistics.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone)]
pub struct Trade {
    id: u32,
    entry_date: DateTime<Utc>,
    entry_price: f64,
    quantity: f64,
    exit: Option<Exit>,
}

impl PartialEq for Trade {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl From<(DateTime<Utc>, &Position)> for Trade {
    fn from((entry_date, position): (DateTime<Utc>, &Position)) -> Self {
        Self {
            id: random_id(),
            entry_date,
            entry_price: position.entry_price(),
            quantity: position.quantity(),
            exit: None,
        }
    }
}

impl Trade {
    /// Returns the trade's random identity.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Returns the entry date.
    pub fn entry_date(&self) -> DateTime<Utc> {
        self.entry_date
    }

    /// Returns the entry price.
    pub fn entry_price(&self) -> f64 {
        self.entry_price
    }

    /// Returns the quantity bought at entry.
    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    /// Returns the exit record, if the trade is closed.
    pub fn exit(&self) -> Option<&Exit> {
        self.exit.as_ref()
    }

    /// Returns the realized P&L, if the trade is closed.
    pub fn pnl(&self) -> Option<f64> {
        self.exit.map(|e| e.pnl)
    }

    /// Returns true once the exit is recorded.
    pub fn is_closed(&self) -> bool {
        self.exit.is_some()
    }

    /// Records the exit. A trade closes exactly once; a second close is an error.
    pub(crate) fn close(&mut self, date: DateTime<Utc>, price: f64) -> Result<()> {
        if self.exit.is_some() {
            return Err(Error::TradeClosed(self.id));
        }
        self.exit = Some(Exit {
            date,
            price,
            pnl: (price - self.entry_price) * self.quantity,
        });
        Ok(())
    }
}

#[cfg(test)]
fn open_trade(entry_price: f64, quantity: f64) -> Trade {
    let position = Position::from((entry_price, quantity));
    Trade::from((DateTime::default(), &position))
}

#[cfg(test)]
#[test]
fn trade_opens_without_exit_fields() {
    let trade = open_trade(11.0, 90.0);
    assert!(!trade.is_closed());
    assert!(trade.exit().is_none());
    assert!(trade.pnl().is_none());
    assert_eq!(trade.entry_price(), 11.0);
    assert_eq!(trade.quantity(), 90.0);
}

#[cfg(test)]
#[test]
fn close_sets_all_exit_fields_at_once() {
    let mut trade = open_trade(11.0, 90.0);
    trade.close(DateTime::default(), 13.0).unwrap();
    let exit = trade.exit().unwrap();
    assert_eq!(exit.price(), 13.0);
    assert_eq!(exit.pnl(), (13.0 - 11.0) * 90.0);
    assert_eq!(trade.pnl(), Some(180.0));
}

#[cfg(test)]
#[test]
fn close_twice_is_rejected() {
    let mut trade = open_trade(11.0, 90.0);
    trade.close(DateTime::default(), 13.0).unwrap();
    let result = trade.close(DateTime::default(), 14.0);
    assert!(matches!(result, Err(Error::TradeClosed(_))));
    // first exit untouched
    assert_eq!(trade.exit().unwrap().price(), 13.0);
}

#[cfg(test)]
#[test]
fn trade_equality_is_by_id() {
    let trade1 = open_trade(11.0, 90.0);
    let trade2 = open_trade(11.0, 90.0);
    assert_ne!(trade1, trade2);
    assert_eq!(trade1, trade1.clone());
}
