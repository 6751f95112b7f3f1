use crate::errors::{Error, Result};

/// Tracks one ticker's capital across sequential trades.
///
/// Capital is not accumulated by adding P&L: closing a trade **replaces** it
/// with the mark-to-market value of the position (`quantity × exit price`).
/// The next entry is then sized against the replaced amount, which is what
/// produces compounding.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone)]
pub struct Ledger {
    // Initial capital used for reset and return %
    initial_capital: f64,
    // Current capital, reassigned once per trade close
    capital: f64,
}

impl Ledger {
    /// Creates a new ledger with the given starting capital.
    /// Non-positive capital is rejected.
    pub fn new(capital: f64) -> Result<Self> {
        if capital <= 0.0 || !capital.is_finite() {
            return Err(Error::NegZeroCapital(capital));
        }

        Ok(Self {
            capital,
            initial_capital: capital,
        })
    }

    /// Returns the starting capital.
    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    /// Returns the current capital.
    pub fn capital(&self) -> f64 {
        self.capital
    }

    /// Replaces capital with the mark-to-market value of a closed position.
    pub(crate) fn settle(&mut self, quantity: f64, exit_price: f64) {
        self.capital = quantity * exit_price;
    }

    /// Resets the ledger to its starting capital.
    pub(crate) fn reset(&mut self) {
        self.capital = self.initial_capital;
    }
}

#[cfg(test)]
#[test]
fn new_ledger_valid_capital() {
    let ledger = Ledger::new(100_000.0).unwrap();
    assert_eq!(ledger.capital(), 100_000.0);
    assert_eq!(ledger.initial_capital(), 100_000.0);
}

#[cfg(test)]
#[test]
fn new_ledger_invalid_capital() {
    let result = Ledger::new(0.0);
    assert!(matches!(result, Err(Error::NegZeroCapital(_))));

    let result = Ledger::new(-10.0);
    assert!(matches!(result, Err(Error::NegZeroCapital(_))));

    let result = Ledger::new(f64::NAN);
    assert!(matches!(result, Err(Error::NegZeroCapital(_))));
}

#[cfg(test)]
#[test]
fn settle_replaces_capital() {
    let mut ledger = Ledger::new(1_000.0).unwrap();

    // qty sized at entry 11.0, closed at 13.0
    let quantity = 1_000.0 / 11.0;
    ledger.settle(quantity, 13.0);
    assert_eq!(ledger.capital(), quantity * 13.0);
    assert_eq!(ledger.initial_capital(), 1_000.0);

    // next close compounds off the replaced amount
    let quantity = ledger.capital() / 13.0;
    ledger.settle(quantity, 10.0);
    assert_eq!(ledger.capital(), quantity * 10.0);
}

#[cfg(test)]
#[test]
fn reset_ledger() {
    let mut ledger = Ledger::new(1_000.0).unwrap();
    ledger.settle(90.0, 13.0);
    ledger.reset();
    assert_eq!(ledger.capital(), 1_000.0);
}
