//! # sigbt: backtest BUY/SELL/HOLD signal series
//!
//! **sigbt** replays a per-bar trading signal series against daily OHLC data and
//! turns it into discrete trade executions with realistic timing: a signal observed
//! on one bar's close is filled at the **next** bar's price, one open position at a
//! time, capital compounding trade over trade.
//!
//! ## Why sigbt?
//! - **Next-bar execution**: no look-ahead — decisions on bar `i` fill on bar `i + 1`.
//! - **Degrade, never abort**: thin data, missing prices and malformed signals all
//!   collapse to well-defined empty results instead of errors.
//! - **Multi-ticker batches**: run a whole watchlist over a trailing window, with
//!   one bad ticker never blocking the rest.
//! - **Signal-source agnostic**: feed it rule-based signals, ML predictions or
//!   hand-labelled series — anything that maps to BUY/SELL/HOLD per bar.
//!
//! ## Core Components
//! | Component    | Description                                                                  |
//! |--------------|------------------------------------------------------------------------------|
//! | **`Bar`**    | One time-stamped observation: optional Open/Close plus a `Signal`.           |
//! | **`Signal`** | Closed BUY/SELL/HOLD enumeration with tolerant normalization at the boundary.|
//! | **`Trade`**  | An entry, and later exactly one exit, with quantity and realized P&L.        |
//! | **`Ledger`** | Per-ticker capital, replaced by mark-to-market value on every close.         |
//! | **`Backtest`** | The engine that walks the series and books trades.                         |
//! | **`Summary`** | Final capital, trade count, wins, win ratio, total P&L, return %.           |
//! | **`backtest_all`** | Per-ticker orchestration over a trailing window of months.             |
//!
//! ## Getting Started
//! ```rust
//! use sigbt::prelude::*;
//! use chrono::{TimeZone, Utc};
//!
//! fn main() -> Result<()> {
//!     let day = |d| Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap();
//!     let bars = vec![
//!         Bar::from((day(1), 10.0, 10.0, Signal::Buy)),
//!         Bar::from((day(2), 11.0, 12.0, Signal::Sell)),
//!         Bar::from((day(3), 13.0, 14.0, Signal::Hold)),
//!         Bar::from((day(4), 15.0, 15.0, Signal::Hold)),
//!     ];
//!
//!     let mut bt = Backtest::new(bars, 1_000.0)?;
//!     bt.run()?;
//!
//!     // Entry at day 2 open (11.0), exit at day 3 open (13.0).
//!     let summary = Summary::from(&bt);
//!     println!("{summary}");
//!     assert_eq!(summary.total_trades(), 1);
//!     Ok(())
//! }
//! ```
//!
//! ### Output:
//! ```bash
//! === Backtest Summary ===
//! Final Capital: 1181.82
//! Total Trades: 1
//! Wins: 1
//! Win Ratio: 100.00%
//! Total P&L: 181.82
//! Return: 18.18%
//! ```
//!
//! ## Integrations
//! | Crate          | Purpose                                                        |
//! |----------------|----------------------------------------------------------------|
//! | [`ta`](https://crates.io/crates/ta) | Generate signals from 100+ technical indicators (see `demos/`). |
//! | [`rayon`](https://crates.io/crates/rayon) | Parallel multi-ticker batches (`parallel` feature).   |
//! | [`serde`](https://crates.io/crates/serde) | Serialize trades and summaries for reporting (`serde` feature). |
//!
//! ## Error Handling
//! Only genuinely exceptional conditions are errors: a non-positive starting
//! capital, closing an already-closed trade, I/O while loading bar files. Thin
//! series, unpriceable bars and unknown signal spellings are **not** errors —
//! they degrade to HOLD, a skipped fill or a zero-trade summary.
//!
//! ## License
//! MIT
#![warn(missing_docs)]

pub mod batch;
pub mod engine;
pub mod errors;
pub mod metrics;
mod utils;

#[cfg(feature = "serde")]
pub use utils::read_bars_from_file;

/// Re-exports of commonly used types and traits for convenience.
pub mod prelude {
    pub use super::*;
    pub use crate::batch::*;
    pub use crate::engine::*;
    pub use crate::errors::*;
    pub use crate::metrics::*;
}

use std::ops::{Div, Mul, Sub};

/// Trait for percentage math on account values.
///
/// Provides the two operations summaries need: the percentage change
/// between a starting and an ending value, and rounding to two decimals
/// the way reported ratios are displayed.
pub trait PercentCalculus<Rhs = Self> {
    /// Calculates the percentage change from `self` to `new`.
    ///
    /// ### Arguments
    /// * `new` - The new value to compare with.
    ///
    /// ### Returns
    /// The change in percent (e.g., 100.0 → 110.0 gives 10.0).
    fn change(self, new: Rhs) -> Self;

    /// Rounds the value to two decimal places.
    fn round2(self) -> Self;
}

impl PercentCalculus for f64 {
    fn change(self, new: Self) -> Self {
        new.sub(self).div(self).mul(100.0)
    }

    fn round2(self) -> Self {
        (self * 100.0).round() / 100.0
    }
}

#[cfg(test)]
mod percent {
    use super::*;

    #[test]
    fn change() {
        assert_eq!(10.0, 100.0.change(110.0))
    }

    #[test]
    fn change_negative() {
        assert_eq!(-25.0, 100.0.change(75.0))
    }

    #[test]
    fn round2() {
        assert_eq!(18.18, (200.0f64 / 11.0).round2())
    }

    #[test]
    fn round2_half_up() {
        assert_eq!(0.13, 0.125f64.round2())
    }
}
