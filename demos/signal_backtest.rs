//! # Plain Signal Backtest
//!
//! Replays a small hand-labelled BUY/SELL/HOLD series and prints the booked
//! trades and the summary. Note the next-bar discipline: every fill lands on
//! the bar after its signal, and the open tail position is force-closed at
//! the last close.

use std::error::Error;
use std::result::Result;

use chrono::{TimeZone, Utc};
use sigbt::prelude::*;

fn main() -> Result<(), Box<dyn Error>> {
    let day = |d| Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap();

    let bars = vec![
        Bar::from((day(1), 100.0, 101.0, Signal::Hold)),
        Bar::from((day(2), 101.5, 99.0, Signal::Buy)),
        Bar::from((day(3), 99.2, 103.0, Signal::Hold)),
        // gap day: no open, fills fall back to the close
        Bar::new(day(4), None, Some(104.5), Signal::Sell),
        Bar::from((day(5), 104.0, 102.0, Signal::Hold)),
        Bar::from((day(6), 101.0, 105.0, Signal::Buy)),
        Bar::from((day(7), 105.5, 107.0, Signal::Hold)),
        Bar::from((day(8), 106.0, 108.5, Signal::Hold)),
    ];

    let mut bt = Backtest::new(bars, 100_000.0)?;
    bt.run()?;

    for trade in bt.trades() {
        match trade.exit() {
            Some(exit) => println!(
                "{} {:>8.2} -> {} {:>8.2} | qty {:.4} | pnl {:+.2}",
                trade.entry_date().format("%Y-%m-%d"),
                trade.entry_price(),
                exit.date().format("%Y-%m-%d"),
                exit.price(),
                trade.quantity(),
                exit.pnl(),
            ),
            None => println!(
                "{} {:>8.2} -> (still open) | qty {:.4}",
                trade.entry_date().format("%Y-%m-%d"),
                trade.entry_price(),
                trade.quantity(),
            ),
        }
    }

    println!();
    println!("{}", Summary::from(&bt));
    Ok(())
}
