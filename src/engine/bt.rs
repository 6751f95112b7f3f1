use super::*;
use crate::metrics::Summary;

use chrono::TimeZone;

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
}

fn run(bars: Vec<Bar>, capital: f64) -> Backtest {
    let mut bt = Backtest::new(bars, capital).unwrap();
    bt.run().unwrap();
    bt
}

#[test]
fn worked_example_round_trip() {
    // BUY decided on d1 fills at d2's open, SELL decided on d3 fills at d4's open
    let bars = vec![
        Bar::from((day(1), 10.0, 10.0, Signal::Buy)),
        Bar::from((day(2), 11.0, 12.0, Signal::Hold)),
        Bar::from((day(3), 13.0, 14.0, Signal::Sell)),
        Bar::from((day(4), 15.0, 15.0, Signal::Hold)),
    ];
    let bt = run(bars, 1_000.0);
    let trades = bt.trades();
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].entry_date(), day(2));
    assert_eq!(trades[0].entry_price(), 11.0);
    assert_eq!(trades[0].exit().unwrap().date(), day(4));
    assert_eq!(trades[0].exit().unwrap().price(), 15.0);
}

#[test]
fn capital_compounds_at_the_exit_price() {
    // Entry d1 open = 11 (qty = 1000/11), exit d2 open = 13.
    let bars = vec![
        Bar::from((day(1), 10.0, 10.0, Signal::Buy)),
        Bar::from((day(2), 11.0, 12.0, Signal::Sell)),
        Bar::from((day(3), 13.0, 14.0, Signal::Hold)),
        Bar::from((day(4), 15.0, 15.0, Signal::Hold)),
    ];
    let bt = run(bars, 1_000.0);

    let quantity = 1_000.0 / 11.0;
    let trade = &bt.trades()[0];
    assert_eq!(trade.entry_price(), 11.0);
    assert_eq!(trade.quantity(), quantity);
    assert_eq!(trade.exit().unwrap().price(), 13.0);
    assert_eq!(trade.pnl(), Some((13.0 - 11.0) * quantity));

    // capital is replaced by quantity × exit price, not summed
    assert_eq!(bt.capital(), quantity * 13.0);

    let summary = Summary::from(&bt);
    assert_eq!(summary.return_pct(), 18.18);
    assert_eq!(summary.win_ratio(), 100.0);
}

#[test]
fn entry_never_fills_on_the_decision_bar() {
    let bars = vec![
        Bar::from((day(1), 10.0, 10.0, Signal::Buy)),
        Bar::from((day(2), 42.0, 43.0, Signal::Hold)),
        Bar::from((day(3), 44.0, 45.0, Signal::Hold)),
    ];
    let bt = run(bars, 1_000.0);
    let trade = &bt.trades()[0];
    assert_ne!(trade.entry_price(), 10.0);
    assert_eq!(trade.entry_price(), 42.0);
}

#[test]
fn buy_in_position_is_a_no_op() {
    let bars = vec![
        Bar::from((day(1), 10.0, 10.0, Signal::Buy)),
        Bar::from((day(2), 11.0, 11.0, Signal::Buy)),
        Bar::from((day(3), 12.0, 12.0, Signal::Buy)),
        Bar::from((day(4), 13.0, 13.0, Signal::Sell)),
        Bar::from((day(5), 14.0, 14.0, Signal::Hold)),
    ];
    let bt = run(bars, 1_000.0);
    // the repeated BUYs never stack a second position
    assert_eq!(bt.trades().len(), 1);
    assert_eq!(bt.trades()[0].entry_date(), day(2));
}

#[test]
fn sell_while_flat_is_a_no_op() {
    let bars = vec![
        Bar::from((day(1), 10.0, 10.0, Signal::Sell)),
        Bar::from((day(2), 9.0, 9.0, Signal::Sell)),
        Bar::from((day(3), 8.0, 8.0, Signal::Hold)),
    ];
    let bt = run(bars, 1_000.0);
    assert!(bt.trades().is_empty());
    assert_eq!(bt.capital(), 1_000.0);
}

#[test]
fn closed_trades_never_overlap() {
    let bars = vec![
        Bar::from((day(1), 10.0, 10.0, Signal::Buy)),
        Bar::from((day(2), 11.0, 11.0, Signal::Buy)),
        Bar::from((day(3), 12.0, 12.0, Signal::Sell)),
        Bar::from((day(4), 13.0, 13.0, Signal::Buy)),
        Bar::from((day(5), 14.0, 14.0, Signal::Sell)),
        Bar::from((day(6), 15.0, 15.0, Signal::Hold)),
    ];
    let bt = run(bars, 1_000.0);
    let trades = bt.trades();
    assert_eq!(trades.len(), 2);
    for pair in trades.windows(2) {
        let exit = pair[0].exit().unwrap();
        assert!(exit.date() > pair[0].entry_date());
        assert!(exit.date() <= pair[1].entry_date());
    }
}

#[test]
fn unpriceable_execution_bar_drops_the_decision() {
    // the BUY on d1 would fill on d2, which has no usable price at all;
    // the decision is dropped, not deferred to d3
    let bars = vec![
        Bar::from((day(1), 10.0, 10.0, Signal::Buy)),
        Bar::new(day(2), None, None, Signal::Hold),
        Bar::from((day(3), 12.0, 12.0, Signal::Hold)),
        Bar::from((day(4), 13.0, 13.0, Signal::Hold)),
    ];
    let bt = run(bars, 1_000.0);
    assert!(bt.trades().is_empty());
    assert_eq!(bt.capital(), 1_000.0);
}

#[test]
fn execution_falls_back_to_close_without_open() {
    let bars = vec![
        Bar::from((day(1), 10.0, 10.0, Signal::Buy)),
        Bar::new(day(2), None, Some(11.5), Signal::Hold),
        Bar::from((day(3), 12.0, 12.0, Signal::Sell)),
        Bar::from((day(4), 13.0, 13.0, Signal::Hold)),
    ];
    let bt = run(bars, 1_000.0);
    assert_eq!(bt.trades()[0].entry_price(), 11.5);
}

#[test]
fn all_prices_missing_means_zero_trades() {
    let bars = vec![
        Bar::new(day(1), None, None, Signal::Buy),
        Bar::new(day(2), None, None, Signal::Buy),
        Bar::new(day(3), None, None, Signal::Sell),
    ];
    let bt = run(bars, 1_000.0);
    assert!(bt.trades().is_empty());
    assert_eq!(Summary::from(&bt), Summary::flat(1_000.0));
}

#[test]
fn force_close_uses_last_close() {
    let bars = vec![
        Bar::from((day(1), 10.0, 10.0, Signal::Buy)),
        Bar::from((day(2), 11.0, 11.0, Signal::Hold)),
        Bar::from((day(3), 12.0, 12.5, Signal::Hold)),
    ];
    let bt = run(bars, 1_000.0);
    let exit = bt.trades()[0].exit().unwrap();
    assert_eq!(exit.date(), day(3));
    assert_eq!(exit.price(), 12.5);
    assert!(bt.position().is_none());
}

#[test]
fn force_close_falls_back_to_last_open() {
    // last Close is NaN but Open = 20, so the liquidation falls back
    let bars = vec![
        Bar::from((day(1), 10.0, 10.0, Signal::Buy)),
        Bar::from((day(2), 11.0, 11.0, Signal::Hold)),
        Bar::new(day(3), Some(20.0), Some(f64::NAN), Signal::Hold),
    ];
    let bt = run(bars, 1_000.0);
    assert_eq!(bt.trades()[0].exit().unwrap().price(), 20.0);
}

#[test]
fn unclosable_tail_trade_stays_open() {
    let bars = vec![
        Bar::from((day(1), 10.0, 10.0, Signal::Buy)),
        Bar::from((day(2), 10.0, 10.0, Signal::Hold)),
        Bar::new(day(3), None, None, Signal::Hold),
    ];
    let bt = run(bars, 1_000.0);

    // the trade is kept, open, and excluded from every statistic
    assert_eq!(bt.trades().len(), 1);
    assert!(!bt.trades()[0].is_closed());
    assert_eq!(bt.capital(), 1_000.0);

    let summary = Summary::from(&bt);
    assert_eq!(summary.total_trades(), 0);
    assert_eq!(summary.total_pnl(), 0.0);
    assert_eq!(summary.return_pct(), 0.0);
}

#[test]
fn return_diverges_from_pnl_when_tail_unclosable() {
    // one settled winner, then a position whose series ends unpriceable:
    // Total P&L only sees the winner, Return % only sees the settled capital
    let bars = vec![
        Bar::from((day(1), 10.0, 10.0, Signal::Buy)),
        Bar::from((day(2), 10.0, 10.0, Signal::Sell)),
        Bar::from((day(3), 12.0, 12.0, Signal::Buy)),
        Bar::from((day(4), 13.0, 13.0, Signal::Hold)),
        Bar::new(day(5), None, None, Signal::Hold),
    ];
    let bt = run(bars, 1_000.0);
    let summary = Summary::from(&bt);

    assert_eq!(bt.trades().len(), 2);
    assert!(!bt.trades()[1].is_closed());
    assert_eq!(summary.total_trades(), 1);
    assert_eq!(summary.total_pnl(), 200.0);
    // capital froze at the first exit's settlement; the open position's
    // unrealized value is reflected nowhere
    assert_eq!(summary.final_capital(), 1_200.0);
    assert_eq!(summary.return_pct(), 20.0);
}

#[test]
fn non_positive_execution_price_opens_zero_quantity() {
    let bars = vec![
        Bar::from((day(1), 10.0, 10.0, Signal::Buy)),
        Bar::from((day(2), -1.0, -1.0, Signal::Hold)),
        Bar::from((day(3), 12.0, 12.0, Signal::Hold)),
    ];
    let bt = run(bars, 1_000.0);
    let trade = &bt.trades()[0];
    assert_eq!(trade.quantity(), 0.0);
    // settled at force-close: capital = 0 × 12 = 0
    assert_eq!(bt.capital(), 0.0);
}

#[test]
fn fewer_than_two_bars_is_zero_activity() {
    let bt = run(vec![Bar::from((day(1), 10.0, 10.0, Signal::Buy))], 1_000.0);
    assert!(bt.trades().is_empty());
    assert_eq!(bt.capital(), 1_000.0);

    let bt = run(Vec::new(), 1_000.0);
    assert!(bt.trades().is_empty());
    assert_eq!(Summary::from(&bt), Summary::flat(1_000.0));
}

#[test]
fn unsorted_input_is_sorted_before_simulation() {
    let mut bars = vec![
        Bar::from((day(1), 10.0, 10.0, Signal::Buy)),
        Bar::from((day(2), 11.0, 11.0, Signal::Sell)),
        Bar::from((day(3), 13.0, 13.0, Signal::Hold)),
    ];
    bars.reverse();
    let bt = run(bars, 1_000.0);
    assert_eq!(bt.trades().len(), 1);
    assert_eq!(bt.trades()[0].entry_date(), day(2));
    assert_eq!(bt.trades()[0].exit().unwrap().date(), day(3));
}

#[test]
fn reset_allows_a_clean_rerun() {
    let bars = vec![
        Bar::from((day(1), 10.0, 10.0, Signal::Buy)),
        Bar::from((day(2), 11.0, 11.0, Signal::Sell)),
        Bar::from((day(3), 13.0, 13.0, Signal::Hold)),
    ];
    let mut bt = Backtest::new(bars, 1_000.0).unwrap();
    bt.run().unwrap();
    let first_capital = bt.capital();

    bt.reset();
    assert!(bt.trades().is_empty());
    assert_eq!(bt.capital(), 1_000.0);

    bt.run().unwrap();
    assert_eq!(bt.trades().len(), 1);
    assert_eq!(bt.capital(), first_capital);
}

#[test]
fn invalid_capital_is_rejected() {
    let bars = vec![Bar::from((day(1), 10.0, 10.0, Signal::Hold))];
    assert!(matches!(Backtest::new(bars.clone(), 0.0), Err(Error::NegZeroCapital(_))));
    assert!(matches!(Backtest::new(bars, -5.0), Err(Error::NegZeroCapital(_))));
}
