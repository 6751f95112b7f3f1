use chrono::{DateTime, Utc};

use super::Signal;

/// One time-stamped observation of a signal series.
///
/// Open and Close are optional: daily feeds routinely carry gaps, and a
/// non-finite price is treated the same as an absent one. The engine never
/// errors on a missing price — it just cannot fill on that bar.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    timestamp: DateTime<Utc>,
    open: Option<f64>,
    close: Option<f64>,
    signal: Signal,
}

impl Bar {
    /// Creates a bar, filtering non-finite prices down to `None`.
    pub fn new(timestamp: DateTime<Utc>, open: Option<f64>, close: Option<f64>, signal: Signal) -> Self {
        Self {
            timestamp,
            open: open.filter(|p| p.is_finite()),
            close: close.filter(|p| p.is_finite()),
            signal,
        }
    }

    /// Returns the bar's timestamp.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the Open, if present.
    pub fn open(&self) -> Option<f64> {
        self.open
    }

    /// Returns the Close, if present.
    pub fn close(&self) -> Option<f64> {
        self.close
    }

    /// Returns the bar's signal.
    pub fn signal(&self) -> Signal {
        self.signal
    }

    /// Price a fill on this bar: prefer the Open, fall back to the Close.
    pub(crate) fn execution_price(&self) -> Option<f64> {
        self.open.or(self.close)
    }

    /// Price a forced close on this bar: prefer the Close, fall back to the Open.
    pub(crate) fn liquidation_price(&self) -> Option<f64> {
        self.close.or(self.open)
    }
}

impl From<(DateTime<Utc>, f64, f64, Signal)> for Bar {
    fn from((timestamp, open, close, signal): (DateTime<Utc>, f64, f64, Signal)) -> Self {
        Self::new(timestamp, Some(open), Some(close), signal)
    }
}

#[cfg(test)]
#[test]
fn nan_price_becomes_none() {
    let bar = Bar::new(DateTime::default(), Some(f64::NAN), Some(f64::INFINITY), Signal::Hold);
    assert_eq!(bar.open(), None);
    assert_eq!(bar.close(), None);
    assert_eq!(bar.execution_price(), None);
    assert_eq!(bar.liquidation_price(), None);
}

#[cfg(test)]
#[test]
fn execution_prefers_open_liquidation_prefers_close() {
    let bar: Bar = (DateTime::default(), 10.0, 12.0, Signal::Hold).into();
    assert_eq!(bar.execution_price(), Some(10.0));
    assert_eq!(bar.liquidation_price(), Some(12.0));

    let open_only = Bar::new(DateTime::default(), Some(10.0), None, Signal::Hold);
    assert_eq!(open_only.execution_price(), Some(10.0));
    assert_eq!(open_only.liquidation_price(), Some(10.0));

    let close_only = Bar::new(DateTime::default(), None, Some(12.0), Signal::Hold);
    assert_eq!(close_only.execution_price(), Some(12.0));
    assert_eq!(close_only.liquidation_price(), Some(12.0));
}
