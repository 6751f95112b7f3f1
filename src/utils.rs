#[cfg(feature = "serde")]
use chrono::{DateTime, Utc};
#[cfg(feature = "serde")]
use serde::Deserialize;

// {"Date": "2024-01-15T00:00:00Z", "Open": 2870.5, "Close": 2891.0, "Signal": "BUY"}
// {"Date": "2024-01-16T00:00:00Z", "Open": null,   "Close": 2876.2, "Signal": 0}
#[cfg(feature = "serde")]
#[derive(Debug, Clone, Deserialize)]
struct RawBar {
    #[serde(alias = "Date", alias = "date")]
    timestamp: DateTime<Utc>,
    #[serde(alias = "Open", default)]
    open: Option<f64>,
    #[serde(alias = "Close", default)]
    close: Option<f64>,
    // absent column, null, int or string: all normalize through Signal
    #[serde(alias = "Signal", default)]
    signal: crate::engine::Signal,
}

#[cfg(feature = "serde")]
/// Reads a JSON signal series from `filepath` and returns its bars.
///
/// Tolerates the mixed shapes reporting pipelines emit: missing or null
/// prices, and signals as integers, strings or nothing at all.
pub fn read_bars_from_file(filepath: std::path::PathBuf) -> crate::errors::Result<Vec<crate::engine::Bar>> {
    use crate::engine::Bar;
    use crate::errors::Error;
    use std::{fs::File, io::BufReader};

    let file = File::open(filepath)?;
    let reader = BufReader::new(file);
    let raw: Vec<RawBar> = serde_json::from_reader(reader).map_err(Error::from)?;
    Ok(raw
        .into_iter()
        .map(|r| Bar::new(r.timestamp, r.open, r.close, r.signal))
        .collect())
}

/// Generates a random ID.
pub fn random_id() -> u32 {
    rand::random()
}
