//! Error types for the library.

/// Convenience alias over [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can genuinely fail in this crate.
///
/// Degradable conditions (thin series, missing prices, unknown signal
/// spellings) are deliberately not represented here.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The initial capital is not positive. Sizing a position requires a positive capital.
    #[error("Initial capital must be positive (got: {0})")]
    NegZeroCapital(f64),

    /// An exit was recorded on a trade that is already closed. Trades close exactly once.
    #[error("Trade {0} is already closed")]
    TradeClosed(u32),

    /// A SELL was booked while no trade was open. This is likely a bug:
    /// the engine only sells in position.
    #[error("Unreachable context (internal error): {0}")]
    Unreachable(String),

    /// I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error occurred.
    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
