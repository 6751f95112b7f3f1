use std::fmt;

/// Per-bar directional recommendation.
///
/// This is the only signal representation the engine ever sees. Upstream
/// feeds carry signals as integers (`1`/`-1`/`0`), strings (`"BUY"`, `"B"`,
/// `"SELL"`, `"S"`, `"1"`, `"-1"`) or nothing at all; every representation
/// is normalized through the conversions below exactly once, at the data
/// boundary. Anything unrecognized or missing is `Hold`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Signal {
    /// Open a position on the next bar, if flat.
    Buy,
    /// Close the open position on the next bar, if any.
    Sell,
    /// Do nothing.
    #[default]
    Hold,
}

impl From<i64> for Signal {
    fn from(value: i64) -> Self {
        match value {
            1 => Self::Buy,
            -1 => Self::Sell,
            _ => Self::Hold,
        }
    }
}

impl From<f64> for Signal {
    fn from(value: f64) -> Self {
        if !value.is_finite() {
            return Self::Hold;
        }
        Self::from(value as i64)
    }
}

impl From<&str> for Signal {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "BUY" | "B" | "1" => Self::Buy,
            "SELL" | "S" | "-1" => Self::Sell,
            _ => Self::Hold,
        }
    }
}

impl<T> From<Option<T>> for Signal
where
    Signal: From<T>,
{
    fn from(value: Option<T>) -> Self {
        value.map(Signal::from).unwrap_or_default()
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
            Self::Hold => write!(f, "HOLD"),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Signal {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Signal {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct SignalVisitor;

        impl<'de> serde::de::Visitor<'de> for SignalVisitor {
            type Value = Signal;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a signal as integer, float, string or null")
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> std::result::Result<Signal, E> {
                Ok(Signal::from(v))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> std::result::Result<Signal, E> {
                Ok(Signal::from(v as i64))
            }

            fn visit_f64<E: serde::de::Error>(self, v: f64) -> std::result::Result<Signal, E> {
                Ok(Signal::from(v))
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> std::result::Result<Signal, E> {
                Ok(Signal::from(v))
            }

            fn visit_unit<E: serde::de::Error>(self) -> std::result::Result<Signal, E> {
                Ok(Signal::Hold)
            }

            fn visit_none<E: serde::de::Error>(self) -> std::result::Result<Signal, E> {
                Ok(Signal::Hold)
            }

            fn visit_some<D2: serde::Deserializer<'de>>(self, d: D2) -> std::result::Result<Signal, D2::Error> {
                d.deserialize_any(SignalVisitor)
            }
        }

        deserializer.deserialize_any(SignalVisitor)
    }
}

#[cfg(test)]
#[test]
fn normalize_numeric() {
    assert_eq!(Signal::from(1i64), Signal::Buy);
    assert_eq!(Signal::from(-1i64), Signal::Sell);
    assert_eq!(Signal::from(0i64), Signal::Hold);
    assert_eq!(Signal::from(2i64), Signal::Hold);
    assert_eq!(Signal::from(1.0), Signal::Buy);
    assert_eq!(Signal::from(-1.0), Signal::Sell);
    assert_eq!(Signal::from(f64::NAN), Signal::Hold);
}

#[cfg(test)]
#[test]
fn normalize_strings() {
    assert_eq!(Signal::from("BUY"), Signal::Buy);
    assert_eq!(Signal::from(" buy "), Signal::Buy);
    assert_eq!(Signal::from("B"), Signal::Buy);
    assert_eq!(Signal::from("1"), Signal::Buy);
    assert_eq!(Signal::from("SELL"), Signal::Sell);
    assert_eq!(Signal::from("s"), Signal::Sell);
    assert_eq!(Signal::from("-1"), Signal::Sell);
    assert_eq!(Signal::from("HOLD"), Signal::Hold);
    assert_eq!(Signal::from("exit"), Signal::Hold);
    assert_eq!(Signal::from(""), Signal::Hold);
}

#[cfg(test)]
#[test]
fn normalize_missing() {
    assert_eq!(Signal::from(None::<i64>), Signal::Hold);
    assert_eq!(Signal::from(Some("SELL")), Signal::Sell);
}

#[cfg(all(test, feature = "serde"))]
#[test]
fn deserialize_mixed_representations() {
    let signals: Vec<Signal> = serde_json::from_str(r#"[1, -1, 0, "BUY", "s", null, 1.0, "junk"]"#).unwrap();
    assert_eq!(
        signals,
        vec![
            Signal::Buy,
            Signal::Sell,
            Signal::Hold,
            Signal::Buy,
            Signal::Sell,
            Signal::Hold,
            Signal::Buy,
            Signal::Hold,
        ]
    );
}
