use chrono::{DateTime, Duration, Utc};

/// Generates a deterministic daily (timestamp, open, close) series.
pub fn generate_sample_days(days: i32, seed: i32, base_price: f64) -> Vec<(DateTime<Utc>, f64, f64)> {
    let mut timestamp = DateTime::default();
    let mut open = base_price;

    (0..days)
        .map(|i| {
            // Base price with trend (+ 0.05*i)
            let base_price = base_price + 0.05 * (i as f64);

            // Price variation using a simple trigonometric function with seed
            let variation = 5.0 * ((i as f64 * 0.3 + seed as f64).sin() * 0.5 + 0.5);

            let close = base_price + variation;
            let day = (timestamp, open, close);

            timestamp += Duration::days(1);
            open = close;
            day
        })
        .collect()
}

#[allow(dead_code)]
fn main() {}
