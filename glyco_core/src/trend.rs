//! Day-level glucose trend.
//!
//! The rate is taken between the first and last raw sample of the day, not a
//! short-term local slope.

use crate::{GlucoseSample, Trend, TrendReading};

/// Estimate the trend from chronologically sorted raw samples.
///
/// Returns `None` with fewer than two samples, or when first and last share
/// an instant.
pub fn estimate_trend(samples: &[GlucoseSample]) -> Option<TrendReading> {
    let (first, last) = match samples {
        [first, .., last] => (first, last),
        _ => return None,
    };

    let minutes = (last.at - first.at).num_milliseconds() as f64 / 60_000.0;
    if minutes <= 0.0 {
        return None;
    }

    let rate = (last.value - first.value) / minutes;
    Some(TrendReading {
        trend: band(rate),
        rate_per_minute: rate,
    })
}

/// Map a per-minute rate onto the five trend bands
pub fn band(rate: f64) -> Trend {
    if rate > 2.0 {
        Trend::SharplyRising
    } else if rate > 1.0 {
        Trend::Rising
    } else if rate >= -1.0 {
        Trend::Stable
    } else if rate >= -2.0 {
        Trend::Falling
    } else {
        Trend::SharplyFalling
    }
}
