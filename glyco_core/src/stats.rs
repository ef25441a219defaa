//! Summary statistics over a full day of raw glucose samples.

use crate::config::ZoneConfig;
use crate::GlucoseSample;
use serde::Serialize;

/// Day summary; shares are percentages of the sample count
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct DayStats {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub latest: GlucoseSample,
    pub sweet_zone_pct: f64,
    pub perfect_zone_pct: f64,
}

/// Summarize chronologically sorted samples; `None` for an empty day
pub fn summarize(samples: &[GlucoseSample], zones: &ZoneConfig) -> Option<DayStats> {
    let latest = *samples.last()?;
    let count = samples.len();

    let (sum, min, max) = samples.iter().fold(
        (0.0, f64::INFINITY, f64::NEG_INFINITY),
        |(sum, min, max), s| (sum + s.value, min.min(s.value), max.max(s.value)),
    );

    let share = |low: f64, high: f64| {
        let inside = samples
            .iter()
            .filter(|s| low <= s.value && s.value <= high)
            .count();
        inside as f64 * 100.0 / count as f64
    };

    Some(DayStats {
        count,
        mean: sum / count as f64,
        min,
        max,
        latest,
        sweet_zone_pct: share(zones.sweet_low, zones.sweet_high),
        perfect_zone_pct: share(zones.perfect_low, zones.perfect_high),
    })
}
