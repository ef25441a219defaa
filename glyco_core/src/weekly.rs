//! Weekly body-stat grids.
//!
//! Days are UTC calendar days: record epochs are absolute, so this is the one
//! place the crate does not work in local wall-clock time.

use crate::{BodyStatRecord, WeeklyGrid, WeeklyGridCell};
use chrono::{DateTime, NaiveDate};
use std::collections::{BTreeMap, HashMap};

pub const DAYS_PER_GRID: usize = 7;

/// Types shown first, in this order; the rest follow alphabetically
pub const PRIORITY_TYPES: &[&str] = &[
    "Peso",
    "IMC",
    "Grasa corporal",
    "Masa muscular",
    "Grasa visceral",
    "Agua corporal",
];

/// The seven consecutive UTC days starting at `start`
pub fn week_days(start: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take(DAYS_PER_GRID).collect()
}

/// Build one 7-cell grid per metric type present in `records`.
///
/// Types with no records produce no grid. When a type has several records on
/// the same day, the latest epoch wins.
pub fn build_weekly_grids(records: &[BodyStatRecord], start: NaiveDate) -> Vec<WeeklyGrid> {
    let days = week_days(start);

    // type -> day -> record
    let mut by_type: HashMap<&str, BTreeMap<NaiveDate, &BodyStatRecord>> = HashMap::new();
    for record in records {
        let slots = by_type.entry(record.metric_type.as_str()).or_default();
        let Some(day) = utc_day(record.epoch) else {
            tracing::warn!(
                "Skipping {} record with out-of-range epoch {}",
                record.metric_type,
                record.epoch
            );
            continue;
        };
        let newer = slots
            .get(&day)
            .map_or(true, |existing| existing.epoch <= record.epoch);
        if newer {
            slots.insert(day, record);
        }
    }

    let mut types: Vec<&str> = by_type.keys().copied().collect();
    types.sort_by(|a, b| display_rank(a).cmp(&display_rank(b)));

    types
        .into_iter()
        .map(|metric_type| {
            let slots = &by_type[metric_type];
            let cells = days
                .iter()
                .map(|day| match slots.get(day) {
                    Some(record) => WeeklyGridCell {
                        date: *day,
                        value: Some(record.value.clone()),
                        comment: record.comment.clone(),
                        has_data: true,
                    },
                    None => WeeklyGridCell {
                        date: *day,
                        value: None,
                        comment: String::new(),
                        has_data: false,
                    },
                })
                .collect();

            WeeklyGrid {
                metric_type: metric_type.to_string(),
                cells,
            }
        })
        .collect()
}

/// UTC calendar day of an epoch in milliseconds
pub fn utc_day(epoch_ms: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(epoch_ms).map(|dt| dt.date_naive())
}

/// Sort key: priority position first, then name
fn display_rank(metric_type: &str) -> (usize, &str) {
    let rank = PRIORITY_TYPES
        .iter()
        .position(|p| *p == metric_type)
        .unwrap_or(PRIORITY_TYPES.len());
    (rank, metric_type)
}
