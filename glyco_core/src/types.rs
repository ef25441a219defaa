//! Core domain types for the Glyco system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Day events and glucose samples
//! - Aggregated points and annotated markers
//! - Time ranges and zoom state
//! - Catalog entries and classified body-metric entries
//! - Body-stat records and weekly grids

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Timezone-naive wall-clock instant.
///
/// Never reinterpreted through a UTC offset once produced by
/// [`crate::time::normalize_timestamp`].
pub type LocalInstant = NaiveDateTime;

// ============================================================================
// Day Events
// ============================================================================

/// Kind of a recorded day event
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    GlucoseReading,
    Food,
    Gym,
    Medicine,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::GlucoseReading => "glucose_reading",
            EventKind::Food => "food",
            EventKind::Gym => "gym",
            EventKind::Medicine => "medicine",
        }
    }
}

/// An event as delivered by the data collaborator, timestamp still on the wire
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WireEvent {
    pub kind: EventKind,
    pub text: String,
    pub at: String,
}

/// A day event with its timestamp normalized to local wall-clock time
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub kind: EventKind,
    pub text: String,
    pub at: LocalInstant,
}

/// A single glucose reading
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct GlucoseSample {
    pub value: f64,
    pub at: LocalInstant,
}

/// One or more samples collapsed into a representative point
///
/// `value` is the mean of the group, `at` is the group's first instant.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct AggregatedPoint {
    pub value: f64,
    pub at: LocalInstant,
    pub sample_count: usize,
}

/// A non-glucose event placed on the glucose curve
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnnotatedMarker {
    pub event: Event,
    pub plotted_value: f64,
}

// ============================================================================
// Time Ranges and Zoom
// ============================================================================

/// Closed range of local instants, `start <= end`
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeRange {
    pub start: LocalInstant,
    pub end: LocalInstant,
}

impl TimeRange {
    pub fn span(&self) -> Duration {
        self.end - self.start
    }

    pub fn contains(&self, at: LocalInstant) -> bool {
        self.start <= at && at <= self.end
    }

    /// Widen both bounds by `padding`, saturating at the representable range
    pub fn padded(&self, padding: Duration) -> Self {
        Self {
            start: self.start.checked_sub_signed(padding).unwrap_or(self.start),
            end: self.end.checked_add_signed(padding).unwrap_or(self.end),
        }
    }
}

/// Selectable zoom window lengths
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ZoomLength {
    #[serde(rename = "4h")]
    FourHours,
    #[serde(rename = "12h")]
    TwelveHours,
    #[default]
    #[serde(rename = "all")]
    All,
}

impl ZoomLength {
    /// Window length, or `None` for the whole day
    pub fn duration(self) -> Option<Duration> {
        match self {
            ZoomLength::FourHours => Some(Duration::hours(4)),
            ZoomLength::TwelveHours => Some(Duration::hours(12)),
            ZoomLength::All => None,
        }
    }
}

/// Direction to pan a zoomed window
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanDirection {
    Earlier,
    Later,
}

/// Current zoom selection
///
/// `window_start` is `None` until the window is anchored against a full range.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ZoomState {
    pub length: ZoomLength,
    pub window_start: Option<LocalInstant>,
}

// ============================================================================
// Trend
// ============================================================================

/// Five-level rate-of-change indicator
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    SharplyRising,
    Rising,
    Stable,
    Falling,
    SharplyFalling,
}

impl Trend {
    pub fn arrow(self) -> &'static str {
        match self {
            Trend::SharplyRising => "⇈",
            Trend::Rising => "↗",
            Trend::Stable => "→",
            Trend::Falling => "↘",
            Trend::SharplyFalling => "⇊",
        }
    }
}

/// Trend band plus the rate it was derived from (units per minute)
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct TrendReading {
    pub trend: Trend,
    pub rate_per_minute: f64,
}

// ============================================================================
// Catalog and Classification
// ============================================================================

/// A canonical body-metric type
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogEntry {
    pub canonical_name: String,
    pub unit: String,
}

/// The fixed, ordered set of canonical body-metric types
#[derive(Clone, Debug)]
pub struct Catalog {
    pub entries: Vec<CatalogEntry>,
}

/// A free-text block resolved to a catalog entry
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ClassifiedEntry {
    pub id: Uuid,
    pub entry: CatalogEntry,
    pub value: String,
    pub comment: String,
}

// ============================================================================
// Body Stats
// ============================================================================

/// Body-composition record from the stats collaborator
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BodyStatRecord {
    #[serde(rename = "type")]
    pub metric_type: String,
    pub value: String,
    #[serde(default)]
    pub comment: String,
    /// Absolute epoch, milliseconds
    pub epoch: i64,
}

/// One day of a weekly grid
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WeeklyGridCell {
    pub date: NaiveDate,
    pub value: Option<String>,
    pub comment: String,
    pub has_data: bool,
}

/// Seven consecutive UTC days of one metric type
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WeeklyGrid {
    pub metric_type: String,
    pub cells: Vec<WeeklyGridCell>,
}
