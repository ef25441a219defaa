//! Zoom window navigation over a day's aggregated series.
//!
//! `ZoomState` is plain data; every operation here takes the current full
//! range and returns a new state, clamped so a fixed-length window never
//! extends outside the data.

use crate::{
    AggregatedPoint, AnnotatedMarker, LocalInstant, PanDirection, TimeRange, ZoomLength,
    ZoomState,
};
use chrono::Duration;

/// Cosmetic breathing room added around the visible window when rendering
pub fn display_padding() -> Duration {
    Duration::minutes(2)
}

/// Earliest and latest instant across points and markers
pub fn full_range(points: &[AggregatedPoint], markers: &[AnnotatedMarker]) -> Option<TimeRange> {
    let instants = points
        .iter()
        .map(|p| p.at)
        .chain(markers.iter().map(|m| m.event.at));

    instants.fold(None, |range: Option<TimeRange>, at| {
        Some(match range {
            None => TimeRange { start: at, end: at },
            Some(r) => TimeRange {
                start: r.start.min(at),
                end: r.end.max(at),
            },
        })
    })
}

impl ZoomState {
    /// Unanchored state for `length`
    pub fn new(length: ZoomLength) -> Self {
        Self {
            length,
            window_start: None,
        }
    }

    /// Select a new zoom length.
    ///
    /// Fixed lengths show the most recent slice of the day, or the whole day
    /// when it is shorter than the window.
    pub fn zoomed(length: ZoomLength, full: &TimeRange) -> Self {
        let window_start = match length.duration() {
            Some(len) if full.span() > len => full.end - len,
            _ => full.start,
        };
        Self {
            length,
            window_start: Some(window_start),
        }
    }

    /// Re-fit the window inside `full`, anchoring it if it never was
    pub fn clamped(self, full: &TimeRange) -> Self {
        let Some(start) = self.window_start else {
            return Self::zoomed(self.length, full);
        };
        let Some(len) = self.length.duration() else {
            return Self {
                length: self.length,
                window_start: Some(full.start),
            };
        };

        Self {
            length: self.length,
            window_start: Some(clamp_start(start, len, full)),
        }
    }

    /// Shift the window by half its length.
    ///
    /// No-op for the whole-day zoom or a zero-span day.
    pub fn panned(self, direction: PanDirection, full: &TimeRange) -> Self {
        let Some(len) = self.length.duration() else {
            return self;
        };
        if full.span() == Duration::zero() {
            return self;
        }

        let anchored = self.clamped(full);
        let start = anchored.window_start.unwrap_or(full.start);
        let step = len / 2;
        let shifted = match direction {
            PanDirection::Earlier => start - step,
            PanDirection::Later => start + step,
        };

        Self {
            length: self.length,
            window_start: Some(clamp_start(shifted, len, full)),
        }
    }

    /// The resolved window, never wider than `full`
    pub fn visible_range(&self, full: &TimeRange) -> TimeRange {
        let state = self.clamped(full);
        match (state.length.duration(), state.window_start) {
            (Some(len), Some(start)) => TimeRange {
                start,
                end: (start + len).min(full.end),
            },
            _ => *full,
        }
    }
}

fn clamp_start(start: LocalInstant, len: Duration, full: &TimeRange) -> LocalInstant {
    let max_start = (full.end - len).max(full.start);
    start.clamp(full.start, max_start)
}

/// The slice of a day handed to the chart
#[derive(Clone, Debug, PartialEq)]
pub struct WindowSlice {
    pub points: Vec<AggregatedPoint>,
    pub markers: Vec<AnnotatedMarker>,
    /// Window the slice was filtered by
    pub range: TimeRange,
    /// `range` widened by [`display_padding`]; for axis bounds only
    pub display_range: TimeRange,
    /// True when the window held no points and the full series is shown
    pub fell_back: bool,
}

/// Filter points and markers to the zoom window.
///
/// Membership is `[window_start, window_start + length]`, inclusive. An empty
/// point set falls back to the unfiltered series.
pub fn slice(
    points: &[AggregatedPoint],
    markers: &[AnnotatedMarker],
    zoom: &ZoomState,
    full: &TimeRange,
) -> WindowSlice {
    let visible = zoom.visible_range(full);
    let membership = match zoom.length.duration() {
        Some(len) => TimeRange {
            start: visible.start,
            end: visible.start + len,
        },
        None => *full,
    };

    let in_points: Vec<_> = points
        .iter()
        .filter(|p| membership.contains(p.at))
        .copied()
        .collect();

    if in_points.is_empty() {
        tracing::debug!("Zoom window {:?} holds no points, showing full series", membership);
        return WindowSlice {
            points: points.to_vec(),
            markers: markers.to_vec(),
            range: *full,
            display_range: full.padded(display_padding()),
            fell_back: true,
        };
    }

    let in_markers = markers
        .iter()
        .filter(|m| membership.contains(m.event.at))
        .cloned()
        .collect();

    WindowSlice {
        points: in_points,
        markers: in_markers,
        range: visible,
        display_range: visible.padded(display_padding()),
        fell_back: false,
    }
}
