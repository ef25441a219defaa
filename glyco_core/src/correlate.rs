//! Places non-glucose events on the aggregated glucose curve.

use crate::{AggregatedPoint, AnnotatedMarker, Event, EventKind};

/// Pair each non-glucose event with the value of the nearest aggregated point.
///
/// Equidistant points resolve to the earlier one. With no points at all,
/// every marker is plotted at `fallback`.
pub fn correlate(
    events: &[Event],
    points: &[AggregatedPoint],
    fallback: f64,
) -> Vec<AnnotatedMarker> {
    events
        .iter()
        .filter(|e| e.kind != EventKind::GlucoseReading)
        .map(|event| AnnotatedMarker {
            event: event.clone(),
            plotted_value: nearest(points, event)
                .map(|p| p.value)
                .unwrap_or(fallback),
        })
        .collect()
}

/// Linear scan; `min_by_key` keeps the first of equal minima
fn nearest<'a>(points: &'a [AggregatedPoint], event: &Event) -> Option<&'a AggregatedPoint> {
    points
        .iter()
        .min_by_key(|p| (p.at - event.at).abs())
}
