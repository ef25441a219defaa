//! Glucose sample extraction and temporal aggregation.
//!
//! Groups are anchored on their first sample: a sample joins the open group
//! while it is within `threshold` of that first sample, so no group ever spans
//! more than `threshold`, however dense the readings are.

use crate::{AggregatedPoint, Event, EventKind, GlucoseSample};
use chrono::Duration;

/// Pull glucose samples out of a day's events, sorted by instant.
///
/// Readings whose text is not a finite number are skipped so they can never
/// leak into a group mean.
pub fn samples_from_events(events: &[Event]) -> Vec<GlucoseSample> {
    let mut samples: Vec<GlucoseSample> = events
        .iter()
        .filter(|e| e.kind == EventKind::GlucoseReading)
        .filter_map(|e| match e.text.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Some(GlucoseSample { value, at: e.at }),
            _ => {
                tracing::warn!("Skipping glucose reading at {} with text {:?}", e.at, e.text);
                None
            }
        })
        .collect();

    samples.sort_by_key(|s| s.at);
    samples
}

/// Collapse sorted samples into representative points.
///
/// A zero threshold only merges samples sharing an identical instant.
/// Negative thresholds are treated as zero.
pub fn aggregate(samples: &[GlucoseSample], threshold: Duration) -> Vec<AggregatedPoint> {
    let threshold = threshold.max(Duration::zero());
    let mut points = Vec::new();

    let Some(first) = samples.first() else {
        return points;
    };

    let mut group = Group::start(first);
    for sample in &samples[1..] {
        if sample.at - group.anchor <= threshold {
            group.push(sample);
        } else {
            points.push(group.close());
            group = Group::start(sample);
        }
    }
    points.push(group.close());

    tracing::debug!(
        "Aggregated {} samples into {} points (threshold {} min)",
        samples.len(),
        points.len(),
        threshold.num_minutes()
    );
    points
}

/// Open aggregation group
struct Group {
    anchor: chrono::NaiveDateTime,
    sum: f64,
    count: usize,
}

impl Group {
    fn start(sample: &GlucoseSample) -> Self {
        Self {
            anchor: sample.at,
            sum: sample.value,
            count: 1,
        }
    }

    fn push(&mut self, sample: &GlucoseSample) {
        self.sum += sample.value;
        self.count += 1;
    }

    fn close(&self) -> AggregatedPoint {
        AggregatedPoint {
            value: self.sum / self.count as f64,
            at: self.anchor,
            sample_count: self.count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn sample(value: f64, h: u32, m: u32) -> GlucoseSample {
        GlucoseSample { value, at: at(h, m) }
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert!(aggregate(&[], Duration::minutes(30)).is_empty());
    }

    #[test]
    fn test_morning_cluster_collapses_to_mean() {
        let samples = vec![sample(70.0, 5, 57), sample(77.0, 6, 12), sample(75.0, 6, 20)];
        let points = aggregate(&samples, Duration::minutes(30));

        assert_eq!(points.len(), 1);
        assert!((points[0].value - 74.0).abs() < 1e-9);
        assert_eq!(points[0].at, at(5, 57));
        assert_eq!(points[0].sample_count, 3);
    }

    #[test]
    fn test_group_span_anchored_on_first_sample() {
        // Each gap is 20 min, but the third sample is 40 min from the anchor
        let samples = vec![sample(100.0, 8, 0), sample(110.0, 8, 20), sample(120.0, 8, 40)];
        let points = aggregate(&samples, Duration::minutes(30));

        assert_eq!(points.len(), 2);
        assert!((points[0].value - 105.0).abs() < 1e-9);
        assert_eq!(points[1].at, at(8, 40));
        assert_eq!(points[1].sample_count, 1);
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let samples = vec![sample(90.0, 9, 0), sample(110.0, 9, 30)];
        assert_eq!(aggregate(&samples, Duration::minutes(30)).len(), 1);
        assert_eq!(aggregate(&samples, Duration::minutes(29)).len(), 2);
    }

    #[test]
    fn test_zero_threshold_is_identity_for_distinct_instants() {
        let samples = vec![sample(90.0, 9, 0), sample(95.0, 9, 1), sample(99.0, 9, 2)];
        let points = aggregate(&samples, Duration::zero());

        assert_eq!(points.len(), samples.len());
        for (p, s) in points.iter().zip(&samples) {
            assert_eq!(p.value, s.value);
            assert_eq!(p.at, s.at);
        }
    }

    #[test]
    fn test_zero_threshold_merges_identical_instants() {
        let samples = vec![sample(90.0, 9, 0), sample(100.0, 9, 0)];
        let points = aggregate(&samples, Duration::zero());
        assert_eq!(points.len(), 1);
        assert!((points[0].value - 95.0).abs() < 1e-9);
    }

    #[test]
    fn test_grouping_invariant_holds() {
        let minutes = [0, 5, 12, 31, 33, 70, 71, 72, 140, 200, 201, 260];
        let samples: Vec<_> = minutes
            .iter()
            .enumerate()
            .map(|(i, m)| GlucoseSample {
                value: 80.0 + i as f64,
                at: at(6, 0) + Duration::minutes(*m),
            })
            .collect();
        let threshold = Duration::minutes(30);
        let points = aggregate(&samples, threshold);

        // Rebuild membership from sample counts
        let mut idx = 0;
        for (i, p) in points.iter().enumerate() {
            let members = &samples[idx..idx + p.sample_count];
            assert_eq!(members[0].at, p.at);
            for m in members {
                assert!(m.at - p.at <= threshold);
            }
            let mean = members.iter().map(|m| m.value).sum::<f64>() / members.len() as f64;
            assert!((mean - p.value).abs() < 1e-9);

            if let Some(next) = points.get(i + 1) {
                assert!(next.at - p.at > threshold);
            }
            idx += p.sample_count;
        }
        assert_eq!(idx, samples.len());
    }

    #[test]
    fn test_deterministic() {
        let samples = vec![sample(70.0, 5, 57), sample(77.0, 6, 12), sample(140.0, 9, 0)];
        let a = aggregate(&samples, Duration::minutes(60));
        let b = aggregate(&samples, Duration::minutes(60));
        assert_eq!(a, b);
    }

    #[test]
    fn test_samples_from_events_sorts_and_skips_garbage() {
        let events = vec![
            Event { kind: EventKind::GlucoseReading, text: "120".into(), at: at(9, 0) },
            Event { kind: EventKind::Food, text: "toast".into(), at: at(8, 30) },
            Event { kind: EventKind::GlucoseReading, text: "n/a".into(), at: at(8, 45) },
            Event { kind: EventKind::GlucoseReading, text: " 98.5 ".into(), at: at(8, 0) },
            Event { kind: EventKind::GlucoseReading, text: "NaN".into(), at: at(8, 50) },
        ];
        let samples = samples_from_events(&events);

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].value, 98.5);
        assert_eq!(samples[1].value, 120.0);
    }
}
