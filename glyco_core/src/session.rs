//! Day view controller.
//!
//! Owns the view state (date, threshold, zoom, event snapshot) and runs the
//! pipeline explicitly after every trigger:
//!
//! 1. **Normalize**: wire timestamps become local instants when a fetch is applied
//! 2. **Aggregate**: raw samples collapse within the threshold
//! 3. **Correlate**: non-glucose events are placed on the curve
//! 4. **Window**: the zoom selects the visible slice
//!
//! Trend and statistics always come from the full, unwindowed day.

use crate::config::{Config, ZoneConfig};
use crate::stats::{summarize, DayStats};
use crate::window::{self, WindowSlice};
use crate::{
    aggregate, correlate, estimate_trend, samples_from_events, time, DaySource, Error, Event,
    PanDirection, Result, TimeRange, TrendReading, WireEvent, ZoomLength, ZoomState,
};
use chrono::{Duration, NaiveDate};

/// Identifies one fetch; results for a superseded ticket are discarded
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    pub date: NaiveDate,
    pub generation: u64,
}

/// Everything the chart and stats panels need after a recompute
#[derive(Clone, Debug)]
pub struct DayView {
    pub date: NaiveDate,
    pub slice: Option<WindowSlice>,
    pub full_range: Option<TimeRange>,
    pub trend: Option<TrendReading>,
    pub stats: Option<DayStats>,
}

/// Explicit view state for the glucose path
#[derive(Clone, Debug)]
pub struct DayViewState {
    date: NaiveDate,
    threshold: Duration,
    zoom: ZoomState,
    marker_fallback: f64,
    zones: ZoneConfig,
    events: Vec<Event>,
    generation: u64,
    pending: Option<FetchTicket>,
}

impl DayViewState {
    pub fn new(date: NaiveDate, config: &Config) -> Self {
        Self {
            date,
            threshold: config.aggregation.threshold(),
            zoom: ZoomState::new(config.chart.default_zoom),
            marker_fallback: config.chart.marker_fallback,
            zones: config.zones.clone(),
            events: Vec::new(),
            generation: 0,
            pending: None,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn zoom(&self) -> ZoomState {
        self.zoom
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn is_fetching(&self) -> bool {
        self.pending.is_some()
    }

    /// Switch day; the old snapshot is dropped immediately.
    ///
    /// The zoom length is kept but re-anchored on the new day's data.
    pub fn set_date(&mut self, date: NaiveDate) -> FetchTicket {
        self.date = date;
        self.zoom = ZoomState::new(self.zoom.length);
        self.begin_fetch()
    }

    /// Start a (re)fetch of the current day, superseding any outstanding one
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.events.clear();
        self.generation += 1;
        let ticket = FetchTicket {
            date: self.date,
            generation: self.generation,
        };
        self.pending = Some(ticket);
        tracing::debug!(
            "Fetching {} (generation {})",
            time::format_query_date(ticket.date),
            ticket.generation
        );
        ticket
    }

    /// Apply a fetch result.
    ///
    /// Returns `Ok(false)` if the ticket was superseded and the result dropped.
    /// A failed fetch leaves the day empty and returns the error.
    pub fn apply_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<WireEvent>>,
    ) -> Result<bool> {
        if self.pending != Some(ticket) {
            tracing::debug!(
                "Discarding stale fetch for {} (generation {})",
                ticket.date,
                ticket.generation
            );
            return Ok(false);
        }
        self.pending = None;
        self.events.clear();

        let wire = result?;
        let events = wire
            .into_iter()
            .map(|w| -> Result<Event> {
                Ok(Event {
                    kind: w.kind,
                    at: time::normalize_timestamp(&w.at)?,
                    text: w.text,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::info!("Loaded {} events for {}", events.len(), self.date);
        self.events = events;
        Ok(true)
    }

    /// Fetch the current day from `source` and apply it
    pub fn load_from(&mut self, source: &dyn DaySource) -> Result<()> {
        let ticket = self.begin_fetch();
        let result = source.fetch_day(ticket.date);
        if self.apply_fetch(ticket, result)? {
            Ok(())
        } else {
            Err(Error::Source(format!("fetch for {} was superseded", ticket.date)))
        }
    }

    pub fn set_threshold(&mut self, threshold: Duration) {
        self.threshold = threshold.max(Duration::zero());
    }

    /// Choose a zoom length; the window is anchored on the next recompute
    pub fn set_zoom(&mut self, length: ZoomLength) {
        self.zoom = ZoomState::new(length);
    }

    /// Pan the zoom window against the current series
    pub fn pan(&mut self, direction: PanDirection) {
        let full = self.full_range();
        if let Some(full) = full {
            self.zoom = self.zoom.panned(direction, &full);
        }
    }

    fn full_range(&self) -> Option<TimeRange> {
        let samples = samples_from_events(&self.events);
        let points = aggregate(&samples, self.threshold);
        let markers = correlate(&self.events, &points, self.marker_fallback);
        window::full_range(&points, &markers)
    }

    /// Run the pipeline over the current snapshot
    pub fn recompute(&mut self) -> DayView {
        let samples = samples_from_events(&self.events);
        let points = aggregate(&samples, self.threshold);
        let markers = correlate(&self.events, &points, self.marker_fallback);
        let full_range = window::full_range(&points, &markers);

        let slice = full_range.map(|full| {
            self.zoom = self.zoom.clamped(&full);
            window::slice(&points, &markers, &self.zoom, &full)
        });

        DayView {
            date: self.date,
            slice,
            full_range,
            trend: estimate_trend(&samples),
            stats: summarize(&samples, &self.zones),
        }
    }
}
