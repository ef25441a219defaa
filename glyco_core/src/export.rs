//! CSV export of the visible glucose series and weekly grids.
//!
//! Files are overwritten, flushed and fsynced before returning.

use crate::{AggregatedPoint, AnnotatedMarker, Result, WeeklyGrid};
use std::fs::File;
use std::path::Path;

/// A row of the series export; points and markers share one timeline
#[derive(Debug, serde::Serialize)]
struct SeriesRow<'a> {
    at: String,
    kind: &'a str,
    value: f64,
    samples: Option<usize>,
    text: Option<&'a str>,
}

/// A row of the weekly export
#[derive(Debug, serde::Serialize)]
struct WeeklyRow<'a> {
    metric_type: &'a str,
    date: String,
    value: Option<&'a str>,
    comment: &'a str,
    has_data: bool,
}

/// Write points and markers, ordered by instant, to `path`
pub fn write_series_csv(
    path: &Path,
    points: &[AggregatedPoint],
    markers: &[AnnotatedMarker],
) -> Result<usize> {
    let mut rows: Vec<SeriesRow> = points
        .iter()
        .map(|p| SeriesRow {
            at: p.at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            kind: "glucose",
            value: p.value,
            samples: Some(p.sample_count),
            text: None,
        })
        .chain(markers.iter().map(|m| SeriesRow {
            at: m.event.at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            kind: m.event.kind.as_str(),
            value: m.plotted_value,
            samples: None,
            text: Some(m.event.text.as_str()),
        }))
        .collect();
    // ISO timestamps sort chronologically; stable sort keeps points before markers
    rows.sort_by(|a, b| a.at.cmp(&b.at));

    write_rows(path, &rows)?;
    tracing::info!("Exported {} series rows to {:?}", rows.len(), path);
    Ok(rows.len())
}

/// Write one row per grid cell to `path`
pub fn write_weekly_csv(path: &Path, grids: &[WeeklyGrid]) -> Result<usize> {
    let rows: Vec<WeeklyRow> = grids
        .iter()
        .flat_map(|grid| {
            grid.cells.iter().map(move |cell| WeeklyRow {
                metric_type: grid.metric_type.as_str(),
                date: crate::time::format_query_date(cell.date),
                value: cell.value.as_deref(),
                comment: cell.comment.as_str(),
                has_data: cell.has_data,
            })
        })
        .collect();

    write_rows(path, &rows)?;
    tracing::info!("Exported {} weekly cells to {:?}", rows.len(), path);
    Ok(rows.len())
}

fn write_rows<T: serde::Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut writer = csv::WriterBuilder::new().has_headers(true).from_writer(file);
    for row in rows {
        writer.serialize(row)?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Event, EventKind, WeeklyGridCell};
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_series_csv_is_chronological() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("series.csv");

        let points = vec![
            AggregatedPoint { value: 74.0, at: at(5, 57), sample_count: 3 },
            AggregatedPoint { value: 130.0, at: at(9, 0), sample_count: 1 },
        ];
        let markers = vec![AnnotatedMarker {
            event: Event { kind: EventKind::Food, text: "lunch".into(), at: at(6, 5) },
            plotted_value: 74.0,
        }];

        let count = write_series_csv(&path, &points, &markers).unwrap();
        assert_eq!(count, 3);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[0], "at,kind,value,samples,text");
        assert!(lines[1].starts_with("2024-05-01T05:57:00,glucose,74"));
        assert!(lines[2].contains("food"));
        assert!(lines[2].ends_with("lunch"));
        assert!(lines[3].starts_with("2024-05-01T09:00:00,glucose"));
    }

    #[test]
    fn test_weekly_csv_has_row_per_cell() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("out").join("week.csv");
        let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        let grid = WeeklyGrid {
            metric_type: "Peso".into(),
            cells: start
                .iter_days()
                .take(7)
                .enumerate()
                .map(|(i, date)| WeeklyGridCell {
                    date,
                    value: (i == 0).then(|| "72.4".to_string()),
                    comment: String::new(),
                    has_data: i == 0,
                })
                .collect(),
        };

        assert_eq!(write_weekly_csv(&path, &[grid]).unwrap(), 7);
        let reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(reader.into_records().count(), 7);
    }
}
