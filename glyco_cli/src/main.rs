use chrono::{Duration, Local, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use glyco_core::classify::render_block;
use glyco_core::export::{write_series_csv, write_weekly_csv};
use glyco_core::source::record_from_entry;
use glyco_core::time::{format_query_date, parse_query_date};
use glyco_core::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "glyco")]
#[command(about = "Daily glucose and body-stat viewer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a day's glucose series, markers, trend and stats (default)
    Day {
        /// Day to show (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,

        /// Aggregation threshold in minutes (0 disables aggregation)
        #[arg(long)]
        threshold: Option<i64>,

        /// Zoom window
        #[arg(long, value_enum)]
        zoom: Option<ZoomArg>,

        /// Pan the zoom window, applied in order (repeatable)
        #[arg(long, value_enum)]
        pan: Vec<PanArg>,

        /// Also export the visible series to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Classify free-text body-metric entries from a file
    Classify {
        /// Text file of blank-line separated blocks; rewritten with unmatched blocks
        #[arg(long)]
        input: PathBuf,

        /// Show the classification without saving or rewriting anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the weekly body-stat grid
    Week {
        /// First day of the week (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// Also export the grid to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Manage the stored bearer token
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Store a bearer token
    Set { token: String },
    /// Print whether a token is stored
    Show,
    /// Remove the stored token
    Clear,
}

#[derive(Clone, Copy, ValueEnum)]
enum ZoomArg {
    #[value(name = "4h")]
    FourHours,
    #[value(name = "12h")]
    TwelveHours,
    All,
}

impl From<ZoomArg> for ZoomLength {
    fn from(arg: ZoomArg) -> Self {
        match arg {
            ZoomArg::FourHours => ZoomLength::FourHours,
            ZoomArg::TwelveHours => ZoomLength::TwelveHours,
            ZoomArg::All => ZoomLength::All,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum PanArg {
    Earlier,
    Later,
}

impl From<PanArg> for PanDirection {
    fn from(arg: PanArg) -> Self {
        match arg {
            PanArg::Earlier => PanDirection::Earlier,
            PanArg::Later => PanDirection::Later,
        }
    }
}

fn main() -> Result<()> {
    glyco_core::logging::init_with_level("warn");

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());

    match cli.command {
        Some(Commands::Day {
            date,
            threshold,
            zoom,
            pan,
            csv,
        }) => cmd_day(&data_dir, &config, date, threshold, zoom, pan, csv),
        Some(Commands::Classify { input, dry_run }) => cmd_classify(&data_dir, &input, dry_run),
        Some(Commands::Week { start, csv }) => cmd_week(&data_dir, &start, csv),
        Some(Commands::Token { action }) => cmd_token(&data_dir, action),
        None => cmd_day(&data_dir, &config, None, None, None, Vec::new(), None),
    }
}

fn cmd_day(
    data_dir: &Path,
    config: &Config,
    date: Option<String>,
    threshold: Option<i64>,
    zoom: Option<ZoomArg>,
    pan: Vec<PanArg>,
    csv: Option<PathBuf>,
) -> Result<()> {
    let date = match date {
        Some(d) => parse_query_date(&d)?,
        None => Local::now().date_naive(),
    };

    let source = JsonlSource::new(data_dir);
    let mut state = DayViewState::new(date, config);
    if let Some(minutes) = threshold {
        if minutes < 0 {
            return Err(Error::Config(format!(
                "threshold must be >= 0 minutes, got {}",
                minutes
            )));
        }
        state.set_threshold(Duration::minutes(minutes));
    }
    if let Some(zoom) = zoom {
        state.set_zoom(zoom.into());
    }

    state.load_from(&source)?;
    for direction in pan {
        state.pan(direction.into());
    }
    let view = state.recompute();

    display_day(&view, state.zoom());

    if let (Some(path), Some(slice)) = (csv, view.slice.as_ref()) {
        let rows = write_series_csv(&path, &slice.points, &slice.markers)?;
        println!("\n✓ Exported {} rows to {}", rows, path.display());
    }

    Ok(())
}

fn display_day(view: &DayView, zoom: ZoomState) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  GLUCOSE {}", format_query_date(view.date));
    println!("╰─────────────────────────────────────────╯");
    println!();

    let Some(slice) = &view.slice else {
        println!("  No data for this day.");
        println!();
        return;
    };

    let zoom_label = match zoom.length {
        ZoomLength::FourHours => "4h",
        ZoomLength::TwelveHours => "12h",
        ZoomLength::All => "all",
    };
    println!(
        "  Window: {} → {} (zoom {}{})",
        slice.range.start.format("%H:%M"),
        slice.range.end.format("%H:%M"),
        zoom_label,
        if slice.fell_back { ", showing full day" } else { "" }
    );
    println!();

    for point in &slice.points {
        println!(
            "  {}  {:>6.1}  ({} samples)",
            point.at.format("%H:%M"),
            point.value,
            point.sample_count
        );
    }
    for marker in &slice.markers {
        println!(
            "  {}  ◆ {}: {} @ {:.1}",
            marker.event.at.format("%H:%M"),
            marker.event.kind.as_str(),
            marker.event.text,
            marker.plotted_value
        );
    }
    println!();

    match view.trend {
        Some(reading) => println!(
            "  Trend: {} {:?} ({:+.2}/min)",
            reading.trend.arrow(),
            reading.trend,
            reading.rate_per_minute
        ),
        None => println!("  Trend: not enough readings"),
    }

    if let Some(stats) = &view.stats {
        println!(
            "  Readings: {}  mean {:.1}  min {:.0}  max {:.0}  latest {:.0} at {}",
            stats.count,
            stats.mean,
            stats.min,
            stats.max,
            stats.latest.value,
            stats.latest.at.format("%H:%M")
        );
        println!(
            "  In sweet zone: {:.0}%  In perfect zone: {:.0}%",
            stats.sweet_zone_pct, stats.perfect_zone_pct
        );
    }
    println!();
}

fn cmd_classify(data_dir: &Path, input: &Path, dry_run: bool) -> Result<()> {
    let catalog = get_default_catalog();
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::CatalogValidation("Invalid catalog".into()));
    }

    let text = std::fs::read_to_string(input)?;
    let mut buffer = EntryBuffer::new(text);
    let result = buffer.submit(catalog);

    for entry in &result.classified {
        println!(
            "  ✓ {}: {} {}{}",
            entry.entry.canonical_name,
            entry.value,
            entry.entry.unit,
            if entry.comment.is_empty() {
                String::new()
            } else {
                format!("  ({})", entry.comment)
            }
        );
    }
    for block in &result.unmatched {
        println!("  ✗ Unmatched:");
        for line in block.lines() {
            println!("      {}", line);
        }
    }
    println!(
        "\nClassified {} entries, {} unmatched",
        result.classified.len(),
        result.unmatched.len()
    );

    if dry_run {
        println!("\n[Dry run - nothing saved]");
        for entry in &buffer.entries {
            tracing::debug!("Would save block:\n{}", render_block(entry));
        }
        return Ok(());
    }

    let now = Utc::now();
    let mut sink = JsonlRecordSink::new(JsonlSource::new(data_dir).body_stats_path());
    for entry in &buffer.entries {
        sink.append(&record_from_entry(entry, now))?;
    }

    std::fs::write(input, &buffer.pending_text)?;
    if buffer.pending_text.is_empty() {
        println!("✓ All entries saved");
    } else {
        println!("✓ Saved matched entries; {} now holds only unmatched blocks", input.display());
    }

    Ok(())
}

fn cmd_week(data_dir: &Path, start: &str, csv: Option<PathBuf>) -> Result<()> {
    let start: NaiveDate = parse_query_date(start)?;
    let source = JsonlSource::new(data_dir);
    let records = source.fetch_body_stats(start)?;
    let grids = build_weekly_grids(&records, start);

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  WEEK OF {}", format_query_date(start));
    println!("╰─────────────────────────────────────────╯");

    if grids.is_empty() {
        println!("\n  No body stats recorded this week.\n");
        return Ok(());
    }

    let header: Vec<String> = glyco_core::weekly::week_days(start)
        .iter()
        .map(|d| d.format("%a %d").to_string())
        .collect();
    println!("\n  {:<18} {}", "", header.join("  "));

    for grid in &grids {
        let cells: Vec<String> = grid
            .cells
            .iter()
            .map(|c| format!("{:>6}", c.value.as_deref().unwrap_or("-")))
            .collect();
        println!("  {:<18} {}", grid.metric_type, cells.join(" "));
    }
    println!();

    if let Some(path) = csv {
        let rows = write_weekly_csv(&path, &grids)?;
        println!("✓ Exported {} cells to {}", rows, path.display());
    }

    Ok(())
}

fn cmd_token(data_dir: &Path, action: TokenAction) -> Result<()> {
    let store = TokenStore::in_data_dir(data_dir);
    match action {
        TokenAction::Set { token } => {
            store.save(&token)?;
            println!("✓ Token saved");
        }
        TokenAction::Show => match store.load() {
            Some(stored) => println!(
                "Token stored (saved {})",
                stored.saved_at.format("%Y-%m-%d %H:%M UTC")
            ),
            None => println!("No token stored"),
        },
        TokenAction::Clear => {
            if store.clear()? {
                println!("✓ Token removed");
            } else {
                println!("No token stored");
            }
        }
    }
    Ok(())
}
