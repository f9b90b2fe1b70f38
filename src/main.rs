//! CLI entry point for transit_watch.
//!
//! Reports the most delayed and the fastest Amtrak trains, looks up single
//! trains and stations, and phrases stop-board departures as early or late.

mod infra;
mod services;

use crate::infra::amtraker::client::AmtrakerClient;
use crate::services::fleet_api::FleetApi;
use anyhow::Result;
use chrono::{DateTime, Local};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::ffi::OsStr;
use std::path::Path;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use transit_watch::{
    config::Settings,
    fetch::{BasicClient, fetch_bytes},
    histogram::{self, DURATION_BIN_WIDTH, DURATION_TICK_STEP, SPEED_BIN_WIDTH},
    model::VehicleRecord,
    output::{self, HistogramChart},
    parser::parse_trains,
    punctuality::Departure,
    stations::StationDirectory,
    stats::{ErrorPolicy, LatenessStats, SpeedStats},
};

#[derive(Parser)]
#[command(name = "transit_watch")]
#[command(about = "Delay and speed reports for live transit feeds", long_about = None)]
struct Cli {
    /// Print reports as JSON instead of text
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct SnapshotArgs {
    /// Read the trains response from a file or URL instead of the API
    #[arg(short, long, value_name = "FILE_OR_URL")]
    source: Option<String>,

    /// Draw a histogram of the collected sample
    #[arg(long, default_value_t = false)]
    histogram: bool,

    /// Skip trains that cannot be evaluated instead of stopping
    #[arg(long, default_value_t = false)]
    skip_unparsable: bool,

    /// Number of snapshots to take (0 = infinite)
    #[arg(short = 'n', long, default_value_t = 1)]
    samples: usize,

    /// Seconds to wait between snapshots
    #[arg(short = 'r', long, default_value_t = 30)]
    every: u64,
}

impl SnapshotArgs {
    fn policy(&self) -> ErrorPolicy {
        if self.skip_unparsable {
            ErrorPolicy::Skip
        } else {
            ErrorPolicy::Abort
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Count late trains and report the most delayed one
    Late(SnapshotArgs),
    /// Report the fastest active train
    Fastest(SnapshotArgs),
    /// Show the status of one train
    Train {
        /// Train number, e.g. 5
        id: String,
    },
    /// Look up a station by name
    Station {
        /// Station name (case insensitive)
        name: String,

        /// JSON file mapping station names to codes; fetched from the API if omitted
        #[arg(short, long)]
        directory: Option<String>,
    },
    /// Compare a timetabled departure against its estimate
    Departure {
        /// Timetabled time, e.g. 2021-11-03T08:15:00+0100
        #[arg(long)]
        timetabled: String,

        /// Estimated time, same format
        #[arg(long)]
        estimated: Option<String>,

        /// Transit mode used in the message
        #[arg(short, long, default_value = "Tram")]
        mode: String,
    },
}

#[derive(Clone, Copy)]
enum Report {
    Lateness,
    Speed,
}

#[derive(Serialize)]
struct DepartureReport {
    timetabled: DateTime<Local>,
    estimated: Option<DateTime<Local>>,
    leaving_in_minutes: i64,
    delay_minutes: Option<i64>,
    message: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let settings = Settings::from_env()?;
    let _log_guard = init_logging(&settings.log_file_path)?;

    let cli = Cli::parse();

    let http = BasicClient::new(settings.http_timeout)?;
    let api = AmtrakerClient::new(settings.amtraker_base_url.clone(), http);

    match cli.command {
        Commands::Late(args) => {
            run_snapshots(&api, &settings, &args, Report::Lateness, cli.json).await?;
        }
        Commands::Fastest(args) => {
            run_snapshots(&api, &settings, &args, Report::Speed, cli.json).await?;
        }
        Commands::Train { id } => {
            let train = api.fetch_train(&id).await?;
            if cli.json {
                println!("{}", output::to_json(&train)?);
            } else {
                println!("{}", output::describe(&train));
                if let Some(timely) = &train.timeliness {
                    println!("Status: {timely}");
                }
                if let Some(speed) = train.speed {
                    println!("Speed: {speed:.2} mph");
                }
                if let Some(stop) = train.next_stop() {
                    println!("Next Station: {}", stop.name);
                }
            }
        }
        Commands::Station { name, directory } => {
            let directory = match directory {
                Some(path) => StationDirectory::load(&path)?,
                None => {
                    let stations = api.fetch_all_stations().await?;
                    info!(stations = stations.len(), "Station list fetched");
                    StationDirectory::from_pairs(stations.into_iter().map(|s| (s.name, s.code)))
                }
            };

            let code = directory.resolve(&name)?;
            let station = api.fetch_station(code).await?;
            if cli.json {
                println!("{}", output::to_json(&station)?);
            } else {
                println!("{} ({})", station.name, station.code);
                if let (Some(city), Some(state)) = (&station.city, &station.state) {
                    println!("{city}, {state}");
                }
                if let Some(tz) = &station.tz {
                    println!("Time zone: {tz}");
                }
                println!("Trains: {}", station.trains.join(", "));
            }
        }
        Commands::Departure {
            timetabled,
            estimated,
            mode,
        } => {
            let departure = Departure::from_feed(&timetabled, estimated.as_deref(), &Local)?;
            let now = Local::now();
            let message = output::departure_line(&departure, &mode, &now);

            if cli.json {
                let report = DepartureReport {
                    leaving_in_minutes: departure.leaving_in(&now),
                    delay_minutes: departure.punctuality().map(|d| d.minutes),
                    timetabled: departure.timetabled,
                    estimated: departure.estimated,
                    message,
                };
                println!("{}", output::to_json(&report)?);
            } else {
                println!("Timetable Time: {}", departure.timetabled);
                if let Some(estimated) = &departure.estimated {
                    println!("Estimated Time: {estimated}");
                }
                println!("{message}");
            }
        }
    }

    Ok(())
}

/// Coloured stderr logging plus a JSON daily-rolling log file.
fn init_logging(log_file_path: &str) -> Result<WorkerGuard> {
    let log_dir = Path::new(log_file_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("transit_watch.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    debug!(path = log_file_path, "Logging initialised");

    Ok(guard)
}

/// Loads a trains snapshot from the API, a local file, or another URL.
#[tracing::instrument(skip(api, settings))]
async fn load_snapshot<A: FleetApi>(
    api: &A,
    settings: &Settings,
    source: Option<&str>,
) -> Result<Vec<VehicleRecord>> {
    match source {
        None => api.fetch_all_trains().await,
        Some(url) if url.starts_with("http") => {
            let client = BasicClient::new(settings.http_timeout)?;
            parse_trains(&fetch_bytes(&client, url).await?)
        }
        Some(path) => parse_trains(&std::fs::read(path)?),
    }
}

/// Takes `args.samples` snapshots (forever when 0), `args.every` seconds apart.
async fn run_snapshots<A: FleetApi>(
    api: &A,
    settings: &Settings,
    args: &SnapshotArgs,
    report: Report,
    json: bool,
) -> Result<()> {
    let mut sample_count = 0;

    loop {
        if args.samples > 0 && sample_count >= args.samples {
            break;
        }
        sample_count += 1;

        let records = load_snapshot(api, settings, args.source.as_deref()).await?;
        info!(sample = sample_count, trains = records.len(), "Snapshot loaded");

        match report {
            Report::Lateness => report_lateness(&records, args, json)?,
            Report::Speed => report_speed(&records, args, json)?,
        }

        if args.samples == 0 || sample_count < args.samples {
            info!(every = args.every, "Waiting before next snapshot");
            tokio::time::sleep(tokio::time::Duration::from_secs(args.every)).await;
            println!();
        }
    }

    Ok(())
}

fn report_lateness(records: &[VehicleRecord], args: &SnapshotArgs, json: bool) -> Result<()> {
    let stats = LatenessStats::from_snapshot(records, args.policy())?;
    let (mean, stddev) = stats.spread();
    info!(
        late = stats.late,
        total = stats.total,
        late_pct = stats.late_pct(),
        mean_minutes = mean,
        stddev_minutes = stddev,
        skipped = stats.skipped.len(),
        "Lateness scan complete"
    );
    output::print_pretty(&stats);

    if json {
        println!("{}", output::to_json(&stats)?);
    } else {
        for line in output::lateness_lines(&stats) {
            println!("{line}");
        }
    }

    if args.histogram {
        let sample = stats.durations_f64();
        print_histogram("Amtrak Late Trains", "minutes", &sample, DURATION_BIN_WIDTH)?;
        if let Ok(spec) = histogram::bins(&sample, DURATION_BIN_WIDTH) {
            let ticks: Vec<String> = spec.ticks(DURATION_TICK_STEP).iter().map(|t| t.to_string()).collect();
            println!("Ticks: {}", ticks.join(" "));
        }
    }

    Ok(())
}

fn report_speed(records: &[VehicleRecord], args: &SnapshotArgs, json: bool) -> Result<()> {
    let stats = SpeedStats::from_snapshot(records, args.policy())?;
    let (mean, stddev) = stats.spread();
    info!(
        trains = stats.speeds.len(),
        mean_mph = mean,
        stddev_mph = stddev,
        skipped = stats.skipped.len(),
        "Speed scan complete"
    );
    output::print_pretty(&stats);

    if json {
        println!("{}", output::to_json(&stats)?);
    } else {
        for line in output::speed_lines(&stats) {
            println!("{line}");
        }
    }

    if args.histogram {
        print_histogram("Velocity of Amtrak Trains", "mph", &stats.speeds, SPEED_BIN_WIDTH)?;
    }

    Ok(())
}

fn print_histogram(title: &str, unit: &str, sample: &[f64], width: f64) -> Result<()> {
    let spec = match histogram::bins(sample, width) {
        Ok(spec) => spec,
        Err(transit_watch::Error::EmptySample) => {
            warn!(title, "Nothing to plot");
            return Ok(());
        }
        Err(e @ transit_watch::Error::TooManyBins { .. }) => {
            warn!(title, error = %e, "Histogram skipped");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let title = format!("{title}  {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    println!();
    print!("{}", HistogramChart::new(&title, unit, spec, sample));
    Ok(())
}
