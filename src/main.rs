//! CLI entry point for district_weather.
//!
//! Subcommands geocode a district table, enrich it with a year of aggregated
//! daily weather, or inspect the metrics for a single location.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use district_weather::config::{WeatherQuery, load_metric_spec};
use district_weather::enrich::enrich_with;
use district_weather::fetch::BasicClient;
use district_weather::infra::{OpenMeteoClient, OpenWeatherGeocoder};
use district_weather::metrics::{MetricSpec, daily_weather_spec};
use district_weather::output::{
    LocationRow, print_geocode_summary, print_json, print_location, print_summary,
};
use district_weather::pipeline::{PipelineConfig, geocode_table, run};
use district_weather::services::{Coordinates, WeatherSource};
use district_weather::table::{CsvSink, DistrictTable};
use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "district_weather")]
#[command(about = "Geocode districts and enrich them with yearly weather metrics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add lat/lon columns to a district table
    Geocode {
        /// CSV with `state` and `district` columns
        #[arg(short, long, default_value = "dataset/district.csv")]
        input: String,

        /// CSV to write the geocoded table to
        #[arg(short, long, default_value = "dataset/district_with_coordinates.csv")]
        output: String,

        /// Country appended to every query
        #[arg(long, default_value = "Malaysia")]
        country: String,

        /// OpenWeather API key (falls back to OPENWEATHER_API_KEY)
        #[arg(long)]
        api_key: Option<String>,

        /// Minimum milliseconds between requests
        #[arg(long, default_value_t = 1000)]
        delay_ms: u64,

        /// Persist the table every N rows (0 = only at the end)
        #[arg(long, default_value_t = 0)]
        checkpoint_every: usize,

        /// Request timeout in seconds
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,
    },
    /// Fetch a year of daily weather per district and add yearly metrics
    Enrich {
        /// CSV with `state`, `district`, `lat` and `lon` columns
        #[arg(short, long, default_value = "dataset/district_with_information.csv")]
        input: String,

        /// CSV to write the enriched table to (overwritten at each checkpoint)
        #[arg(short, long, default_value = "dataset/district_with_weather_data.csv")]
        output: String,

        /// Calendar year to aggregate
        #[arg(short, long, default_value_t = 2024)]
        year: i32,

        /// Persist the table every N rows (0 = only at the end)
        #[arg(long, default_value_t = 10)]
        checkpoint_every: usize,

        /// Minimum milliseconds between requests
        #[arg(long, default_value_t = 500)]
        delay_ms: u64,

        /// Request timeout in seconds
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,

        /// JSON file mapping variable names to "mean" or "sum"
        #[arg(long)]
        metrics: Option<String>,
    },
    /// Fetch and print the yearly metrics for one location
    Inspect {
        #[arg(long, default_value = "Johor")]
        state: String,

        #[arg(long, default_value = "Batu Pahat")]
        district: String,

        #[arg(long, default_value_t = 1.8472584, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, default_value_t = 102.9346697, allow_negative_numbers = true)]
        lon: f64,

        /// Calendar year to aggregate
        #[arg(short, long, default_value_t = 2024)]
        year: i32,

        /// JSON file mapping variable names to "mean" or "sum"
        #[arg(long)]
        metrics: Option<String>,

        /// Print the metrics as JSON instead of CSV and breakdown
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/district_weather.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("district_weather.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

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

    let cli = Cli::parse();

    match cli.command {
        Commands::Geocode {
            input,
            output,
            country,
            api_key,
            delay_ms,
            checkpoint_every,
            timeout_secs,
        } => {
            let api_key = match api_key {
                Some(key) => key,
                None => std::env::var("OPENWEATHER_API_KEY")
                    .context("OPENWEATHER_API_KEY must be set or --api-key given")?,
            };

            let mut table = DistrictTable::load(&input)?;
            let mut sink = CsvSink::create(&output)?;
            info!(rows = table.len(), input = %input, "Geocoding districts");

            let client = BasicClient::new(Duration::from_secs(timeout_secs))?;
            let geocoder = OpenWeatherGeocoder::new(client, api_key);
            let config = PipelineConfig {
                checkpoint_every,
                delay: Duration::from_millis(delay_ms),
            };

            let report = geocode_table(&mut table, &geocoder, &country, &config, &mut sink).await?;
            info!(output = %sink.path().display(), "Saved results");
            print_geocode_summary(&report);
        }
        Commands::Enrich {
            input,
            output,
            year,
            checkpoint_every,
            delay_ms,
            timeout_secs,
            metrics,
        } => {
            let spec = metric_spec(metrics.as_deref())?;
            let query = WeatherQuery::calendar_year(year)?;

            let mut table = DistrictTable::load(&input)?;
            let mut sink = CsvSink::create(&output)?;
            info!(rows = table.len(), input = %input, year, "Found locations to process");

            let client = BasicClient::new(Duration::from_secs(timeout_secs))?;
            let source = OpenMeteoClient::new(client, query, &spec);
            let config = PipelineConfig {
                checkpoint_every,
                delay: Duration::from_millis(delay_ms),
            };

            let report = run(&mut table, &source, &spec, &config, &mut sink).await?;
            info!(output = %sink.path().display(), "All weather data fetched and saved");
            print_summary(
                &report,
                &table,
                &["state", "district", "temperature_2m_mean", "precipitation_sum"],
                5,
            )?;
        }
        Commands::Inspect {
            state,
            district,
            lat,
            lon,
            year,
            metrics,
            json,
        } => {
            let spec = metric_spec(metrics.as_deref())?;
            let query = WeatherQuery::calendar_year(year)?;
            info!(district = %district, state = %state, lat, lon, "Fetching weather data");

            let client = BasicClient::new(Duration::from_secs(30))?;
            let source = OpenMeteoClient::new(client, query, &spec);

            let payload = match source.daily(Coordinates { lat, lon }).await {
                Ok(payload) => payload,
                Err(e) => {
                    error!(error = %e, "Weather fetch failed");
                    bail!(e);
                }
            };
            let aggregated = enrich_with(&payload, &spec)?;

            if json {
                print_json(&aggregated)?;
            } else {
                let row = LocationRow {
                    state: &state,
                    district: &district,
                    lat,
                    lon,
                };
                print_location(&row, &spec, &aggregated)?;
            }
        }
    }

    Ok(())
}

fn metric_spec(path: Option<&str>) -> Result<MetricSpec> {
    match path {
        Some(path) => {
            let spec = load_metric_spec(path)?;
            info!(path, variables = spec.len(), "Loaded metric spec");
            Ok(spec)
        }
        None => Ok(daily_weather_spec()),
    }
}
