//! Operator-facing rendering of metrics and run summaries.
//!
//! Everything goes through `tracing` so it lands in both the console and the
//! JSON log file.

use anyhow::{Result, anyhow};
use csv::WriterBuilder;
use serde::Serialize;
use tracing::info;

use crate::metrics::{AggregatedMetrics, MetricSpec};
use crate::pipeline::{GeocodeReport, PipelineReport};
use crate::table::{DistrictTable, format_value};

/// Display name and unit for the known daily variables.
static DISPLAY: &[(&str, &str, &str)] = &[
    ("uv_index_max", "UV Index Max", ""),
    ("temperature_2m_mean", "Temperature Mean", "°C"),
    ("cloud_cover_mean", "Cloud Cover Mean", "%"),
    ("relative_humidity_2m_mean", "Relative Humidity Mean", "%"),
    ("sunshine_duration", "Sunshine Duration", "seconds"),
    ("precipitation_sum", "Precipitation Sum", "mm"),
    ("et0_fao_evapotranspiration", "ET0 FAO Evapotranspiration", "mm"),
    ("temperature_2m_min", "Temperature Min", "°C"),
    ("temperature_2m_max", "Temperature Max", "°C"),
    ("shortwave_radiation_sum", "Shortwave Radiation Sum", "MJ/m²"),
];

/// Identifying columns of a single-location CSV row.
#[derive(Debug, Clone)]
pub struct LocationRow<'a> {
    pub state: &'a str,
    pub district: &'a str,
    pub lat: f64,
    pub lon: f64,
}

/// Header line for a single-location CSV row.
pub fn csv_header(spec: &MetricSpec) -> Result<String> {
    let cells: Vec<&str> = ["state", "district", "lat", "lon"]
        .into_iter()
        .chain(spec.names())
        .collect();
    csv_record(&cells)
}

/// One CSV line with the metric values in spec order.
pub fn csv_line(
    row: &LocationRow<'_>,
    spec: &MetricSpec,
    metrics: &AggregatedMetrics,
) -> Result<String> {
    let mut cells = vec![
        row.state.to_string(),
        row.district.to_string(),
        row.lat.to_string(),
        row.lon.to_string(),
    ];
    cells.extend(spec.names().map(|name| format_value(metrics.value(name))));
    csv_record(&cells)
}

/// Encodes one record, quoting as needed, without the line terminator.
fn csv_record<T: AsRef<[u8]>>(cells: &[T]) -> Result<String> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(cells)?;
    let bytes = writer.into_inner().map_err(|e| anyhow!(e.to_string()))?;
    let line = String::from_utf8(bytes)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// One human-readable line per metric, e.g. `Precipitation Sum (total): 2710.4 mm`.
pub fn breakdown_lines(spec: &MetricSpec, metrics: &AggregatedMetrics) -> Vec<String> {
    spec.iter()
        .map(|(name, reducer)| {
            let (label, unit) = DISPLAY
                .iter()
                .find(|(n, _, _)| *n == name)
                .map(|(_, label, unit)| (*label, *unit))
                .unwrap_or((name, ""));

            let value = match metrics.value(name) {
                None => "n/a".to_string(),
                Some(v) if name == "sunshine_duration" => {
                    format!("{v} {unit} ({:.2} hours)", v / 3600.0)
                }
                Some(v) if unit.is_empty() => v.to_string(),
                Some(v) => format!("{v} {unit}"),
            };

            format!("{label} ({}): {value}", reducer.label())
        })
        .collect()
}

/// Logs the CSV header, the CSV row, and the detailed breakdown for one location.
pub fn print_location(
    row: &LocationRow<'_>,
    spec: &MetricSpec,
    metrics: &AggregatedMetrics,
) -> Result<()> {
    info!("CSV Header: {}", csv_header(spec)?);
    info!("CSV Data: {}", csv_line(row, spec, metrics)?);
    info!(
        state = row.state,
        district = row.district,
        lat = row.lat,
        lon = row.lon,
        "Detailed breakdown"
    );
    for line in breakdown_lines(spec, metrics) {
        info!("{line}");
    }
    Ok(())
}

/// Logs any serializable value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Logs the end-of-run totals and the first `sample` rows of `columns`.
pub fn print_summary(
    report: &PipelineReport,
    table: &DistrictTable,
    columns: &[&str],
    sample: usize,
) -> Result<()> {
    info!(
        total = report.total,
        succeeded = report.succeeded,
        failed = report.failed,
        missing_coordinates = report.missing_coordinates,
        fetch_failures = report.fetch_failures,
        enrich_failures = report.enrich_failures,
        "Enrichment summary"
    );

    for line in preview_lines(table, columns, sample)? {
        info!("{line}");
    }
    Ok(())
}

pub fn print_geocode_summary(report: &GeocodeReport) {
    info!(
        located = report.located,
        total = report.total,
        not_found = report.not_found,
        failed = report.failed,
        "Successfully geocoded {}/{} districts",
        report.located,
        report.total
    );
}

/// CSV header plus up to `limit` rows of the chosen columns.
pub fn preview_lines(table: &DistrictTable, columns: &[&str], limit: usize) -> Result<Vec<String>> {
    let mut lines = vec![csv_record(columns)?];
    for idx in 0..table.len().min(limit) {
        let row: Vec<&str> = columns
            .iter()
            .map(|c| table.cell(idx, c).unwrap_or(""))
            .collect();
        lines.push(csv_record(&row)?);
    }
    Ok(lines)
}
