//! Sequential enrichment passes over a [`DistrictTable`].
//!
//! Each record is fetched, enriched and merged by index, one at a time. Any
//! per-record failure is logged and skipped; only a failed persist ends the
//! run early.

use anyhow::Result;
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::enrich::enrich_with;
use crate::metrics::MetricSpec;
use crate::services::geocoding::{Geocoder, district_query};
use crate::services::WeatherSource;
use crate::table::{DistrictTable, TableSink};

/// Checkpoint and pacing policy shared by both passes.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Persist the whole table after every N processed records. `0` keeps
    /// only the final persist.
    pub checkpoint_every: usize,
    /// Minimum gap between the starts of two consecutive fetches.
    pub delay: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            checkpoint_every: 10,
            delay: Duration::from_millis(500),
        }
    }
}

/// Outcome counts for a weather enrichment run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub missing_coordinates: usize,
    pub fetch_failures: usize,
    pub enrich_failures: usize,
    pub persists: usize,
}

/// Outcome counts for a geocoding run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct GeocodeReport {
    pub total: usize,
    pub located: usize,
    pub not_found: usize,
    pub failed: usize,
    pub persists: usize,
}

/// Enforces the minimum gap between fetches.
struct Pacer {
    delay: Duration,
    last: Option<Instant>,
}

impl Pacer {
    fn new(delay: Duration) -> Self {
        Self { delay, last: None }
    }

    async fn wait(&mut self) {
        if let Some(last) = self.last {
            if !self.delay.is_zero() {
                tokio::time::sleep_until(last + self.delay).await;
            }
        }
        self.last = Some(Instant::now());
    }
}

fn checkpoint_due(processed: usize, every: usize) -> bool {
    every > 0 && processed % every == 0
}

/// Fetches and aggregates daily weather for every record with coordinates.
///
/// Metric columns for every `spec` variable are added up front, so rows that
/// are skipped keep whatever those cells held before (empty when new).
pub async fn run<S, K>(
    table: &mut DistrictTable,
    source: &S,
    spec: &MetricSpec,
    config: &PipelineConfig,
    sink: &mut K,
) -> Result<PipelineReport>
where
    S: WeatherSource + ?Sized,
    K: TableSink + ?Sized,
{
    table.ensure_columns(spec.names());

    let total = table.len();
    let mut report = PipelineReport {
        total,
        ..Default::default()
    };
    let mut pacer = Pacer::new(config.delay);

    for idx in 0..total {
        let record = &table.records()[idx];
        let label = record.label();
        let coordinates = record.coordinates();
        info!(row = idx + 1, total, district = %label, "Processing");

        match coordinates {
            None => {
                warn!(district = %label, "Missing coordinates, skipping");
                report.missing_coordinates += 1;
                report.failed += 1;
            }
            Some(at) => {
                pacer.wait().await;
                match source.daily(at).await {
                    Err(e) => {
                        warn!(district = %label, lat = at.lat, lon = at.lon, error = %e, "Weather fetch failed, skipping");
                        report.fetch_failures += 1;
                        report.failed += 1;
                    }
                    Ok(payload) => match enrich_with(&payload, spec) {
                        Ok(metrics) => {
                            table.merge_metrics(idx, metrics);
                            report.succeeded += 1;
                            info!(district = %label, "Weather metrics updated");
                        }
                        Err(e) => {
                            warn!(district = %label, error = %e, "Weather payload unusable, skipping");
                            report.enrich_failures += 1;
                            report.failed += 1;
                        }
                    },
                }
            }
        }

        if checkpoint_due(idx + 1, config.checkpoint_every) {
            sink.persist(table)?;
            report.persists += 1;
            info!(processed = idx + 1, total, "Checkpoint saved");
        }
    }

    sink.persist(table)?;
    report.persists += 1;
    debug!(?report, "Enrichment finished");

    Ok(report)
}

/// Resolves `lat`/`lon` for every record from "district, state, country".
///
/// A record with no geocoder result or a failed request gets empty
/// coordinates; neither stops the run.
pub async fn geocode_table<G, K>(
    table: &mut DistrictTable,
    geocoder: &G,
    country: &str,
    config: &PipelineConfig,
    sink: &mut K,
) -> Result<GeocodeReport>
where
    G: Geocoder + ?Sized,
    K: TableSink + ?Sized,
{
    let total = table.len();
    let mut report = GeocodeReport {
        total,
        ..Default::default()
    };
    let mut pacer = Pacer::new(config.delay);

    for idx in 0..total {
        let record = &table.records()[idx];
        let query = district_query(&record.district, &record.state, country);
        let label = record.label();

        pacer.wait().await;
        let found = match geocoder.locate(&query).await {
            Ok(Some(at)) => {
                info!(district = %label, lat = at.lat, lon = at.lon, "Found coordinates");
                report.located += 1;
                Some(at)
            }
            Ok(None) => {
                warn!(district = %label, "No coordinates found");
                report.not_found += 1;
                None
            }
            Err(e) => {
                warn!(district = %label, error = %e, "Geocoding request failed");
                report.failed += 1;
                None
            }
        };
        table.set_coordinates(idx, found);

        if checkpoint_due(idx + 1, config.checkpoint_every) {
            sink.persist(table)?;
            report.persists += 1;
            info!(processed = idx + 1, total, "Checkpoint saved");
        }
    }

    sink.persist(table)?;
    report.persists += 1;

    Ok(report)
}
