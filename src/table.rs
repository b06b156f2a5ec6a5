//! The district table: CSV load, in-place updates, and overwrite persist.
//!
//! Rows keep every input cell so columns this tool does not know about are
//! written back unchanged. Coordinates and metrics are merged by row index.

use anyhow::{Context, Result, bail};
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::metrics::AggregatedMetrics;
use crate::services::Coordinates;

pub const STATE_COLUMN: &str = "state";
pub const DISTRICT_COLUMN: &str = "district";
pub const LAT_COLUMN: &str = "lat";
pub const LON_COLUMN: &str = "lon";

/// One district row.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationRecord {
    pub state: String,
    pub district: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// Set once enrichment for this row has succeeded in the current run.
    pub metrics: Option<AggregatedMetrics>,
    cells: Vec<String>,
}

impl LocationRecord {
    pub fn coordinates(&self) -> Option<Coordinates> {
        Some(Coordinates {
            lat: self.lat?,
            lon: self.lon?,
        })
    }

    /// Human-readable "district, state".
    pub fn label(&self) -> String {
        format!("{}, {}", self.district, self.state)
    }
}

/// Header row plus records, with cells aligned to the header.
#[derive(Debug, Clone, PartialEq)]
pub struct DistrictTable {
    headers: Vec<String>,
    records: Vec<LocationRecord>,
}

impl DistrictTable {
    /// Reads a table from a CSV file. Fails if `state` or `district` is missing
    /// or a row has more fields than the header; short rows are padded.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = fs::File::open(path)
            .with_context(|| format!("failed to open input table {}", path.display()))?;
        Self::from_reader(file).with_context(|| format!("failed to read {}", path.display()))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();

        let position = |name: &str| headers.iter().position(|h| h == name);
        let (Some(state_idx), Some(district_idx)) =
            (position(STATE_COLUMN), position(DISTRICT_COLUMN))
        else {
            bail!("table must have '{STATE_COLUMN}' and '{DISTRICT_COLUMN}' columns");
        };
        let lat_idx = position(LAT_COLUMN);
        let lon_idx = position(LON_COLUMN);

        let mut records = Vec::new();
        for (row, result) in rdr.records().enumerate() {
            let raw = result?;
            if raw.len() > headers.len() {
                bail!(
                    "row {} has {} fields but the header has {}",
                    row + 1,
                    raw.len(),
                    headers.len()
                );
            }
            let mut cells: Vec<String> = raw.iter().map(str::to_string).collect();
            cells.resize(headers.len(), String::new());

            let state = cells[state_idx].clone();
            let district = cells[district_idx].clone();
            let lat = lat_idx.and_then(|i| parse_coordinate(&cells[i], row, LAT_COLUMN));
            let lon = lon_idx.and_then(|i| parse_coordinate(&cells[i], row, LON_COLUMN));

            records.push(LocationRecord {
                state,
                district,
                lat,
                lon,
                metrics: None,
                cells,
            });
        }

        debug!(rows = records.len(), columns = headers.len(), "Table loaded");
        Ok(Self { headers, records })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[LocationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Cell text for `column` in row `index`.
    pub fn cell(&self, index: usize, column: &str) -> Option<&str> {
        let col = self.headers.iter().position(|h| h == column)?;
        self.records.get(index).map(|r| r.cells[col].as_str())
    }

    /// Appends `name` as an empty column unless it already exists.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(i) = self.headers.iter().position(|h| h == name) {
            return i;
        }
        self.headers.push(name.to_string());
        for record in &mut self.records {
            record.cells.push(String::new());
        }
        self.headers.len() - 1
    }

    pub fn ensure_columns<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        for name in names {
            self.ensure_column(name);
        }
    }

    /// Writes geocoding output into row `index`; `None` clears both cells.
    pub fn set_coordinates(&mut self, index: usize, coordinates: Option<Coordinates>) {
        let lat_col = self.ensure_column(LAT_COLUMN);
        let lon_col = self.ensure_column(LON_COLUMN);
        let Some(record) = self.records.get_mut(index) else {
            return;
        };

        record.lat = coordinates.map(|c| c.lat);
        record.lon = coordinates.map(|c| c.lon);
        record.cells[lat_col] = format_value(record.lat);
        record.cells[lon_col] = format_value(record.lon);
    }

    /// Merges enrichment output into row `index`, one column per metric.
    pub fn merge_metrics(&mut self, index: usize, metrics: AggregatedMetrics) {
        if index >= self.records.len() {
            return;
        }
        for (name, value) in metrics.iter() {
            let col = self.ensure_column(name);
            self.records[index].cells[col] = format_value(value);
        }
        self.records[index].metrics = Some(metrics);
    }

    /// Writes header and rows as CSV.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = WriterBuilder::new().from_writer(writer);
        wtr.write_record(&self.headers)?;
        for record in &self.records {
            wtr.write_record(&record.cells)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Renders an optional value as a CSV cell; `None` is an empty cell.
pub fn format_value(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn parse_coordinate(cell: &str, row: usize, column: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => {
            warn!(row, column, value = cell, "Unparseable coordinate, treating as missing");
            None
        }
    }
}

/// Destination for full-table persists.
pub trait TableSink {
    fn persist(&mut self, table: &DistrictTable) -> Result<()>;
}

/// Overwrites a CSV file with the whole table on every persist.
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    /// Creates parent directories and checks the file can be opened for
    /// writing. Existing contents are left alone until the first persist.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        OpenOptions::new()
            .append(true)
            .create(true)
            .open(&path)
            .with_context(|| format!("failed to open output table {}", path.display()))?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TableSink for CsvSink {
    fn persist(&mut self, table: &DistrictTable) -> Result<()> {
        let file = fs::File::create(&self.path)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        table.write_to(file)?;
        debug!(path = %self.path.display(), rows = table.len(), "Table persisted");
        Ok(())
    }
}
