//! CSV loading and row normalization for the KIKA incident dataset.
//!
//! Reads the SiND aid-worker KIKA export, drops the artifact row that follows
//! the header and converts every remaining row into an [`IncidentRecord`].

use std::io::Read;
use std::path::Path;
use std::time::Instant;

use csv::StringRecord;
use kika_core::error::{KikaError, Result};
use kika_core::models::{CasualtyCounts, Category, IncidentRecord, ParsePolicy};
use kika_core::time_utils::parse_date;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

// ── Columns ───────────────────────────────────────────────────────────────────

pub const COL_DATE: &str = "Date";
pub const COL_COUNTRY: &str = "Country";
pub const COL_COUNTRY_ISO: &str = "Country ISO";
pub const COL_ADMIN1: &str = "Admin 1";
pub const COL_LATITUDE: &str = "Latitude";
pub const COL_LONGITUDE: &str = "Longitude";
pub const COL_ACTOR: &str = "Actor Name";
pub const COL_EVENT_ID: &str = "SiND Event ID";

/// Header columns the normalizer needs. Order in the file is free and extra
/// columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 12] = [
    COL_DATE,
    "Aid Workers Killed",
    "Aid Workers Injured",
    "Aid Workers Kidnapped",
    "Aid Workers Arrested",
    COL_COUNTRY,
    COL_COUNTRY_ISO,
    COL_ADMIN1,
    COL_LATITUDE,
    COL_LONGITUDE,
    COL_ACTOR,
    COL_EVENT_ID,
];

/// Positions of the required columns within one header row.
#[derive(Debug, Clone)]
struct ColumnIndex {
    date: usize,
    counts: [usize; 4],
    country: usize,
    country_code: usize,
    admin1: usize,
    latitude: usize,
    longitude: usize,
    actor_name: usize,
    event_id: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| KikaError::MissingColumn(name.to_string()))
        };

        Ok(Self {
            date: find(COL_DATE)?,
            counts: [
                find(Category::Killed.column())?,
                find(Category::Injured.column())?,
                find(Category::Kidnapped.column())?,
                find(Category::Arrested.column())?,
            ],
            country: find(COL_COUNTRY)?,
            country_code: find(COL_COUNTRY_ISO)?,
            admin1: find(COL_ADMIN1)?,
            latitude: find(COL_LATITUDE)?,
            longitude: find(COL_LONGITUDE)?,
            actor_name: find(COL_ACTOR)?,
            event_id: find(COL_EVENT_ID)?,
        })
    }
}

// ── Public types ──────────────────────────────────────────────────────────────

/// Bookkeeping produced alongside the normalized records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadReport {
    /// Data rows read after the header, including the artifact row.
    pub rows_read: usize,
    /// Rows dropped because they are the known artifact after the header.
    pub artifact_rows_dropped: usize,
    /// Rows dropped by [`ParsePolicy::Skip`] / [`ParsePolicy::ZeroFill`].
    pub rows_skipped: usize,
    /// Count cells replaced by 0 under [`ParsePolicy::ZeroFill`].
    pub counts_zero_filled: usize,
    /// Wall-clock seconds spent reading and normalizing.
    pub load_time_seconds: f64,
}

/// Records in source order plus the [`LoadReport`] for the load.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub records: Vec<IncidentRecord>,
    pub report: LoadReport,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load and normalize the incident CSV at `path`.
pub fn load_incidents(path: &Path, policy: ParsePolicy) -> Result<LoadOutcome> {
    if !path.exists() {
        return Err(KikaError::DataPathNotFound(path.to_path_buf()));
    }

    let file = std::fs::File::open(path).map_err(|source| KikaError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let outcome = read_incidents(std::io::BufReader::new(file), policy)?;
    info!(
        "Loaded {} incidents from {} ({} skipped)",
        outcome.records.len(),
        path.display(),
        outcome.report.rows_skipped
    );
    Ok(outcome)
}

/// Normalize CSV text held in memory.
pub fn read_incidents_from_str(data: &str, policy: ParsePolicy) -> Result<LoadOutcome> {
    read_incidents(data.as_bytes(), policy)
}

/// Normalize CSV from any reader.
///
/// The header row is required. The first data row is discarded unread; every
/// following row becomes one [`IncidentRecord`], in source order. How
/// malformed rows are handled is decided by `policy`.
pub fn read_incidents<R: Read>(reader: R, policy: ParsePolicy) -> Result<LoadOutcome> {
    let start = Instant::now();
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let columns = ColumnIndex::from_headers(&headers)?;

    let mut records = Vec::new();
    let mut report = LoadReport::default();

    for (row, result) in rdr.records().enumerate() {
        report.rows_read += 1;

        if row == 0 {
            report.artifact_rows_dropped += 1;
            debug!("dropping artifact row after header");
            continue;
        }

        let normalized = result
            .map_err(KikaError::from)
            .and_then(|raw| normalize_row(row, &raw, &columns, policy, &mut report));

        match normalized {
            Ok(record) => records.push(record),
            Err(e) if policy == ParsePolicy::Abort => return Err(e),
            Err(e) => {
                warn!("Skipping row {}: {}", row, e);
                report.rows_skipped += 1;
            }
        }
    }

    report.load_time_seconds = start.elapsed().as_secs_f64();
    debug!(
        "Normalized {} of {} rows in {:.3}s",
        records.len(),
        report.rows_read,
        report.load_time_seconds
    );

    Ok(LoadOutcome { records, report })
}

/// Parse a count cell into a non-negative integer.
///
/// Accepts integer text and integral float text (`"3.0"`); rejects empty,
/// negative, fractional and non-numeric values.
///
/// ```
/// use kika_data::reader::parse_count;
///
/// assert_eq!(parse_count("4"), Some(4));
/// assert_eq!(parse_count(" 2.0 "), Some(2));
/// assert_eq!(parse_count("1.5"), None);
/// assert_eq!(parse_count(""), None);
/// ```
pub fn parse_count(s: &str) -> Option<u32> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(n) = trimmed.parse::<u32>() {
        return Some(n);
    }
    let f = trimmed.parse::<f64>().ok()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX) {
        Some(f as u32)
    } else {
        None
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn field<'a>(raw: &'a StringRecord, index: usize) -> &'a str {
    raw.get(index).map(str::trim).unwrap_or("")
}

/// Convert one raw CSV row into an [`IncidentRecord`].
///
/// Only the date and the counts can fail a row. Blank or non-numeric
/// coordinates become `None`.
fn normalize_row(
    row: usize,
    raw: &StringRecord,
    columns: &ColumnIndex,
    policy: ParsePolicy,
    report: &mut LoadReport,
) -> Result<IncidentRecord> {
    let date_text = field(raw, columns.date);
    let date = parse_date(date_text).ok_or_else(|| KikaError::parse(row, COL_DATE, date_text))?;

    let mut values = [0u32; 4];
    let mut zero_filled = 0;
    for (slot, (category, index)) in values
        .iter_mut()
        .zip(Category::ALL.iter().zip(columns.counts.iter()))
    {
        let text = field(raw, *index);
        *slot = match parse_count(text) {
            Some(n) => n,
            None if policy == ParsePolicy::ZeroFill => {
                debug!("row {}: {} {:?} treated as 0", row, category.column(), text);
                zero_filled += 1;
                0
            }
            None => return Err(KikaError::parse(row, category.column(), text)),
        };
    }
    let counts = CasualtyCounts::new(values[0], values[1], values[2], values[3]);

    let mut record = IncidentRecord::new(field(raw, columns.event_id), date, counts)
        .with_location(
            field(raw, columns.country),
            field(raw, columns.country_code),
            field(raw, columns.admin1),
        )
        .with_actor(field(raw, columns.actor_name));
    record.latitude = parse_coordinate(row, COL_LATITUDE, field(raw, columns.latitude));
    record.longitude = parse_coordinate(row, COL_LONGITUDE, field(raw, columns.longitude));

    report.counts_zero_filled += zero_filled;
    Ok(record)
}

fn parse_coordinate(row: usize, name: &str, text: &str) -> Option<f64> {
    let value = text.parse::<f64>().ok().filter(|v| v.is_finite());
    if value.is_none() && !text.is_empty() {
        debug!("row {}: {} {:?} is not a coordinate", row, name, text);
    }
    value
}

// ── Tests ─────────────────────────────────────────────────────────────────────
