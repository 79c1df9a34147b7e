use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{
    DataType, TimeUnit, TimestampMicrosecondType, TimestampMillisecondType,
    TimestampNanosecondType, TimestampSecondType,
};
use chrono::NaiveDateTime;
use log::info;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::DataError;
use super::filter::apply_filter;
use super::model::{
    City, COL_BIRTH_YEAR, COL_END_STATION, COL_END_TIME, COL_GENDER, COL_START_STATION,
    COL_START_TIME, COL_TRIP_DURATION, REQUIRED_COLUMNS, TripFilter, TripRecord, TripTable,
};

/// Extensions tried, in order, when resolving a city to its source file.
const SOURCE_EXTENSIONS: [&str; 3] = ["csv", "parquet", "json"];

/// Timestamp layouts seen in the bundled datasets and common exports.
const TIMESTAMP_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M",
];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the trips of `city` from `data_dir` and keep those passing `filter`.
pub fn load_data(data_dir: &Path, city: City, filter: &TripFilter) -> Result<TripTable> {
    let path = resolve_source(data_dir, city)?;
    info!("loading {city} trips from {}", path.display());
    let table = load_file(&path).with_context(|| format!("loading {}", path.display()))?;
    info!("loaded {} trips", table.len());
    Ok(apply_filter(table, filter))
}

/// Find the source file for `city`: `<stem>.csv`, then `.parquet`, then
/// `.json`.
pub fn resolve_source(data_dir: &Path, city: City) -> Result<PathBuf, DataError> {
    SOURCE_EXTENSIONS
        .iter()
        .map(|ext| data_dir.join(format!("{}.{ext}", city.file_stem())))
        .find(|p| p.is_file())
        .ok_or_else(|| DataError::MissingSource {
            city: city.name().to_string(),
            dir: data_dir.display().to_string(),
        })
}

/// Load a trip table from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one trip per line
/// * `.parquet` – any column types, cast to text before parsing
/// * `.json`    – `[{ "Start Time": "...", "Trip Duration": 321, ... }, ...]`
pub fn load_file(path: &Path) -> Result<TripTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path).context("opening CSV")?;
            load_csv_reader(file)
        }
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        other => Err(DataError::UnsupportedExtension(other.to_string()).into()),
    }
}

/// Like [`load_file`] for CSV, but accepts any `Read` source.
pub fn load_csv_reader<R: Read>(reader: R) -> Result<TripTable> {
    let raw = read_csv(reader)?;
    Ok(build_table(raw)?)
}

// ---------------------------------------------------------------------------
// Raw text table shared by all formats
// ---------------------------------------------------------------------------

/// Column names plus one text cell per column per row. Blank cells are `None`.
struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

/// Whitespace-only cells count as blank; other cells keep their raw text.
fn blank_to_none(s: &str) -> Option<String> {
    if s.trim().is_empty() { None } else { Some(s.to_string()) }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names. The unnamed leading index
/// column of the bundled files is carried along and ignored.
fn read_csv<R: Read>(reader: R) -> Result<RawTable> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(blank_to_none).collect());
    }

    Ok(RawTable { headers, rows })
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON (`df.to_json(orient='records')`). Column order is
/// the order in which keys are first seen.
fn load_json(path: &Path) -> Result<TripTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).and_then(json_to_cell))
                .collect()
        })
        .collect();

    Ok(build_table(RawTable { headers, rows })?)
}

fn json_to_cell(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) => blank_to_none(s),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of trips. Every column is cast to Utf8 with arrow's
/// cast kernel, so timestamp, integer and float columns all parse the same
/// way as CSV text. Timezone-aware timestamps are read as their UTC wall
/// clock.
fn load_parquet(path: &Path) -> Result<TripTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows: Vec<Vec<Option<String>>> = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let offset = rows.len();
        rows.extend((0..batch.num_rows()).map(|_| Vec::with_capacity(headers.len())));

        for (col_idx, name) in headers.iter().enumerate() {
            let text = cast(&drop_timezone(batch.column(col_idx)), &DataType::Utf8)
                .with_context(|| format!("casting column {name:?} to text"))?;
            let Some(strings) = text.as_any().downcast_ref::<StringArray>() else {
                bail!("column {name:?} did not cast to a string array");
            };
            for row in 0..strings.len() {
                let cell = if strings.is_null(row) {
                    None
                } else {
                    blank_to_none(strings.value(row))
                };
                rows[offset + row].push(cell);
            }
        }
    }

    Ok(build_table(RawTable { headers, rows })?)
}

/// Clear the timezone of a timestamp column without touching its values.
/// Casting a zoned column to text would need a tz database for names like
/// "UTC", and offsets would render as "+02:00" suffixes.
fn drop_timezone(col: &ArrayRef) -> ArrayRef {
    match col.data_type() {
        DataType::Timestamp(TimeUnit::Second, Some(_)) => Arc::new(
            col.as_primitive::<TimestampSecondType>()
                .clone()
                .with_timezone_opt(None::<String>),
        ),
        DataType::Timestamp(TimeUnit::Millisecond, Some(_)) => Arc::new(
            col.as_primitive::<TimestampMillisecondType>()
                .clone()
                .with_timezone_opt(None::<String>),
        ),
        DataType::Timestamp(TimeUnit::Microsecond, Some(_)) => Arc::new(
            col.as_primitive::<TimestampMicrosecondType>()
                .clone()
                .with_timezone_opt(None::<String>),
        ),
        DataType::Timestamp(TimeUnit::Nanosecond, Some(_)) => Arc::new(
            col.as_primitive::<TimestampNanosecondType>()
                .clone()
                .with_timezone_opt(None::<String>),
        ),
        _ => Arc::clone(col),
    }
}

// ---------------------------------------------------------------------------
// RawTable → TripTable
// ---------------------------------------------------------------------------

fn build_table(raw: RawTable) -> Result<TripTable, DataError> {
    let position = |name: &str| raw.headers.iter().position(|h| h == name);

    let mut required = [0usize; REQUIRED_COLUMNS.len()];
    for (slot, name) in required.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = position(name).ok_or_else(|| DataError::MissingColumn(name.to_string()))?;
    }
    let [start_idx, duration_idx, start_station_idx, end_station_idx, user_type_idx] = required;
    let end_idx = position(COL_END_TIME);
    let gender_idx = position(COL_GENDER);
    let birth_year_idx = position(COL_BIRTH_YEAR);

    let mut trips = Vec::with_capacity(raw.rows.len());

    for (row, cells) in raw.rows.into_iter().enumerate() {
        let cell = |idx: usize| cells.get(idx).and_then(|c| c.as_deref());
        let non_empty = |idx: usize, column: &str| {
            cell(idx).ok_or_else(|| DataError::EmptyCell {
                row,
                column: column.to_string(),
            })
        };

        let start_text = non_empty(start_idx, COL_START_TIME)?;
        let start_time = parse_timestamp(start_text).ok_or_else(|| DataError::BadTimestamp {
            row,
            value: start_text.to_string(),
        })?;
        let end_time = match end_idx.and_then(cell) {
            Some(text) => Some(parse_timestamp(text).ok_or_else(|| DataError::BadTimestamp {
                row,
                value: text.to_string(),
            })?),
            None => None,
        };

        let duration_text = non_empty(duration_idx, COL_TRIP_DURATION)?;
        let trip_duration = parse_number(duration_text, row, COL_TRIP_DURATION)?;

        let birth_year = match birth_year_idx.and_then(cell) {
            Some(text) => Some(parse_number(text, row, COL_BIRTH_YEAR)?.trunc() as i64),
            None => None,
        };

        let mut trip = TripRecord {
            row,
            start_time,
            end_time,
            trip_duration,
            start_station: non_empty(start_station_idx, COL_START_STATION)?.to_string(),
            end_station: non_empty(end_station_idx, COL_END_STATION)?.to_string(),
            user_type: cell(user_type_idx).map(str::to_string),
            gender: gender_idx.and_then(cell).map(str::to_string),
            birth_year,
            month: 0,
            weekday: 0,
        };
        trip.derive_fields();
        trips.push(trip);
    }

    Ok(TripTable::new(
        trips,
        gender_idx.is_some(),
        birth_year_idx.is_some(),
    ))
}

/// Parse a start / end timestamp in any of [`TIMESTAMP_FORMATS`].
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s.trim(), fmt).ok())
}

fn parse_number(s: &str, row: usize, column: &str) -> Result<f64, DataError> {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| DataError::BadNumber {
            row,
            column: column.to_string(),
            value: s.to_string(),
        })
}
