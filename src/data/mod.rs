/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  chicago.csv / new_york_city.csv / washington.csv  (.parquet / .json)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → TripTable (month / weekday derived)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ TripTable │  Vec<TripRecord>, optional-column flags
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  month / weekday equality → filtered TripTable
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("unknown city {0:?}")]
    UnknownCity(String),

    #[error("unknown month {0:?}")]
    UnknownMonth(String),

    #[error("unknown weekday {0:?}")]
    UnknownWeekday(String),

    #[error("no trip data for {city} in {dir}")]
    MissingSource { city: String, dir: String },

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("missing required column {0:?}")]
    MissingColumn(String),

    #[error("row {row}: column {column:?} is empty")]
    EmptyCell { row: usize, column: String },

    #[error("row {row}: {value:?} is not a valid timestamp")]
    BadTimestamp { row: usize, value: String },

    #[error("row {row}: column {column:?} value {value:?} is not a number")]
    BadNumber {
        row: usize,
        column: String,
        value: String,
    },
}
