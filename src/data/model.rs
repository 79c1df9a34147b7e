use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDateTime, Timelike};

use super::DataError;

// ---------------------------------------------------------------------------
// Column names – fixed contract with the bundled datasets
// ---------------------------------------------------------------------------

pub const COL_START_TIME: &str = "Start Time";
pub const COL_END_TIME: &str = "End Time";
pub const COL_TRIP_DURATION: &str = "Trip Duration";
pub const COL_START_STATION: &str = "Start Station";
pub const COL_END_STATION: &str = "End Station";
pub const COL_USER_TYPE: &str = "User Type";
pub const COL_GENDER: &str = "Gender";
pub const COL_BIRTH_YEAR: &str = "Birth Year";

/// Columns every source must carry.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    COL_START_TIME,
    COL_TRIP_DURATION,
    COL_START_STATION,
    COL_END_STATION,
    COL_USER_TYPE,
];

/// Month names as accepted by the selector, in calendar order.
pub const MONTHS: [&str; 6] = ["january", "february", "march", "april", "may", "june"];

/// Weekday names as accepted by the selector, Monday first.
pub const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

// ---------------------------------------------------------------------------
// City – the immutable city → source lookup
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum City {
    Chicago,
    NewYorkCity,
    Washington,
}

impl City {
    pub const ALL: [City; 3] = [City::Chicago, City::NewYorkCity, City::Washington];

    /// Name as typed by the user.
    pub fn name(self) -> &'static str {
        match self {
            City::Chicago => "chicago",
            City::NewYorkCity => "new york city",
            City::Washington => "washington",
        }
    }

    /// File stem of the bundled source, without extension.
    pub fn file_stem(self) -> &'static str {
        match self {
            City::Chicago => "chicago",
            City::NewYorkCity => "new_york_city",
            City::Washington => "washington",
        }
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for City {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        City::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| DataError::UnknownCity(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// TripFilter – month / weekday selection
// ---------------------------------------------------------------------------

/// Equality filter over the derived month and weekday fields.
/// `None` means "all" (identity).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TripFilter {
    /// Calendar month, 1-based.
    pub month: Option<u32>,
    /// Weekday index, Monday = 0.
    pub weekday: Option<u32>,
}

impl TripFilter {
    /// Build a filter from validated selector strings ("all" or a name from
    /// [`MONTHS`] / [`WEEKDAYS`]).
    pub fn from_names(month: &str, weekday: &str) -> Result<Self, DataError> {
        let month = match month {
            "all" => None,
            m => {
                let idx = MONTHS
                    .iter()
                    .position(|&name| name == m)
                    .ok_or_else(|| DataError::UnknownMonth(m.to_string()))?;
                Some(idx as u32 + 1)
            }
        };
        let weekday = match weekday {
            "all" => None,
            d => {
                let idx = WEEKDAYS
                    .iter()
                    .position(|&name| name == d)
                    .ok_or_else(|| DataError::UnknownWeekday(d.to_string()))?;
                Some(idx as u32)
            }
        };
        Ok(TripFilter { month, weekday })
    }

    pub fn is_identity(&self) -> bool {
        self.month.is_none() && self.weekday.is_none()
    }

    pub fn matches(&self, trip: &TripRecord) -> bool {
        self.month.map_or(true, |m| trip.month == m)
            && self.weekday.map_or(true, |d| trip.weekday == d)
    }
}

// ---------------------------------------------------------------------------
// TripRecord – one row of the source table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct TripRecord {
    /// Position of the row in the source file, 0-based.
    pub row: usize,
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    /// Seconds.
    pub trip_duration: f64,
    pub start_station: String,
    pub end_station: String,
    pub user_type: Option<String>,
    pub gender: Option<String>,
    pub birth_year: Option<i64>,
    /// Derived from `start_time`, 1–12.
    pub month: u32,
    /// Derived from `start_time`, Monday = 0.
    pub weekday: u32,
}

impl TripRecord {
    /// Recompute `month` and `weekday` from `start_time`.
    pub fn derive_fields(&mut self) {
        self.month = self.start_time.month();
        self.weekday = self.start_time.weekday().num_days_from_monday();
    }

    pub fn hour(&self) -> u32 {
        self.start_time.hour()
    }

    /// "<start station> - <end station>".
    pub fn route(&self) -> String {
        format!("{} - {}", self.start_station, self.end_station)
    }
}

// ---------------------------------------------------------------------------
// TripTable – the loaded (and possibly filtered) dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct TripTable {
    pub trips: Vec<TripRecord>,
    /// Whether the source schema carried a Gender column.
    pub has_gender: bool,
    /// Whether the source schema carried a Birth Year column.
    pub has_birth_year: bool,
}

impl TripTable {
    pub fn new(trips: Vec<TripRecord>, has_gender: bool, has_birth_year: bool) -> Self {
        TripTable {
            trips,
            has_gender,
            has_birth_year,
        }
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    /// Rows `[start, start + len)`, clamped to the table. Past the end yields
    /// an empty slice.
    pub fn page(&self, start: usize, len: usize) -> &[TripRecord] {
        let start = start.min(self.trips.len());
        let end = start.saturating_add(len).min(self.trips.len());
        &self.trips[start..end]
    }
}
