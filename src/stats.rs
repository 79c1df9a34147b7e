use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use chrono::Month;
use log::debug;

use crate::data::model::{TripTable, WEEKDAYS};

/// Descriptive statistics over a filtered [`TripTable`].
///
/// Each group is an independent read-only pass. Results are wrapped in
/// [`Timed`] so the reporter can print how long the pass took: a statistic
/// plus the wall-clock time spent computing it.
#[derive(Debug, Clone)]
pub struct Timed<T> {
    pub value: T,
    pub elapsed: Duration,
}

fn timed<T>(label: &str, f: impl FnOnce() -> T) -> Timed<T> {
    let started = Instant::now();
    let value = f();
    let elapsed = started.elapsed();
    debug!("{label} took {elapsed:?}");
    Timed { value, elapsed }
}

// ---------------------------------------------------------------------------
// Frequency helpers
// ---------------------------------------------------------------------------

/// Most frequent value. Ties go to the smallest value in natural order.
pub fn mode<T, I>(values: I) -> Option<T>
where
    T: Ord,
    I: IntoIterator<Item = T>,
{
    let mut counts: BTreeMap<T, usize> = BTreeMap::new();
    for v in values {
        *counts.entry(v).or_default() += 1;
    }
    let mut best: Option<(T, usize)> = None;
    // Ascending iteration; strict `>` keeps the first of equal counts.
    for (value, count) in counts {
        if best.as_ref().map_or(true, |(_, c)| count > *c) {
            best = Some((value, count));
        }
    }
    best.map(|(v, _)| v)
}

/// Count of each distinct value, highest count first, ties by value.
pub fn value_counts<T, I>(values: I) -> Vec<(T, usize)>
where
    T: Ord,
    I: IntoIterator<Item = T>,
{
    let mut counts: BTreeMap<T, usize> = BTreeMap::new();
    for v in values {
        *counts.entry(v).or_default() += 1;
    }
    let mut out: Vec<(T, usize)> = counts.into_iter().collect();
    // Stable sort keeps ascending value order within equal counts.
    out.sort_by(|a, b| b.1.cmp(&a.1));
    out
}

// ---------------------------------------------------------------------------
// Time of travel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeStats {
    /// Most common month, e.g. "June".
    pub popular_month: Option<String>,
    /// Label for the most common weekday index, looked up at `index - 1`
    /// in [`WEEKDAYS`] (wrapping), so index 0 (Monday) reads "sunday".
    pub popular_day: Option<&'static str>,
    /// Most common start hour, 0–23.
    pub popular_hour: Option<u32>,
}

/// Label lookup used for the popular weekday: one position behind the
/// weekday index, with -1 wrapping to the end of the list.
pub fn shifted_weekday_label(index: u32) -> &'static str {
    let len = WEEKDAYS.len();
    WEEKDAYS[(index as usize + len - 1) % len]
}

fn month_name(month: u32) -> String {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name().to_string())
        .unwrap_or_else(|| month.to_string())
}

pub fn time_stats(table: &TripTable) -> Timed<TimeStats> {
    timed("time stats", || {
        let popular_month = mode(table.trips.iter().map(|t| month_name(t.month)));
        let popular_day = mode(table.trips.iter().map(|t| t.weekday)).map(shifted_weekday_label);
        let popular_hour = mode(table.trips.iter().map(|t| t.hour()));
        TimeStats {
            popular_month,
            popular_day,
            popular_hour,
        }
    })
}

// ---------------------------------------------------------------------------
// Stations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationStats {
    pub popular_start: Option<String>,
    pub popular_end: Option<String>,
    /// Most common "<start> - <end>" pair.
    pub popular_route: Option<String>,
}

pub fn station_stats(table: &TripTable) -> Timed<StationStats> {
    timed("station stats", || StationStats {
        popular_start: mode(table.trips.iter().map(|t| t.start_station.as_str()))
            .map(str::to_string),
        popular_end: mode(table.trips.iter().map(|t| t.end_station.as_str())).map(str::to_string),
        popular_route: mode(table.trips.iter().map(|t| t.route())),
    })
}

// ---------------------------------------------------------------------------
// Trip duration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct DurationStats {
    /// Seconds.
    pub total: f64,
    /// Seconds; NaN for an empty table.
    pub mean: f64,
}

pub fn trip_duration_stats(table: &TripTable) -> Timed<DurationStats> {
    timed("trip duration stats", || {
        let total: f64 = table.trips.iter().map(|t| t.trip_duration).sum();
        let mean = if table.is_empty() {
            f64::NAN
        } else {
            total / table.len() as f64
        };
        DurationStats { total, mean }
    })
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BirthYearStats {
    pub earliest: i64,
    pub most_recent: i64,
    pub most_common: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserStats {
    pub user_types: Vec<(String, usize)>,
    /// `None` when the source has no Gender column.
    pub genders: Option<Vec<(String, usize)>>,
    /// `None` when the source has no Birth Year column, or every value in it
    /// is blank.
    pub birth_years: Option<BirthYearStats>,
}

pub fn user_stats(table: &TripTable) -> Timed<UserStats> {
    timed("user stats", || {
        let owned = |counts: Vec<(&str, usize)>| {
            counts
                .into_iter()
                .map(|(v, n)| (v.to_string(), n))
                .collect::<Vec<_>>()
        };

        let user_types = owned(value_counts(
            table.trips.iter().filter_map(|t| t.user_type.as_deref()),
        ));

        let genders = table.has_gender.then(|| {
            owned(value_counts(
                table.trips.iter().filter_map(|t| t.gender.as_deref()),
            ))
        });

        let birth_years = if table.has_birth_year {
            let years: Vec<i64> = table.trips.iter().filter_map(|t| t.birth_year).collect();
            match (years.iter().min(), years.iter().max(), mode(years.iter().copied())) {
                (Some(&earliest), Some(&most_recent), Some(most_common)) => Some(BirthYearStats {
                    earliest,
                    most_recent,
                    most_common,
                }),
                _ => None,
            }
        } else {
            None
        };

        UserStats {
            user_types,
            genders,
            birth_years,
        }
    })
}

// ---------------------------------------------------------------------------
// All four groups
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AggregateReport {
    pub time: Timed<TimeStats>,
    pub stations: Timed<StationStats>,
    pub duration: Timed<DurationStats>,
    pub users: Timed<UserStats>,
}

impl AggregateReport {
    pub fn compute(table: &TripTable) -> Self {
        AggregateReport {
            time: time_stats(table),
            stations: station_stats(table),
            duration: trip_duration_stats(table),
            users: user_stats(table),
        }
    }
}
