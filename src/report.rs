use std::fmt::Display;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray, UInt32Array, UInt64Array};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use log::debug;

use crate::data::model::{
    COL_BIRTH_YEAR, COL_END_STATION, COL_END_TIME, COL_GENDER, COL_START_STATION,
    COL_START_TIME, COL_TRIP_DURATION, COL_USER_TYPE, TripRecord, TripTable,
};
use crate::stats::{
    AggregateReport, DurationStats, StationStats, TimeStats, Timed, UserStats,
};

const TIMESTAMP_DISPLAY: &str = "%Y-%m-%d %H:%M:%S";

pub fn separator<W: Write>(out: &mut W) -> std::io::Result<()> {
    writeln!(out, "{}", "-".repeat(40))
}

fn footer<W: Write>(out: &mut W, elapsed: Duration) -> std::io::Result<()> {
    writeln!(out, "\nThis took {} seconds.", elapsed.as_secs_f64())?;
    separator(out)
}

fn or_none<T: Display>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map_or_else(|| "none".to_string(), |v| v.to_string())
}

// ---------------------------------------------------------------------------
// Statistic groups
// ---------------------------------------------------------------------------

/// Only the start hour is shown; month and weekday modes stay internal.
pub fn write_time_stats<W: Write>(out: &mut W, stats: &Timed<TimeStats>) -> std::io::Result<()> {
    debug!(
        "popular month {:?}, popular day {:?}",
        stats.value.popular_month, stats.value.popular_day
    );
    writeln!(out, "\nCalculating The Most Frequent Times of Travel...\n")?;
    writeln!(out, "Most Popular Start Hour: {}", or_none(&stats.value.popular_hour))?;
    footer(out, stats.elapsed)
}

pub fn write_station_stats<W: Write>(
    out: &mut W,
    stats: &Timed<StationStats>,
) -> std::io::Result<()> {
    let s = &stats.value;
    writeln!(out, "\nCalculating The Most Popular Stations and Trip...\n")?;
    writeln!(out, "Most Popular Start Station: {}", or_none(&s.popular_start))?;
    writeln!(out, "Most Popular End Station: {}", or_none(&s.popular_end))?;
    writeln!(
        out,
        "Most Popular Start-End Station Combination: {}",
        or_none(&s.popular_route)
    )?;
    footer(out, stats.elapsed)
}

pub fn write_duration_stats<W: Write>(
    out: &mut W,
    stats: &Timed<DurationStats>,
) -> std::io::Result<()> {
    writeln!(out, "\nCalculating Trip Duration...\n")?;
    writeln!(out, "Total travel time: {}", stats.value.total)?;
    // Debug keeps the fractional part of whole means ("400.0").
    writeln!(out, "Mean travel time: {:?}", stats.value.mean)?;
    footer(out, stats.elapsed)
}

fn write_counts<W: Write>(out: &mut W, counts: &[(String, usize)]) -> std::io::Result<()> {
    let width = counts.iter().map(|(v, _)| v.len()).max().unwrap_or(0);
    for (value, count) in counts {
        writeln!(out, "{value:<width$}    {count}")?;
    }
    Ok(())
}

pub fn write_user_stats<W: Write>(out: &mut W, stats: &Timed<UserStats>) -> std::io::Result<()> {
    let s = &stats.value;
    writeln!(out, "\nCalculating User Stats...\n")?;

    writeln!(out, "Display counts of user types:")?;
    write_counts(out, &s.user_types)?;

    match &s.genders {
        Some(genders) => {
            writeln!(out, "Display counts of gender:")?;
            write_counts(out, genders)?;
        }
        None => writeln!(out, "Gender not available")?,
    }

    match &s.birth_years {
        Some(years) => writeln!(
            out,
            "Years of birth as follows: Earliest - {}, most recent - {}, and most common - {}",
            years.earliest, years.most_recent, years.most_common
        )?,
        None => writeln!(out, "Year of birth not available")?,
    }

    footer(out, stats.elapsed)
}

pub fn write_report<W: Write>(out: &mut W, report: &AggregateReport) -> std::io::Result<()> {
    write_time_stats(out, &report.time)?;
    write_station_stats(out, &report.stations)?;
    write_duration_stats(out, &report.duration)?;
    write_user_stats(out, &report.users)
}

// ---------------------------------------------------------------------------
// Raw rows
// ---------------------------------------------------------------------------

/// Arrow batch for a slice of trips. Gender and Birth Year columns only
/// appear when the source carried them.
pub fn page_batch(page: &[TripRecord], table: &TripTable) -> Result<RecordBatch> {
    let strings = |f: &dyn Fn(&TripRecord) -> Option<String>| -> ArrayRef {
        Arc::new(StringArray::from(page.iter().map(f).collect::<Vec<_>>()))
    };

    let mut columns: Vec<(&str, ArrayRef)> = vec![
        (
            "",
            Arc::new(UInt64Array::from(
                page.iter().map(|t| t.row as u64).collect::<Vec<_>>(),
            )) as ArrayRef,
        ),
        (
            COL_START_TIME,
            strings(&|t| Some(t.start_time.format(TIMESTAMP_DISPLAY).to_string())),
        ),
        (
            COL_END_TIME,
            strings(&|t| t.end_time.map(|e| e.format(TIMESTAMP_DISPLAY).to_string())),
        ),
        (
            COL_TRIP_DURATION,
            Arc::new(Float64Array::from(
                page.iter().map(|t| t.trip_duration).collect::<Vec<_>>(),
            )) as ArrayRef,
        ),
        (COL_START_STATION, strings(&|t| Some(t.start_station.clone()))),
        (COL_END_STATION, strings(&|t| Some(t.end_station.clone()))),
        (COL_USER_TYPE, strings(&|t| t.user_type.clone())),
    ];
    if table.has_gender {
        columns.push((COL_GENDER, strings(&|t| t.gender.clone())));
    }
    if table.has_birth_year {
        columns.push((
            COL_BIRTH_YEAR,
            Arc::new(Int64Array::from(
                page.iter().map(|t| t.birth_year).collect::<Vec<_>>(),
            )) as ArrayRef,
        ));
    }
    columns.push((
        "month",
        Arc::new(UInt32Array::from(page.iter().map(|t| t.month).collect::<Vec<_>>())) as ArrayRef,
    ));
    columns.push((
        "day_of_week",
        Arc::new(UInt32Array::from(page.iter().map(|t| t.weekday).collect::<Vec<_>>())) as ArrayRef,
    ));

    RecordBatch::try_from_iter(columns).context("building page batch")
}

/// Print a page of raw trips as an ASCII table.
pub fn write_page<W: Write>(out: &mut W, page: &[TripRecord], table: &TripTable) -> Result<()> {
    let batch = page_batch(page, table)?;
    let rendered = pretty_format_batches(&[batch]).context("formatting trips")?;
    writeln!(out, "{rendered}")?;
    Ok(())
}
