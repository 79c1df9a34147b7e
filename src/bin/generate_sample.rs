use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray, TimestampSecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use parquet::arrow::ArrowWriter;
use serde::Serialize;

const TRIPS_PER_CITY: usize = 400;

const STATIONS: [&str; 8] = [
    "Streeter Dr & Grand Ave",
    "Clinton St & Washington Blvd",
    "Lake Shore Dr & Monroe St",
    "Pershing Square North",
    "W 21 St & 6 Ave",
    "Columbus Circle / Union Station",
    "Jefferson Dr & 14th St SW",
    "Lincoln Memorial",
];

const USER_TYPES: [&str; 2] = ["Subscriber", "Customer"];
const GENDERS: [&str; 2] = ["Male", "Female"];

/// splitmix64; deterministic so regenerated files are identical.
struct SampleRng(u64);

impl SampleRng {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len() as u64) as usize]
    }
}

struct Trip {
    start: NaiveDateTime,
    end: NaiveDateTime,
    duration: f64,
    start_station: &'static str,
    end_station: &'static str,
    user_type: &'static str,
    gender: Option<&'static str>,
    birth_year: Option<i64>,
}

fn generate_trips(rng: &mut SampleRng) -> Result<Vec<Trip>> {
    let origin = NaiveDate::from_ymd_opt(2017, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .context("invalid origin date")?;
    // 2017-01-01 through 2017-06-30.
    let span_secs = 181 * 24 * 3600;

    let mut trips: Vec<Trip> = (0..TRIPS_PER_CITY)
        .map(|_| {
            let start = origin + Duration::seconds(rng.below(span_secs) as i64);
            let duration = 60 + rng.below(3600);
            let gender = match rng.below(10) {
                0 => None,
                n => Some(GENDERS[(n % 2) as usize]),
            };
            let birth_year = match rng.below(12) {
                0 => None,
                _ => Some(1940 + rng.below(60) as i64),
            };
            Trip {
                start,
                end: start + Duration::seconds(duration as i64),
                duration: duration as f64,
                start_station: rng.pick(&STATIONS),
                end_station: rng.pick(&STATIONS),
                user_type: rng.pick(&USER_TYPES),
                gender,
                birth_year,
            }
        })
        .collect();
    trips.sort_by_key(|t| t.start);
    Ok(trips)
}

// ---------------------------------------------------------------------------
// CSV (chicago, new york city)
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct CsvTrip<'a> {
    #[serde(rename = "")]
    index: usize,
    #[serde(rename = "Start Time")]
    start_time: String,
    #[serde(rename = "End Time")]
    end_time: String,
    #[serde(rename = "Trip Duration")]
    trip_duration: f64,
    #[serde(rename = "Start Station")]
    start_station: &'a str,
    #[serde(rename = "End Station")]
    end_station: &'a str,
    #[serde(rename = "User Type")]
    user_type: &'a str,
    #[serde(rename = "Gender")]
    gender: Option<&'a str>,
    /// Float text, as dataframe exports write a column with blanks.
    #[serde(rename = "Birth Year")]
    birth_year: Option<f64>,
}

fn write_csv(path: &Path, trips: &[Trip]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    for (index, t) in trips.iter().enumerate() {
        writer.serialize(CsvTrip {
            index,
            start_time: t.start.format("%Y-%m-%d %H:%M:%S").to_string(),
            end_time: t.end.format("%Y-%m-%d %H:%M:%S").to_string(),
            trip_duration: t.duration,
            start_station: t.start_station,
            end_station: t.end_station,
            user_type: t.user_type,
            gender: t.gender,
            birth_year: t.birth_year.map(|y| y as f64),
        })?;
    }
    writer.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Parquet (washington)
// ---------------------------------------------------------------------------

fn write_parquet(path: &Path, trips: &[Trip]) -> Result<()> {
    let seconds = |f: fn(&Trip) -> NaiveDateTime| {
        TimestampSecondArray::from(
            trips
                .iter()
                .map(|t| f(t).and_utc().timestamp())
                .collect::<Vec<_>>(),
        )
    };
    let text = |f: fn(&Trip) -> &'static str| {
        StringArray::from(trips.iter().map(f).collect::<Vec<_>>())
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("Start Time", DataType::Timestamp(TimeUnit::Second, None), false),
        Field::new("End Time", DataType::Timestamp(TimeUnit::Second, None), false),
        Field::new("Trip Duration", DataType::Float64, false),
        Field::new("Start Station", DataType::Utf8, false),
        Field::new("End Station", DataType::Utf8, false),
        Field::new("User Type", DataType::Utf8, false),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(seconds(|t: &Trip| t.start)),
        Arc::new(seconds(|t: &Trip| t.end)),
        Arc::new(Float64Array::from(
            trips.iter().map(|t| t.duration).collect::<Vec<_>>(),
        )),
        Arc::new(text(|t: &Trip| t.start_station)),
        Arc::new(text(|t: &Trip| t.end_station)),
        Arc::new(text(|t: &Trip| t.user_type)),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

/// Write small synthetic trip files for all three cities.
///
/// ```text
/// generate_sample [OUT_DIR]
/// ```
///
/// chicago and new york city are written as CSV with Gender and Birth Year;
/// washington is written as Parquet without them, the way the real exports
/// differ.
fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&out_dir).context("creating output directory")?;

    let mut rng = SampleRng(42);

    for (stem, as_parquet) in [
        ("chicago", false),
        ("new_york_city", false),
        ("washington", true),
    ] {
        let trips = generate_trips(&mut rng)?;
        let path = if as_parquet {
            let path = out_dir.join(format!("{stem}.parquet"));
            write_parquet(&path, &trips)?;
            path
        } else {
            let path = out_dir.join(format!("{stem}.csv"));
            write_csv(&path, &trips)?;
            path
        };
        println!("Wrote {} trips to {}", trips.len(), path.display());
    }
    Ok(())
}
