//! Loading the held-out evaluation set, with a synthetic fallback.

use crate::data::table::{DataTable, FeatureValue};
use crate::error::{EvalError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where a loaded table came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataOrigin {
    Csv { path: PathBuf },
    Synthetic { rows: usize, seed: u64 },
}

/// Information about a data source for reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSourceInfo {
    pub origin: DataOrigin,
    pub accessed_at: chrono::DateTime<chrono::Utc>,
    pub row_count: usize,
    pub column_count: usize,
}

impl DataSourceInfo {
    fn new(origin: DataOrigin, table: &DataTable) -> Self {
        Self {
            origin,
            accessed_at: chrono::Utc::now(),
            row_count: table.row_count(),
            column_count: table.column_count(),
        }
    }
}

/// Read a CSV file with a header row into a [`DataTable`].
pub fn load_csv(path: &Path) -> Result<DataTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if columns.is_empty() {
        return Err(EvalError::dataset(format!(
            "{} has no header row",
            path.display()
        )));
    }

    let mut table = DataTable::new(columns);
    for record in reader.records() {
        let record = record?;
        table.push_row(record.iter().map(FeatureValue::parse_cell).collect())?;
    }
    tracing::debug!(
        path = %path.display(),
        rows = table.row_count(),
        columns = table.column_count(),
        "loaded held-out data"
    );
    Ok(table)
}

/// Load the CSV at `path`, or synthesize `rows` rows when the file is absent.
///
/// Only a missing file triggers the fallback; a file that exists but cannot be
/// parsed is an error.
pub fn load_or_synthesize(
    path: &Path,
    rows: usize,
    seed: u64,
) -> Result<(DataTable, DataSourceInfo)> {
    if path.exists() {
        let table = load_csv(path)?;
        let info = DataSourceInfo::new(
            DataOrigin::Csv {
                path: path.to_path_buf(),
            },
            &table,
        );
        return Ok((table, info));
    }

    tracing::warn!(
        path = %path.display(),
        rows,
        "test data not found; generating synthetic rows"
    );
    let table = synthetic_table(rows, seed);
    let info = DataSourceInfo::new(DataOrigin::Synthetic { rows, seed }, &table);
    Ok((table, info))
}

/// Column contract of the synthetic traffic-volume set; the target comes first.
pub const SYNTHETIC_COLUMNS: [&str; 11] = [
    "traffic_volume",
    "holiday",
    "temp",
    "rain_1h",
    "snow_1h",
    "clouds_all",
    "weather_main",
    "day",
    "month",
    "year",
    "hour",
];

const WEATHER: [&str; 4] = ["Clouds", "Rain", "Clear", "Snow"];
const DAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];
const YEARS: [f64; 5] = [2012.0, 2013.0, 2014.0, 2015.0, 2016.0];

/// Deterministic synthetic rows for a given seed.
pub fn synthetic_table(rows: usize, seed: u64) -> DataTable {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut table = DataTable::new(SYNTHETIC_COLUMNS.iter().map(|c| c.to_string()).collect());

    for _ in 0..rows {
        let holiday = if rng.gen_bool(0.05) {
            FeatureValue::Category("Holiday".into())
        } else {
            FeatureValue::Missing
        };
        let row = vec![
            FeatureValue::Number(f64::from(rng.gen_range(1000..8000_i32))),
            holiday,
            FeatureValue::Number(rng.gen_range(260.0..310.0)),
            FeatureValue::Number(exponential(&mut rng, 0.5)),
            FeatureValue::Number(exponential(&mut rng, 0.2)),
            FeatureValue::Number(f64::from(rng.gen_range(0..100_i32))),
            FeatureValue::Category(WEATHER[rng.gen_range(0..WEATHER.len())].into()),
            FeatureValue::Category(DAYS[rng.gen_range(0..DAYS.len())].into()),
            FeatureValue::Number(f64::from(rng.gen_range(1..13_i32))),
            FeatureValue::Number(YEARS[rng.gen_range(0..YEARS.len())]),
            FeatureValue::Number(f64::from(rng.gen_range(0..24_i32))),
        ];
        table.rows.push(row);
    }
    table
}

/// Inverse-CDF sample from an exponential distribution with the given mean.
fn exponential(rng: &mut StdRng, scale: f64) -> f64 {
    let u: f64 = rng.gen_range(0.0..1.0);
    -scale * (1.0 - u).ln()
}
