use std::path::Path;

use log::{debug, info};
use polars::lazy::dsl::GetOutput;
use polars::prelude::*;

use crate::{Result, StandingsError};

pub const DRIVER_ID: &str = "DriverID";
pub const CODE: &str = "Code";
pub const GIVEN_NAME: &str = "GivenName";
pub const FAMILY_NAME: &str = "FamilyName";
pub const CONSTRUCTOR_NAME: &str = "ConstructorName";
pub const ROUND: &str = "Round";
pub const POINTS: &str = "Points";
pub const POSITION: &str = "Position";
pub const GRID: &str = "Grid";
pub const FASTEST_LAP_TIME: &str = "FastestLapTime";
/// Derived from `FastestLapTime` during loading.
pub const FASTEST_LAP_SECONDS: &str = "FastestLapSeconds";

pub const EXPECTED_COLUMNS: [&str; 10] = [
    DRIVER_ID,
    CODE,
    GIVEN_NAME,
    FAMILY_NAME,
    CONSTRUCTOR_NAME,
    ROUND,
    POINTS,
    POSITION,
    GRID,
    FASTEST_LAP_TIME,
];

const TEXT_COLUMNS: [&str; 5] = [DRIVER_ID, CODE, GIVEN_NAME, FAMILY_NAME, CONSTRUCTOR_NAME];
const NUMERIC_COLUMNS: [&str; 4] = [ROUND, POINTS, POSITION, GRID];

/// Read a race results CSV and normalize its column types. Every column is
/// read as text so a bad value anywhere in the file is coerced by
/// [`normalize`] instead of failing the read.
pub fn load_results<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(StandingsError::SourceNotFound(path.to_path_buf()));
    }
    let raw = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .finish()?
        .collect()?;
    debug!("raw results shape: {:?}", raw.shape());

    let df = normalize(raw)?;
    info!("loaded {} race results from {:?}", df.height(), path);
    Ok(df)
}

/// Validate the expected columns and coerce them: text columns to strings,
/// numeric columns to `f64` where anything unparseable or NaN becomes null,
/// plus the derived `FastestLapSeconds` column.
pub fn normalize(df: DataFrame) -> Result<DataFrame> {
    check_columns(&df)?;

    let lap_seconds = |s: Series| -> PolarsResult<Option<Series>> {
        let secs: Float64Chunked = s
            .str()?
            .into_iter()
            .map(|t| t.and_then(parse_lap_time))
            .collect();
        Ok(Some(secs.into_series()))
    };

    let mut casts: Vec<Expr> = TEXT_COLUMNS
        .iter()
        .map(|c| col(c).cast(DataType::String))
        .collect();
    casts.extend(
        NUMERIC_COLUMNS
            .iter()
            .map(|c| col(c).cast(DataType::Float64).fill_nan(lit(NULL))),
    );
    casts.push(col(FASTEST_LAP_TIME).cast(DataType::String));

    let df = df
        .lazy()
        .with_columns(casts)
        .with_column(
            col(FASTEST_LAP_TIME)
                .map(lap_seconds, GetOutput::from_type(DataType::Float64))
                .alias(FASTEST_LAP_SECONDS),
        )
        .collect()?;
    Ok(df)
}

pub fn check_columns(df: &DataFrame) -> Result<()> {
    let names = df.get_column_names();
    match EXPECTED_COLUMNS.iter().find(|c| !names.contains(*c)) {
        Some(missing) => Err(StandingsError::MissingColumn(missing.to_string())),
        None => Ok(()),
    }
}

/// Parse a lap time such as `1:32.608`, `1:02:03.5` or `92.608` into seconds.
pub fn parse_lap_time(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() > 3 {
        return None;
    }
    let (last, rest) = parts.split_last()?;
    let secs: f64 = last.parse().ok()?;
    if !secs.is_finite() || secs < 0.0 || (!rest.is_empty() && secs >= 60.0) {
        return None;
    }
    let mut minutes = 0.0;
    for part in rest {
        let v: u32 = part.parse().ok()?;
        minutes = minutes * 60.0 + v as f64;
    }
    Some(minutes * 60.0 + secs)
}

/// Format seconds as `m:ss.fff`.
pub fn format_lap_time(seconds: f64) -> String {
    let millis = (seconds * 1000.0).round() as u64;
    let minutes = millis / 60_000;
    let rem = millis % 60_000;
    format!("{}:{:02}.{:03}", minutes, rem / 1000, rem % 1000)
}
