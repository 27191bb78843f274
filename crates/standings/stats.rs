use log::debug;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::drivers::DriverCode;
use crate::frame::frame_rows;
use crate::loader::{CODE, FASTEST_LAP_SECONDS, GRID, POINTS, POSITION, ROUND};
use crate::Result;

/// Summary for a single driver. Missing inputs never fail: an unknown code
/// gives zero points, zero races and `None` for the averages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverStats {
    pub code: DriverCode,
    pub total_points: f64,
    pub avg_position: Option<f64>,
    pub races: u32,
    pub avg_grid: Option<f64>,
    pub best_lap_seconds: Option<f64>,
}

impl DriverStats {
    pub fn empty(code: DriverCode) -> Self {
        DriverStats {
            code,
            total_points: 0.0,
            avg_position: None,
            races: 0,
            avg_grid: None,
            best_lap_seconds: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StatsRow {
    total_points: Option<f64>,
    avg_position: Option<f64>,
    races: Option<u32>,
    avg_grid: Option<f64>,
    best_lap_seconds: Option<f64>,
}

pub fn driver_stats(df: &DataFrame, code: &str) -> Result<DriverStats> {
    let mut summary = df
        .clone()
        .lazy()
        .filter(col(CODE).eq(lit(code)))
        .select([
            col(POINTS).sum().alias("total_points"),
            col(POSITION).mean().alias("avg_position"),
            col(ROUND).drop_nulls().n_unique().alias("races"),
            col(GRID).mean().alias("avg_grid"),
            col(FASTEST_LAP_SECONDS).min().alias("best_lap_seconds"),
        ])
        .collect()?;
    debug!("stats for {}: {:?}", code, summary);

    let code = DriverCode::from(code);
    let rows: Vec<StatsRow> = frame_rows(&mut summary)?;
    let Some(row) = rows.into_iter().next() else {
        return Ok(DriverStats::empty(code));
    };
    Ok(DriverStats {
        code,
        total_points: row.total_points.unwrap_or(0.0),
        avg_position: row.avg_position,
        races: row.races.unwrap_or(0),
        avg_grid: row.avg_grid,
        best_lap_seconds: row.best_lap_seconds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::normalize;
    use crate::testing::sample_results;

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("value should be present");
        assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
    }

    #[test]
    fn test_two_round_scenario() {
        let df = df!(
            "DriverID" => ["max_verstappen", "max_verstappen"],
            "Code" => ["VER", "VER"],
            "GivenName" => ["Max", "Max"],
            "FamilyName" => ["Verstappen", "Verstappen"],
            "ConstructorName" => ["Red Bull", "Red Bull"],
            "Round" => [1.0, 2.0],
            "Points" => [25.0, 18.0],
            "Position" => [1.0, 2.0],
            "Grid" => [1.0, 1.0],
            "FastestLapTime" => ["1:32.608", "1:31.950"]
        )
        .unwrap();
        let stats = driver_stats(&normalize(df).unwrap(), "VER").unwrap();
        assert_eq!(stats.total_points, 43.0);
        assert_eq!(stats.races, 2);
        assert_close(stats.avg_position, 1.5);
        assert_close(stats.best_lap_seconds, 91.95);
    }

    #[test]
    fn test_total_points_match_column_sum() {
        let df = sample_results();
        for code in ["VER", "PER", "HAM", "LEC"] {
            let stats = driver_stats(&df, code).unwrap();
            let expected: f64 = df
                .column(CODE)
                .unwrap()
                .str()
                .unwrap()
                .into_iter()
                .zip(df.column(POINTS).unwrap().f64().unwrap().into_iter())
                .filter(|(c, _)| *c == Some(code))
                .filter_map(|(_, p)| p)
                .sum();
            assert!(stats.total_points >= 0.0);
            assert_eq!(stats.total_points, expected);
        }
    }

    #[test]
    fn test_missing_values_are_skipped() {
        let stats = driver_stats(&sample_results(), "PER").unwrap();
        assert_eq!(stats.total_points, 28.0);
        assert_eq!(stats.races, 3);
        // unclassified in round 3
        assert_close(stats.avg_position, 3.5);
        assert_close(stats.avg_grid, 3.0);
        assert_close(stats.best_lap_seconds, 93.5);
    }

    #[test]
    fn test_nan_values_are_skipped() {
        let df = df!(
            "DriverID" => ["norris", "norris", "norris"],
            "Code" => ["NOR", "NOR", "NOR"],
            "GivenName" => ["Lando", "Lando", "Lando"],
            "FamilyName" => ["Norris", "Norris", "Norris"],
            "ConstructorName" => ["McLaren", "McLaren", "McLaren"],
            "Round" => [1.0, 2.0, 3.0],
            "Points" => [25.0, f64::NAN, 15.0],
            "Position" => [1.0, f64::NAN, 3.0],
            "Grid" => [2.0, 4.0, f64::NAN],
            "FastestLapTime" => ["1:32.100", "1:32.400", "1:31.900"]
        )
        .unwrap();
        let stats = driver_stats(&normalize(df).unwrap(), "NOR").unwrap();
        assert_eq!(stats.total_points, 40.0);
        assert_eq!(stats.races, 3);
        assert_close(stats.avg_position, 2.0);
        assert_close(stats.avg_grid, 3.0);
    }

    #[test]
    fn test_unknown_code() {
        let stats = driver_stats(&sample_results(), "XXX").unwrap();
        assert_eq!(stats, DriverStats::empty(DriverCode::from("XXX")));
    }
}
