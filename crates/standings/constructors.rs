use log::debug;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::frame::frame_rows;
use crate::loader::{CONSTRUCTOR_NAME, DRIVER_ID, POINTS};
use crate::Result;

pub const CONSTRUCTOR_POINTS: &str = "ConstructorPoints";
pub const RANK: &str = "Rank";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverPoints {
    pub driver_id: String,
    pub points: f64,
}

/// A constructor's bar: its total and one segment per driver. `rank` 0 is
/// the constructor with the fewest points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstructorStanding {
    pub constructor: String,
    pub rank: u32,
    pub total_points: f64,
    pub drivers: Vec<DriverPoints>,
}

#[derive(Debug, Deserialize)]
struct RankedRow {
    #[serde(rename = "ConstructorName")]
    constructor: String,
    #[serde(rename = "DriverID")]
    driver_id: String,
    #[serde(rename = "Points")]
    points: Option<f64>,
    #[serde(rename = "Rank")]
    rank: u32,
    #[serde(rename = "ConstructorPoints")]
    constructor_points: Option<f64>,
}

/// Points summed per (constructor, driver). Rows without a constructor or
/// driver are not attributed to anyone.
pub fn points_by_driver(df: &DataFrame) -> Result<DataFrame> {
    let pairs = df
        .clone()
        .lazy()
        .filter(
            col(CONSTRUCTOR_NAME)
                .is_not_null()
                .and(col(DRIVER_ID).is_not_null()),
        )
        .group_by_stable([CONSTRUCTOR_NAME, DRIVER_ID])
        .agg([col(POINTS).sum()])
        .collect()?;
    Ok(pairs)
}

/// Constructor totals ascending, ties broken by name, with an explicit rank.
pub fn constructor_totals(pairs: &DataFrame) -> Result<DataFrame> {
    let totals = pairs
        .clone()
        .lazy()
        .group_by([CONSTRUCTOR_NAME])
        .agg([col(POINTS).sum().alias(CONSTRUCTOR_POINTS)])
        .sort(
            [CONSTRUCTOR_POINTS, CONSTRUCTOR_NAME],
            SortMultipleOptions::default().with_maintain_order(true),
        )
        .with_row_index(RANK, None)
        .collect()?;
    Ok(totals)
}

/// Per-driver subtotals ordered by their constructor's rank, looked up by
/// joining on the constructor name.
pub fn ranked_points_by_driver(df: &DataFrame) -> Result<DataFrame> {
    let pairs = points_by_driver(df)?;
    let totals = constructor_totals(&pairs)?;
    debug!("constructor totals: {:?}", totals);

    let ranked = pairs
        .lazy()
        .join(
            totals.lazy(),
            [col(CONSTRUCTOR_NAME)],
            [col(CONSTRUCTOR_NAME)],
            JoinArgs::new(JoinType::Left),
        )
        .sort(
            [RANK, DRIVER_ID],
            SortMultipleOptions::default().with_maintain_order(true),
        )
        .select([
            col(CONSTRUCTOR_NAME),
            col(DRIVER_ID),
            col(POINTS),
            col(RANK),
            col(CONSTRUCTOR_POINTS),
        ])
        .collect()?;
    Ok(ranked)
}

pub fn constructor_standings(df: &DataFrame) -> Result<Vec<ConstructorStanding>> {
    let mut ranked = ranked_points_by_driver(df)?;
    let rows: Vec<RankedRow> = frame_rows(&mut ranked)?;

    let mut standings: Vec<ConstructorStanding> = Vec::new();
    for row in rows {
        let segment = DriverPoints {
            driver_id: row.driver_id,
            points: row.points.unwrap_or(0.0),
        };
        match standings.last_mut() {
            Some(s) if s.rank == row.rank => s.drivers.push(segment),
            _ => standings.push(ConstructorStanding {
                constructor: row.constructor,
                rank: row.rank,
                total_points: row.constructor_points.unwrap_or(0.0),
                drivers: vec![segment],
            }),
        }
    }
    Ok(standings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_results, total_points};

    #[test]
    fn test_constructor_standings_ascending() {
        let standings = constructor_standings(&sample_results()).unwrap();
        let names: Vec<&str> = standings.iter().map(|s| s.constructor.as_str()).collect();
        assert_eq!(names, vec!["Mercedes", "Ferrari", "Red Bull"]);

        let totals: Vec<f64> = standings.iter().map(|s| s.total_points).collect();
        assert_eq!(totals, vec![27.0, 53.0, 96.0]);
        assert!(totals.windows(2).all(|w| w[0] <= w[1]));

        let ranks: Vec<u32> = standings.iter().map(|s| s.rank).collect();
        assert_eq!(ranks, vec![0, 1, 2]);
    }

    #[test]
    fn test_segments_per_driver() {
        let standings = constructor_standings(&sample_results()).unwrap();
        let ferrari = &standings[1];
        assert_eq!(
            ferrari.drivers,
            vec![
                DriverPoints { driver_id: "hamilton".to_string(), points: 8.0 },
                DriverPoints { driver_id: "leclerc".to_string(), points: 45.0 },
            ]
        );
        for s in &standings {
            let segments: f64 = s.drivers.iter().map(|d| d.points).sum();
            assert_eq!(segments, s.total_points);
        }
    }

    #[test]
    fn test_totals_sum_to_all_points() {
        let df = sample_results();
        let totals = constructor_totals(&points_by_driver(&df).unwrap()).unwrap();
        let sum = totals
            .column(CONSTRUCTOR_POINTS)
            .unwrap()
            .f64()
            .unwrap()
            .sum()
            .unwrap();
        assert_eq!(sum, total_points(&df));
    }

    #[test]
    fn test_equal_totals_ordered_by_name() {
        let df = df!(
            "DriverID" => ["albon", "gasly", "ocon"],
            "Code" => ["ALB", "GAS", "OCO"],
            "GivenName" => ["Alexander", "Pierre", "Esteban"],
            "FamilyName" => ["Albon", "Gasly", "Ocon"],
            "ConstructorName" => ["Williams", "Alpine", "Alpine"],
            "Round" => [1.0, 1.0, 1.0],
            "Points" => [2.0, 1.0, 1.0],
            "Position" => [9.0, 10.0, 10.0],
            "Grid" => [9.0, 10.0, 11.0],
            "FastestLapTime" => ["1:33.000", "1:34.000", "1:35.000"]
        )
        .unwrap();
        let df = crate::loader::normalize(df).unwrap();
        let standings = constructor_standings(&df).unwrap();
        let names: Vec<&str> = standings.iter().map(|s| s.constructor.as_str()).collect();
        assert_eq!(names, vec!["Alpine", "Williams"]);
    }
}
