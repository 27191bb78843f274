use log::debug;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::frame::{frame_rows, sort_by_driver_round};
use crate::loader::{CODE, DRIVER_ID, POINTS, ROUND};
use crate::Result;

pub const CUMULATIVE_POINTS: &str = "CumulativePoints";

/// One driver's running points total, ordered by round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChampionshipSeries {
    pub driver_id: String,
    pub code: Option<String>,
    pub points: Vec<(f64, f64)>,
}

impl ChampionshipSeries {
    pub fn final_points(&self) -> f64 {
        self.points.last().map(|&(_, p)| p).unwrap_or(0.0)
    }
}

#[derive(Debug, Deserialize)]
struct CumulativeRow {
    #[serde(rename = "DriverID")]
    driver_id: Option<String>,
    #[serde(rename = "Code")]
    code: Option<String>,
    #[serde(rename = "Round")]
    round: Option<f64>,
    #[serde(rename = "CumulativePoints")]
    cumulative_points: Option<f64>,
}

/// Sort by driver then round and add the running points total per driver.
/// Missing points add nothing to the total.
pub fn cumulative_points(df: &DataFrame) -> Result<DataFrame> {
    let out = sort_by_driver_round(df.clone().lazy())
        .with_column(
            col(POINTS)
                .fill_null(lit(0.0))
                .cum_sum(false)
                .over([col(DRIVER_ID)])
                .alias(CUMULATIVE_POINTS),
        )
        .collect()?;
    debug!("cumulative points shape: {:?}", out.shape());
    Ok(out)
}

pub fn championship_series(df: &DataFrame) -> Result<Vec<ChampionshipSeries>> {
    let mut frame = cumulative_points(df)?.select([DRIVER_ID, CODE, ROUND, CUMULATIVE_POINTS])?;
    let rows: Vec<CumulativeRow> = frame_rows(&mut frame)?;

    let mut series: Vec<ChampionshipSeries> = Vec::new();
    for row in rows {
        let (Some(driver_id), Some(round)) = (row.driver_id, row.round) else {
            continue;
        };
        let total = row.cumulative_points.unwrap_or(0.0);
        match series.last_mut() {
            Some(s) if s.driver_id == driver_id => s.points.push((round, total)),
            _ => series.push(ChampionshipSeries {
                driver_id,
                code: row.code,
                points: vec![(round, total)],
            }),
        }
    }
    Ok(series)
}
