use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::frame::{frame_rows, sort_by_driver_round};
use crate::loader::{CODE, CONSTRUCTOR_NAME, DRIVER_ID, FAMILY_NAME, GIVEN_NAME, ROUND};
use crate::Result;

/// Short driver identifier such as `VER`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DriverCode(String);

impl DriverCode {
    pub fn new(code: impl Into<String>) -> Self {
        DriverCode(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DriverCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DriverCode {
    fn from(code: &str) -> Self {
        DriverCode::new(code)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverInfo {
    pub code: DriverCode,
    pub driver_id: String,
    pub name: String,
    pub team: String,
    pub image: PathBuf,
    pub latest_round: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct LatestRow {
    #[serde(rename = "DriverID")]
    driver_id: Option<String>,
    #[serde(rename = "Code")]
    code: Option<String>,
    #[serde(rename = "GivenName")]
    given_name: Option<String>,
    #[serde(rename = "FamilyName")]
    family_name: Option<String>,
    #[serde(rename = "ConstructorName")]
    constructor_name: Option<String>,
    #[serde(rename = "Round")]
    round: Option<f64>,
}

/// Display metadata for every known driver, in driver/round order.
#[derive(Debug, Clone, Default)]
pub struct DriverRoster {
    drivers: Vec<DriverInfo>,
    index: HashMap<DriverCode, usize>,
}

impl DriverRoster {
    pub fn new(drivers: Vec<DriverInfo>) -> Self {
        let index = drivers
            .iter()
            .enumerate()
            .map(|(i, d)| (d.code.clone(), i))
            .collect();
        DriverRoster { drivers, index }
    }

    pub fn get(&self, code: &str) -> Option<&DriverInfo> {
        self.index
            .get(&DriverCode::from(code))
            .map(|&i| &self.drivers[i])
    }

    pub fn contains(&self, code: &str) -> bool {
        self.index.contains_key(&DriverCode::from(code))
    }

    pub fn position(&self, code: &str) -> Option<usize> {
        self.index.get(&DriverCode::from(code)).copied()
    }

    pub fn codes(&self) -> Vec<DriverCode> {
        self.drivers.iter().map(|d| d.code.clone()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DriverInfo> {
        self.drivers.iter()
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    /// Index of `preferred`, or of the first driver when it is unknown.
    pub fn default_index(&self, preferred: &str) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        match self.position(preferred) {
            Some(i) => Some(i),
            None => {
                warn!(
                    "default driver {} not in results, selecting {}",
                    preferred, self.drivers[0].code
                );
                Some(0)
            }
        }
    }
}

pub fn headshot_path<P: AsRef<Path>>(headshot_dir: P, code: &DriverCode) -> PathBuf {
    headshot_dir.as_ref().join(format!("{}.png", code))
}

/// Keep the latest row (highest round) per driver code and turn it into
/// display metadata.
pub fn latest_rows(df: &DataFrame) -> Result<DataFrame> {
    let latest = sort_by_driver_round(
        sort_by_driver_round(df.clone().lazy())
            .unique_stable(Some(vec![CODE.to_string()]), UniqueKeepStrategy::Last),
    )
    .select([
        col(DRIVER_ID),
        col(CODE),
        col(GIVEN_NAME),
        col(FAMILY_NAME),
        col(CONSTRUCTOR_NAME),
        col(ROUND),
    ])
    .collect()?;
    Ok(latest)
}

pub fn build_roster<P: AsRef<Path>>(df: &DataFrame, headshot_dir: P) -> Result<DriverRoster> {
    let mut latest = latest_rows(df)?;
    let rows: Vec<LatestRow> = frame_rows(&mut latest)?;

    let mut drivers = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(code) = row.code.map(DriverCode::new) else {
            debug!("skipping driver row without code: {:?}", row.driver_id);
            continue;
        };
        let name = [row.given_name, row.family_name]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        drivers.push(DriverInfo {
            image: headshot_path(&headshot_dir, &code),
            code,
            driver_id: row.driver_id.unwrap_or_default(),
            name,
            team: row.constructor_name.unwrap_or_default(),
            latest_round: row.round,
        });
    }
    debug!("driver roster: {} drivers", drivers.len());
    Ok(DriverRoster::new(drivers))
}
