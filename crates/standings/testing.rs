use polars::prelude::*;

use crate::loader::normalize;

/// Three rounds for four drivers, rows deliberately out of order. Hamilton
/// moves from Mercedes to Ferrari for round 3 and Perez has no classified
/// position or lap time in some rounds.
pub(crate) fn sample_results() -> DataFrame {
    let df = df!(
        "DriverID" => ["hamilton", "max_verstappen", "perez", "leclerc", "hamilton", "max_verstappen",
                       "perez", "leclerc", "hamilton", "max_verstappen", "perez", "leclerc"],
        "Code" => ["HAM", "VER", "PER", "LEC", "HAM", "VER", "PER", "LEC", "HAM", "VER", "PER", "LEC"],
        "GivenName" => ["Lewis", "Max", "Sergio", "Charles", "Lewis", "Max",
                        "Sergio", "Charles", "Lewis", "Max", "Sergio", "Charles"],
        "FamilyName" => ["Hamilton", "Verstappen", "Pérez", "Leclerc", "Hamilton", "Verstappen",
                         "Pérez", "Leclerc", "Hamilton", "Verstappen", "Pérez", "Leclerc"],
        "ConstructorName" => ["Ferrari", "Red Bull", "Red Bull", "Ferrari", "Mercedes", "Red Bull",
                              "Red Bull", "Ferrari", "Mercedes", "Red Bull", "Red Bull", "Ferrari"],
        "Round" => [3.0, 1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 2.0, 3.0, 3.0, 3.0],
        "Points" => [8.0, 25.0, 18.0, 15.0, 12.0, 18.0, 10.0, 12.0, 15.0, 25.0, 0.0, 18.0],
        "Position" => [Some(7.0), Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(2.0),
                       Some(5.0), Some(4.0), Some(3.0), Some(1.0), None, Some(2.0)],
        "Grid" => [6.0, 1.0, 2.0, 3.0, 5.0, 1.0, 4.0, 2.0, 3.0, 2.0, 3.0, 1.0],
        "FastestLapTime" => [Some("1:34.000"), Some("1:32.608"), Some("1:33.500"), Some("1:33.010"),
                             Some("1:33.900"), Some("1:31.950"), None, Some("1:32.400"),
                             Some("1:32.870"), Some("1:32.001"), Some("1:35.222"), Some("1:31.700")]
    )
    .unwrap();
    normalize(df).unwrap()
}

pub(crate) fn total_points(df: &DataFrame) -> f64 {
    df.column("Points").unwrap().f64().unwrap().sum().unwrap_or(0.0)
}
