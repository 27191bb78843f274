use std::error::Error;
use std::path::Path;

use log::debug;
use polars::prelude::DataFrame;

use config::Config;
use standings::championship::championship_series;
use standings::constructors::constructor_standings;
use standings::drivers::build_roster;
use standings::loader::format_lap_time;
use standings::stats::driver_stats;
use standings::DriverRoster;
use ui::data::{
    CardSource, Dashboard, DriverCard, DriverOption, Headlines, PointsSeries, Segment, StackedBar,
};

/// The loaded results table plus the roster derived from it. Nothing here is
/// mutated after construction; every view is recomputed from `results`.
pub struct Board {
    pub results: DataFrame,
    pub roster: DriverRoster,
}

impl Board {
    pub fn new<P: AsRef<Path>>(results: DataFrame, headshot_dir: P) -> standings::Result<Self> {
        let roster = build_roster(&results, headshot_dir)?;
        Ok(Board { results, roster })
    }

    pub fn driver_card(&self, code: &str) -> standings::Result<DriverCard> {
        let stats = driver_stats(&self.results, code)?;
        let info = self.roster.get(code);
        Ok(DriverCard {
            code: code.to_string(),
            name: info.map_or_else(|| code.to_string(), |d| d.name.clone()),
            team: info.map(|d| d.team.clone()).unwrap_or_default(),
            image: info
                .map(|d| d.image.display().to_string())
                .unwrap_or_default(),
            total_points: stats.total_points,
            avg_position: stats.avg_position,
            races: stats.races,
            avg_grid: stats.avg_grid,
            best_lap: stats.best_lap_seconds.map(format_lap_time),
        })
    }

    pub fn dashboard(&self, conf: &Config, preferred: &str) -> standings::Result<Dashboard> {
        let drivers = self
            .roster
            .iter()
            .map(|d| DriverOption {
                code: d.code.to_string(),
                name: d.name.clone(),
                team: d.team.clone(),
            })
            .collect();

        let championship = championship_series(&self.results)?
            .into_iter()
            .map(|s| PointsSeries {
                label: s.driver_id,
                code: s.code,
                points: s.points,
            })
            .collect();

        let constructors = constructor_standings(&self.results)?
            .into_iter()
            .map(|c| StackedBar {
                label: c.constructor,
                total: c.total_points,
                segments: c
                    .drivers
                    .into_iter()
                    .map(|d| Segment {
                        label: d.driver_id,
                        value: d.points,
                    })
                    .collect(),
            })
            .collect();

        let dashboard = Dashboard {
            headlines: Headlines {
                standings: conf.headline("Driver's Standings"),
                championship: conf.headline("Driver's Championship"),
                constructors: conf.headline("Constructor's Championship"),
            },
            drivers,
            selected: self.roster.default_index(preferred),
            championship,
            constructors,
        };
        debug!(
            "dashboard: {} drivers, {} series, {} constructors",
            dashboard.drivers.len(),
            dashboard.championship.len(),
            dashboard.constructors.len()
        );
        Ok(dashboard)
    }
}

impl CardSource for Board {
    fn card(&self, code: &str) -> Result<DriverCard, Box<dyn Error>> {
        Ok(self.driver_card(code)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CSV: &str = "\
DriverID,Code,GivenName,FamilyName,ConstructorName,Round,Points,Position,Grid,FastestLapTime
max_verstappen,VER,Max,Verstappen,Red Bull,1,25,1,1,1:32.608
max_verstappen,VER,Max,Verstappen,Red Bull,2,18,2,1,1:31.950
norris,NOR,Lando,Norris,McLaren,1,18,2,3,1:32.100
norris,NOR,Lando,Norris,McLaren,2,25,1,2,1:32.400
piastri,PIA,Oscar,Piastri,McLaren,1,15,3,4,
piastri,PIA,Oscar,Piastri,McLaren,2,0,R,5,
";

    fn board() -> Board {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CSV.as_bytes()).unwrap();
        let results = standings::loader::load_results(file.path()).unwrap();
        Board::new(results, "driver_headshots").unwrap()
    }

    #[test]
    fn test_driver_card() {
        let card = board().driver_card("VER").unwrap();
        assert_eq!(card.name, "Max Verstappen");
        assert_eq!(card.team, "Red Bull");
        assert_eq!(card.image, "driver_headshots/VER.png");
        assert_eq!(card.total_points, 43.0);
        assert_eq!(card.races, 2);
        assert_eq!(card.best_lap.as_deref(), Some("1:31.950"));
    }

    #[test]
    fn test_unknown_driver_card() {
        let card = board().card("ZZZ").unwrap();
        assert_eq!(card.name, "ZZZ");
        assert_eq!(card.total_points, 0.0);
        assert_eq!(card.races, 0);
        assert_eq!(card.avg_position, None);
        assert_eq!(card.best_lap, None);
    }

    #[test]
    fn test_dashboard() {
        let board = board();
        let dashboard = board.dashboard(&Config::default(), "VER").unwrap();

        assert_eq!(dashboard.headlines.standings, "F1 2024 Driver's Standings");
        let codes: Vec<&str> = dashboard.drivers.iter().map(|d| d.code()).collect();
        assert_eq!(codes, vec!["VER", "NOR", "PIA"]);
        assert_eq!(dashboard.selected_driver().unwrap().code(), "VER");

        // McLaren 58 > Red Bull 43
        let bars: Vec<(&str, f64)> = dashboard
            .constructors
            .iter()
            .map(|b| (b.label.as_str(), b.total))
            .collect();
        assert_eq!(bars, vec![("Red Bull", 43.0), ("McLaren", 58.0)]);

        let pia = &dashboard.championship[2];
        assert_eq!(pia.code.as_deref(), Some("PIA"));
        assert_eq!(pia.points, vec![(1.0, 15.0), (2.0, 15.0)]);
    }

    #[test]
    fn test_unknown_default_driver_selects_first() {
        let dashboard = board().dashboard(&Config::default(), "HAM").unwrap();
        assert_eq!(dashboard.selected, Some(0));
    }

    #[test]
    fn test_sample_dataset() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/sample.csv");
        let results = standings::loader::load_results(path).unwrap();
        let board = Board::new(results, "driver_headshots").unwrap();
        assert_eq!(board.roster.len(), 9);

        let ver = board.driver_card("VER").unwrap();
        assert_eq!(ver.total_points, 51.0);
        assert_eq!(ver.races, 3);
        assert_eq!(ver.avg_position, Some(1.0));
        assert_eq!(ver.best_lap.as_deref(), Some("1:22.542"));

        let dashboard = board.dashboard(&Config::default(), "VER").unwrap();
        let bars: Vec<(&str, f64)> = dashboard
            .constructors
            .iter()
            .map(|b| (b.label.as_str(), b.total))
            .collect();
        assert_eq!(
            bars,
            vec![
                ("Mercedes", 26.0),
                ("McLaren", 55.0),
                ("Ferrari", 93.0),
                ("Red Bull", 97.0)
            ]
        );
        let all_points: f64 = bars.iter().map(|(_, p)| p).sum();
        assert_eq!(all_points, 271.0);
    }
}
