use serde::Serialize;
use std::error::Error;

/// Recomputes the stats card whenever the selected driver changes.
pub trait CardSource {
    fn card(&self, code: &str) -> Result<DriverCard, Box<dyn Error>>;
}

#[derive(Debug, Clone, Serialize)]
pub struct DriverOption {
    pub code: String,
    pub name: String,
    pub team: String,
}

impl DriverOption {
    pub const fn ref_array(&self) -> [&String; 3] {
        [&self.code, &self.name, &self.team]
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn team(&self) -> &str {
        &self.team
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DriverCard {
    pub code: String,
    pub name: String,
    pub team: String,
    pub image: String,
    pub total_points: f64,
    pub avg_position: Option<f64>,
    pub races: u32,
    pub avg_grid: Option<f64>,
    pub best_lap: Option<String>,
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.2}", v),
        _ => "n/a".to_string(),
    }
}

impl DriverCard {
    pub fn fields(&self) -> [(&'static str, String); 6] {
        [
            ("Team", self.team.clone()),
            ("Total Points", format!("{:.0}", self.total_points)),
            ("Average Finish Position", fmt_opt(self.avg_position)),
            ("Races Participated", self.races.to_string()),
            ("Average Starting Grid", fmt_opt(self.avg_grid)),
            (
                "Best Fastest Lap Time",
                self.best_lap.clone().unwrap_or_else(|| "n/a".to_string()),
            ),
        ]
    }

    pub fn markdown(&self) -> String {
        let mut text = format!("## {}\n\n", self.name);
        for (label, value) in self.fields() {
            text.push_str(&format!("**{}:** {}  \n", label, value));
        }
        text
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PointsSeries {
    pub label: String,
    pub code: Option<String>,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Segment {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StackedBar {
    pub label: String,
    pub total: f64,
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Headlines {
    pub standings: String,
    pub championship: String,
    pub constructors: String,
}

/// Everything the dashboard shows apart from the per-driver card.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub headlines: Headlines,
    pub drivers: Vec<DriverOption>,
    pub selected: Option<usize>,
    pub championship: Vec<PointsSeries>,
    /// Ascending by total.
    pub constructors: Vec<StackedBar>,
}

impl Dashboard {
    pub fn selected_driver(&self) -> Option<&DriverOption> {
        self.selected.and_then(|i| self.drivers.get(i))
    }

    pub fn to_json(&self, card: Option<&DriverCard>) -> serde_json::Result<String> {
        #[derive(Serialize)]
        struct Payload<'a> {
            #[serde(flatten)]
            dashboard: &'a Dashboard,
            card: Option<&'a DriverCard>,
        }
        serde_json::to_string_pretty(&Payload {
            dashboard: self,
            card,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> DriverCard {
        DriverCard {
            code: "VER".to_string(),
            name: "Max Verstappen".to_string(),
            team: "Red Bull".to_string(),
            image: "driver_headshots/VER.png".to_string(),
            total_points: 43.0,
            avg_position: Some(1.5),
            races: 2,
            avg_grid: None,
            best_lap: Some("1:31.950".to_string()),
        }
    }

    #[test]
    fn card_fields() {
        let fields = card().fields();
        assert_eq!(fields[1], ("Total Points", "43".to_string()));
        assert_eq!(fields[2], ("Average Finish Position", "1.50".to_string()));
        assert_eq!(fields[3], ("Races Participated", "2".to_string()));
        assert_eq!(fields[4], ("Average Starting Grid", "n/a".to_string()));
    }

    #[test]
    fn card_markdown() {
        let text = card().markdown();
        assert!(text.starts_with("## Max Verstappen\n"));
        assert!(text.contains("**Team:** Red Bull  \n"));
        assert!(text.contains("**Best Fastest Lap Time:** 1:31.950"));
    }

    #[test]
    fn dashboard_json() {
        let dashboard = Dashboard {
            headlines: Headlines {
                standings: "F1 2024 Driver's Standings".to_string(),
                championship: "F1 2024 Driver's Championship".to_string(),
                constructors: "F1 2024 Constructor's Championship".to_string(),
            },
            drivers: vec![DriverOption {
                code: "VER".to_string(),
                name: "Max Verstappen".to_string(),
                team: "Red Bull".to_string(),
            }],
            selected: Some(0),
            championship: vec![PointsSeries {
                label: "max_verstappen".to_string(),
                code: Some("VER".to_string()),
                points: vec![(1.0, 25.0), (2.0, 43.0)],
            }],
            constructors: vec![],
        };
        assert_eq!(dashboard.selected_driver().unwrap().code(), "VER");

        let json = dashboard.to_json(Some(&card())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["drivers"][0]["code"], "VER");
        assert_eq!(value["championship"][0]["points"][1][1], 43.0);
        assert_eq!(value["card"]["total_points"], 43.0);
        assert!(value["card"]["avg_grid"].is_null());
    }
}
