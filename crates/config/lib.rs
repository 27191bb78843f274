use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use log::warn;

pub const DEFAULT_CONFIG_FILE: &str = ".f1-standings.yml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to open config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unknown data source: {0}")]
    UnknownSource(String),
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub season: String,
    /// Logical name of the results table, looked up in `sources`.
    pub source: String,
    pub sources: HashMap<String, PathBuf>,
    pub default_driver: String,
    pub headshot_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            season: "2024".to_string(),
            source: "sample_csv".to_string(),
            sources: HashMap::from([(
                "sample_csv".to_string(),
                PathBuf::from("data/sample.csv"),
            )]),
            default_driver: "VER".to_string(),
            headshot_dir: PathBuf::from("driver_headshots"),
            output_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    pub fn new<P: AsRef<Path>>(filename: P) -> Result<Config, ConfigError> {
        let path = filename.as_ref();
        let reader = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Like [`Config::new`], but a missing file yields the defaults.
    pub fn load_or_default<P: AsRef<Path>>(filename: P) -> Result<Config, ConfigError> {
        let path = filename.as_ref();
        if !path.exists() {
            warn!("config file {:?} not found, using defaults", path);
            return Ok(Config::default());
        }
        Config::new(path)
    }

    /// Resolve a data source by logical name. A name that is not configured
    /// but points at an existing file is used as a path directly.
    pub fn resolve_source(&self, name: &str) -> Result<PathBuf, ConfigError> {
        if let Some(path) = self.sources.get(name) {
            return Ok(path.clone());
        }
        let path = Path::new(name);
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        Err(ConfigError::UnknownSource(name.to_string()))
    }

    pub fn headline(&self, subject: &str) -> String {
        format!("F1 {} {}", self.season, subject)
    }
}
