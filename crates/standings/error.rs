use std::path::PathBuf;

use polars::prelude::PolarsError;

#[derive(Debug, thiserror::Error)]
pub enum StandingsError {
    #[error("data source not found: {0:?}")]
    SourceNotFound(PathBuf),
    #[error("missing column in race results: {0}")]
    MissingColumn(String),
    #[error(transparent)]
    Polars(#[from] PolarsError),
    #[error("failed to decode frame rows: {0}")]
    Json(#[from] serde_json::Error),
}
