//! FILENAME: core/crosstab-format/src/error.rs

use crosstab_engine::CrossTabError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    #[error("Cross table error: {0}")]
    Engine(#[from] CrossTabError),
}
