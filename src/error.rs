use thiserror::Error;

#[derive(Error, Debug)]
pub enum GridPickError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Parsing Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Malformed Score Grid: {0}")]
    MalformedGrid(String),

    #[error("Invalid Trial Count: {0} (must be at least 1)")]
    InvalidTrialCount(i64),
}

pub type GpResult<T> = Result<T, GridPickError>;
