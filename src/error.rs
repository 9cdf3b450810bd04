use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Selector error: {0}")]
    Selector(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("No chart entries found")]
    NoEntriesFound,
    #[error("No charts found")]
    NoChartsFound,
}

pub type Result<T> = std::result::Result<T, ChartError>;
