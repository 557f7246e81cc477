use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForestError {
    #[error("invalid plan JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid plan JSON5: {0}")]
    Json5(#[from] json5::Error),
    #[error("no plans found in input")]
    EmptyInput,
}

pub type Result<T> = std::result::Result<T, ForestError>;
