use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Unexpected HTTP status: {0}")]
    BadStatus(reqwest::StatusCode),
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
