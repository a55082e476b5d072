use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Upstream error: HTTP {status} - {body}")]
    Upstream { status: u16, body: String },

    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Implement alias for Result to simplify usage
pub type AppResult<T> = Result<T, AppError>;
