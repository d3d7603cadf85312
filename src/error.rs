use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToastError {
    #[error("Invalid queue capacity: must be at least 1")]
    InvalidCapacity,

    #[error("Invalid default lifetime: must be greater than 0ms")]
    InvalidLifetime,

    #[error("Invalid script at line {line}: {message}")]
    Script { line: usize, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
