use thiserror::Error;

#[derive(Error, Debug)]
pub enum WastewatchError {
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("transform error: {0}")]
    Transform(String),

    #[error("fit did not converge: {0}")]
    FitConvergence(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WastewatchError>;
