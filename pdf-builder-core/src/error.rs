use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuilderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown field type: {0}")]
    UnknownFieldType(String),

    #[error("Unknown container: {0}")]
    UnknownContainer(String),

    #[error("Malformed '{name}' message: {reason}")]
    MalformedMessage { name: String, reason: String },

    #[error("Upload transport error: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, BuilderError>;
