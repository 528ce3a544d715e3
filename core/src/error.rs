use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("missing field `{path}`")]
    Missing { path: String },

    #[error("invalid field `{path}`: {reason}")]
    Invalid { path: String, reason: String },

    #[error("unknown pipeline step `{0}`")]
    UnknownPipelineStep(String),

    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] bincode::Error),
}

impl IndexError {
    pub(crate) fn missing(path: impl Into<String>) -> Self {
        IndexError::Missing { path: path.into() }
    }

    pub(crate) fn invalid(path: impl Into<String>, reason: impl Into<String>) -> Self {
        IndexError::Invalid { path: path.into(), reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, IndexError>;
