use crypto::HashParseError;
use thiserror::Error;

/// Errors surfaced to callers of the ingestion, retrieval and deletion pipelines.
/// Consistency violations between the stores are never reported here; the reconciler owns them.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Malformed caller input (e.g. a hash that is not 64 hex characters)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The requested hash is absent from the relevant store
    #[error("Not found: {0}")]
    NotFound(String),

    /// The caller's stream broke before it was complete; nothing was committed
    #[error("Transport error: {0}")]
    Transport(String),

    /// Blob store, catalog or scratch buffer failure
    #[error("{context}: {source:#}")]
    Internal {
        context: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl PipelineError {
    pub fn internal(context: &'static str, source: impl Into<anyhow::Error>) -> Self {
        PipelineError::Internal {
            context,
            source: source.into(),
        }
    }

    pub fn transport(message: impl std::fmt::Display) -> Self {
        PipelineError::Transport(message.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PipelineError::NotFound(_))
    }
}

impl From<HashParseError> for PipelineError {
    fn from(e: HashParseError) -> Self {
        PipelineError::InvalidArgument(e.to_string())
    }
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;
