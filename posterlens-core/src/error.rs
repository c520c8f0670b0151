//! Engine error taxonomy
//!
//! Only `MalformedResponse` is a hard failure of the adapter. `MissingSnapshot` is an
//! expected state that the aggregate facade degrades to "No Data". Absent optional
//! payload fields never produce an error at all.

use thiserror::Error;

/// Errors surfaced by the engine
#[derive(Debug, Error)]
pub enum EngineError {
    /// The evaluation payload was not a JSON object
    #[error("malformed evaluation response: expected a JSON object, found {found}")]
    MalformedResponse { found: String },

    /// A view asked for metrics before any snapshot was stored
    #[error("no analysis snapshot in the current session")]
    MissingSnapshot,

    /// An upload finished after a newer one had already started
    #[error("upload #{ticket} is stale (latest started upload is #{latest})")]
    StaleUpload { ticket: u64, latest: u64 },

    #[error("failed to encode analysis snapshot: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EngineError {
    pub(crate) fn malformed(found: impl Into<String>) -> Self {
        EngineError::MalformedResponse {
            found: found.into(),
        }
    }
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
