//! Common error infrastructure for game-core.
//!
//! Every rule violation surfaces as a [`SessionError`]. Callers that only need
//! to branch on the broad category use [`SessionError::kind`], which maps each
//! variant onto the stable [`ErrorKind`] taxonomy shared with the runtime.

use crate::command::CommandKind;
use crate::state::{Phase, PlayerId, SessionCode};

/// Broad error categories, stable across crates.
///
/// - **Validation**: empty or malformed input, never worth retrying unchanged
/// - **NotFound**: the session, player or slip addressed does not exist
/// - **Authorization**: a non-host attempted a host-only operation
/// - **InvalidPhase**: the operation is not legal in the current phase
/// - **Store**: the document substrate failed or returned unusable data
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Authorization,
    InvalidPhase,
    Store,
}

/// Errors raised while validating or planning a session operation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("session `{0}` not found")]
    SessionNotFound(SessionCode),

    #[error("player `{actor}` is not the host and cannot {operation}")]
    Authorization {
        actor: PlayerId,
        operation: CommandKind,
    },

    #[error("cannot {operation} while the session is in the {actual} phase")]
    InvalidPhase {
        operation: CommandKind,
        actual: Phase,
    },

    #[error("malformed session document: {0}")]
    MalformedDocument(String),
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::Validation(_) => ErrorKind::Validation,
            SessionError::NotFound(_) | SessionError::SessionNotFound(_) => ErrorKind::NotFound,
            SessionError::Authorization { .. } => ErrorKind::Authorization,
            SessionError::InvalidPhase { .. } => ErrorKind::InvalidPhase,
            SessionError::MalformedDocument(_) => ErrorKind::Store,
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        SessionError::Validation(message.into())
    }

    pub(crate) fn not_found(what: impl Into<String>) -> Self {
        SessionError::NotFound(what.into())
    }
}
