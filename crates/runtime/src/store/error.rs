//! Error types raised by document store implementations.

use game_core::PatchError;
use thiserror::Error;

/// Transport or backend failures of the document substrate.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("connection to the store is no longer live")]
    Disconnected,

    #[error("document `{0}` does not exist")]
    DocumentMissing(String),

    #[error("store lock was poisoned")]
    LockPoisoned,

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    InvalidPatch(#[from] PatchError),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
