//! Unified error type surfaced by the client API.
//!
//! Wraps rule violations from `game-core`, store failures, and local profile
//! failures so callers can branch on [`ClientError::kind`].
use thiserror::Error;

use game_core::{ErrorKind, SessionError};

pub use crate::repository::RepositoryError;
use crate::store::StoreError;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("profile error: {0}")]
    Profile(#[from] RepositoryError),
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Session(err) => err.kind(),
            ClientError::Store(_) | ClientError::Profile(_) => ErrorKind::Store,
        }
    }
}
