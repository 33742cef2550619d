//! Repository contract for the local session profile.

use game_core::{PlayerId, SessionCode};
use serde::{Deserialize, Serialize};

use super::Result;

/// What this device remembers about one joined session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinedSession {
    /// Identity used in the session; `None` when only the nickname is known.
    #[serde(default)]
    pub player_id: Option<PlayerId>,
    pub nickname: String,
}

impl JoinedSession {
    pub fn new(player_id: PlayerId, nickname: impl Into<String>) -> Self {
        Self {
            player_id: Some(player_id),
            nickname: nickname.into(),
        }
    }
}

/// Per-device record of joined sessions, keyed by session code.
pub trait ProfileRepository: Send + Sync {
    /// Remember `entry` for `code`, replacing any previous entry.
    fn save(&self, code: &SessionCode, entry: &JoinedSession) -> Result<()>;

    /// Entry for `code`, if this device joined it.
    fn load(&self, code: &SessionCode) -> Result<Option<JoinedSession>>;

    /// Forget `code`. Missing entries are not an error.
    fn delete(&self, code: &SessionCode) -> Result<()>;

    /// Every code with a stored entry, sorted.
    fn list_sessions(&self) -> Result<Vec<SessionCode>>;
}
