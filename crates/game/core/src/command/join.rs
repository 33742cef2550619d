use crate::error::SessionError;
use crate::patch::Patch;
use crate::state::{Player, PlayerId, Session, fields, normalize_nickname};

/// A new player entering an existing session.
///
/// Joining is not a [`Transition`](super::Transition): the actor is not a
/// member yet, and any phase accepts newcomers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JoinSession {
    player_id: PlayerId,
    nickname: String,
}

impl JoinSession {
    pub fn new(player_id: PlayerId, nickname: &str) -> Result<Self, SessionError> {
        Ok(Self {
            player_id,
            nickname: normalize_nickname(nickname)?,
        })
    }

    pub fn player_id(&self) -> &PlayerId {
        &self.player_id
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    /// Plans the player entry, plus an empty slip list for a first join, in
    /// one patch.
    ///
    /// The newcomer claims host when the point-in-time `session` shows no host.
    /// Two simultaneous joins may both claim it; host reconciliation resolves
    /// that afterwards.
    pub fn plan(&self, session: &Session) -> Result<Patch, SessionError> {
        if session.is_member(&self.player_id) {
            return Err(SessionError::validation(format!(
                "player `{}` already joined session `{}`",
                self.player_id, session.code
            )));
        }

        let player = Player::new(self.nickname.clone(), !session.has_host());
        let mut patch = Patch::new().set(fields::player(&self.player_id), player.to_value());
        // A returning player keeps the slips written before they dropped out.
        if !session.slips_by_player.contains_key(&self.player_id) {
            patch.push_set(fields::slips(&self.player_id), Vec::<String>::new());
        }
        Ok(patch)
    }
}
