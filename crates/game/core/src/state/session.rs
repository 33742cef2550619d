use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{PlayerId, SessionCode, fields};
use crate::error::SessionError;
use crate::patch::Patch;

/// Session lifecycle phase.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    #[default]
    Lobby,
    Submitting,
    Playing,
    Ended,
}

impl Phase {
    /// Every phase, in lifecycle order.
    pub const ALL: &'static [Phase] = &[
        Phase::Lobby,
        Phase::Submitting,
        Phase::Playing,
        Phase::Ended,
    ];
}

impl From<Phase> for Value {
    fn from(phase: Phase) -> Self {
        Value::String(phase.as_ref().to_string())
    }
}

/// A participant of exactly one session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub is_host: bool,
}

impl Player {
    pub fn new(nickname: impl Into<String>, is_host: bool) -> Self {
        Self {
            nickname: nickname.into(),
            is_host,
        }
    }

    /// True for an entry with no nickname.
    ///
    /// A flag write planned from a stale snapshot can land after the
    /// player's disconnect cleanup and leave `players/<id>` holding nothing
    /// but `isHost`. Such an entry is not a member and host reconciliation
    /// deletes it.
    pub fn is_departed(&self) -> bool {
        self.nickname.is_empty()
    }

    /// Document representation used in patches.
    pub fn to_value(&self) -> Value {
        json!({ "nickname": self.nickname, "isHost": self.is_host })
    }
}

/// Trims a player-supplied nickname and rejects blank input.
pub fn normalize_nickname(raw: &str) -> Result<String, SessionError> {
    let nickname = raw.trim();
    if nickname.is_empty() {
        return Err(SessionError::validation("nickname must not be empty"));
    }
    Ok(nickname.to_string())
}

/// Root aggregate shared by every client of one game.
///
/// Collections default to empty when absent from the document so that stores
/// which drop empty containers still decode cleanly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub code: SessionCode,
    #[serde(default)]
    pub phase: Phase,
    #[serde(default)]
    pub players: BTreeMap<PlayerId, Player>,
    #[serde(default)]
    pub slips_by_player: BTreeMap<PlayerId, Vec<String>>,
    #[serde(default)]
    pub draw_pile: Vec<String>,
    #[serde(default)]
    pub discard_pile: Vec<String>,
    #[serde(default)]
    pub revealed: bool,
}

impl Session {
    /// Creates a lobby with the creator as its only player and host.
    pub fn new(
        code: SessionCode,
        creator: PlayerId,
        nickname: &str,
    ) -> Result<Self, SessionError> {
        let nickname = normalize_nickname(nickname)?;
        let mut players = BTreeMap::new();
        players.insert(creator.clone(), Player::new(nickname, true));
        let mut slips_by_player = BTreeMap::new();
        slips_by_player.insert(creator, Vec::new());

        Ok(Self {
            code,
            phase: Phase::Lobby,
            players,
            slips_by_player,
            draw_pile: Vec::new(),
            discard_pile: Vec::new(),
            revealed: false,
        })
    }

    pub fn from_document(document: &Value) -> Result<Self, SessionError> {
        Self::deserialize(document).map_err(|e| SessionError::MalformedDocument(e.to_string()))
    }

    pub fn to_document(&self) -> Result<Value, SessionError> {
        serde_json::to_value(self).map_err(|e| SessionError::MalformedDocument(e.to_string()))
    }

    /// Applies a planned patch to this local copy.
    ///
    /// Clients normally observe patches through the store; this is the same
    /// transformation run locally, used by tests and offline tooling.
    pub fn apply_patch(&mut self, patch: &Patch) -> Result<(), SessionError> {
        let mut document = self.to_document()?;
        patch
            .apply(&mut document)
            .map_err(|e| SessionError::MalformedDocument(e.to_string()))?;
        *self = Self::from_document(&document)?;
        Ok(())
    }

    /// Roster entries that belong to present players, in id order.
    pub fn members(&self) -> impl Iterator<Item = (&PlayerId, &Player)> {
        self.players.iter().filter(|(_, player)| !player.is_departed())
    }

    pub fn member(&self, id: &PlayerId) -> Option<&Player> {
        self.players.get(id).filter(|player| !player.is_departed())
    }

    pub fn is_member(&self, id: &PlayerId) -> bool {
        self.member(id).is_some()
    }

    pub fn is_host(&self, id: &PlayerId) -> bool {
        self.member(id).is_some_and(|player| player.is_host)
    }

    pub fn has_host(&self) -> bool {
        self.members().any(|(_, player)| player.is_host)
    }

    /// Ids of every member currently marked host, in id order.
    pub fn hosts(&self) -> impl Iterator<Item = &PlayerId> {
        self.members()
            .filter(|(_, player)| player.is_host)
            .map(|(id, _)| id)
    }

    /// The host, if one can be determined (lowest id wins a tie).
    pub fn host(&self) -> Option<(&PlayerId, &Player)> {
        self.members().find(|(_, player)| player.is_host)
    }

    pub fn slips_of(&self, id: &PlayerId) -> &[String] {
        self.slips_by_player
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn total_slips(&self) -> usize {
        self.slips_by_player.values().map(Vec::len).sum()
    }

    /// Head of the draw pile, the slip currently in play.
    pub fn current_slip(&self) -> Option<&str> {
        self.draw_pile.first().map(String::as_str)
    }

    /// Slip text shown face-up, if any.
    pub fn revealed_slip(&self) -> Option<&str> {
        if self.revealed {
            self.current_slip()
        } else {
            None
        }
    }

    pub fn is_pile_exhausted(&self) -> bool {
        matches!(self.phase, Phase::Playing | Phase::Ended) && self.draw_pile.is_empty()
    }

    /// Full document field for a player's slip list.
    pub(crate) fn slips_patch(id: &PlayerId, slips: Vec<String>) -> Patch {
        Patch::new().set(fields::slips(id), slips)
    }
}
