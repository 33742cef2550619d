//! Deterministic session rules shared by every client.
//!
//! `game-core` defines the canonical data model (sessions, players, slip
//! piles), the commands that mutate it, and the host election rule. It exposes
//! pure APIs: all validation flows through [`engine::SessionEngine`], whose
//! output is a [`Patch`] for the runtime to hand to the document store.
pub mod command;
pub mod engine;
pub mod error;
pub mod host;
pub mod patch;
pub mod state;
pub mod words;

pub use command::{
    AddSlip, AdvanceSlip, Command, CommandKind, JoinSession, RemoveSlip, RetreatSlip,
    RevealCurrent, StartPlaying, StartSubmitting, Transition, UsurpHost,
};
pub use engine::SessionEngine;
pub use error::{ErrorKind, SessionError};
pub use patch::{FieldUpdate, Patch, PatchError};
pub use state::{
    PLAYER_ID_LEN, Phase, Player, PlayerId, Session, SessionCode, fields, normalize_nickname,
};
