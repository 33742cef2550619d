//! Session commands and their transition rules.
//!
//! Every mutation a client can request is an explicit [`Command`] variant
//! backed by a type implementing [`Transition`]. The engine validates the
//! acting player and phase generically, then lets the transition check its
//! own preconditions and plan a single [`Patch`].

mod host;
mod join;
mod lifecycle;
mod slips;
mod turn;

pub use host::UsurpHost;
pub use join::JoinSession;
pub use lifecycle::{StartPlaying, StartSubmitting};
pub use slips::{AddSlip, RemoveSlip};
pub use turn::{AdvanceSlip, RetreatSlip, RevealCurrent};

use rand::RngCore;

use crate::error::SessionError;
use crate::patch::Patch;
use crate::state::{Phase, PlayerId, Session};

/// Stable name of each command, used in errors and logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum CommandKind {
    AddSlip,
    RemoveSlip,
    StartSubmitting,
    StartPlaying,
    RevealCurrent,
    AdvanceSlip,
    RetreatSlip,
    UsurpHost,
}

/// Validation and planning contract shared by every command.
///
/// The engine checks membership, [`requires_host`](Self::requires_host) and
/// [`allowed_phases`](Self::allowed_phases) before calling
/// [`pre_validate`](Self::pre_validate); `plan` may assume all of them passed.
pub trait Transition {
    fn kind(&self) -> CommandKind;

    /// Whether only the current host may issue this command.
    fn requires_host(&self) -> bool {
        true
    }

    /// Phases in which the command is legal.
    fn allowed_phases(&self) -> &'static [Phase];

    /// Command-specific preconditions against the state **before** mutation.
    fn pre_validate(&self, _session: &Session, _actor: &PlayerId) -> Result<(), SessionError> {
        Ok(())
    }

    /// Builds the single patch implementing the command. An empty patch means
    /// the command is a no-op in the current state.
    fn plan(&self, session: &Session, actor: &PlayerId, rng: &mut dyn RngCore) -> Patch;
}

/// Tagged command issued by one player against one session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    AddSlip(AddSlip),
    RemoveSlip(RemoveSlip),
    StartSubmitting(StartSubmitting),
    StartPlaying(StartPlaying),
    RevealCurrent(RevealCurrent),
    AdvanceSlip(AdvanceSlip),
    RetreatSlip(RetreatSlip),
    UsurpHost(UsurpHost),
}

impl Command {
    pub fn add_slip(text: impl Into<String>) -> Self {
        Command::AddSlip(AddSlip::new(text))
    }

    pub fn remove_slip(index: usize) -> Self {
        Command::RemoveSlip(RemoveSlip::new(index))
    }

    pub fn transition(&self) -> &dyn Transition {
        match self {
            Command::AddSlip(t) => t,
            Command::RemoveSlip(t) => t,
            Command::StartSubmitting(t) => t,
            Command::StartPlaying(t) => t,
            Command::RevealCurrent(t) => t,
            Command::AdvanceSlip(t) => t,
            Command::RetreatSlip(t) => t,
            Command::UsurpHost(t) => t,
        }
    }

    pub fn kind(&self) -> CommandKind {
        self.transition().kind()
    }
}
