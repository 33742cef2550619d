use rand::RngCore;
use rand::seq::SliceRandom;

use super::{CommandKind, Transition};
use crate::patch::Patch;
use crate::state::{Phase, PlayerId, Session, fields};

/// Host moves the lobby into slip submission.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StartSubmitting;

impl Transition for StartSubmitting {
    fn kind(&self) -> CommandKind {
        CommandKind::StartSubmitting
    }

    fn allowed_phases(&self) -> &'static [Phase] {
        &[Phase::Lobby]
    }

    fn plan(&self, _session: &Session, _actor: &PlayerId, _rng: &mut dyn RngCore) -> Patch {
        Patch::new().set(fields::PHASE, Phase::Submitting)
    }
}

/// Host closes submission and deals the draw pile.
///
/// The pile is a shuffle of every submitted slip, including those of players
/// who have since disconnected. Zero slips is legal and yields an empty pile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StartPlaying;

impl Transition for StartPlaying {
    fn kind(&self) -> CommandKind {
        CommandKind::StartPlaying
    }

    fn allowed_phases(&self) -> &'static [Phase] {
        &[Phase::Submitting]
    }

    fn plan(&self, session: &Session, _actor: &PlayerId, rng: &mut dyn RngCore) -> Patch {
        let mut pile: Vec<String> = session
            .slips_by_player
            .values()
            .flatten()
            .cloned()
            .collect();
        pile.shuffle(rng);

        Patch::new()
            .set(fields::PHASE, Phase::Playing)
            .set(fields::DRAW_PILE, pile)
            .set(fields::DISCARD_PILE, Vec::<String>::new())
            .set(fields::REVEALED, false)
    }
}
