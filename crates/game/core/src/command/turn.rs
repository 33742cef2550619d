use rand::RngCore;

use super::{CommandKind, Transition};
use crate::error::SessionError;
use crate::patch::Patch;
use crate::state::{Phase, PlayerId, Session, fields};

/// Host turns the head of the draw pile face-up.
///
/// Revealing an already revealed slip plans an empty patch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RevealCurrent;

impl Transition for RevealCurrent {
    fn kind(&self) -> CommandKind {
        CommandKind::RevealCurrent
    }

    fn allowed_phases(&self) -> &'static [Phase] {
        &[Phase::Playing]
    }

    fn pre_validate(&self, session: &Session, _actor: &PlayerId) -> Result<(), SessionError> {
        if session.draw_pile.is_empty() {
            return Err(SessionError::not_found("slip to reveal"));
        }
        Ok(())
    }

    fn plan(&self, session: &Session, _actor: &PlayerId, _rng: &mut dyn RngCore) -> Patch {
        if session.revealed {
            return Patch::new();
        }
        Patch::new().set(fields::REVEALED, true)
    }
}

/// Host moves the current slip onto the discard pile.
///
/// Drawing the last slip ends the game.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AdvanceSlip;

impl Transition for AdvanceSlip {
    fn kind(&self) -> CommandKind {
        CommandKind::AdvanceSlip
    }

    fn allowed_phases(&self) -> &'static [Phase] {
        &[Phase::Playing]
    }

    fn pre_validate(&self, session: &Session, _actor: &PlayerId) -> Result<(), SessionError> {
        if session.draw_pile.is_empty() {
            return Err(SessionError::not_found("slip to advance past"));
        }
        Ok(())
    }

    fn plan(&self, session: &Session, _actor: &PlayerId, _rng: &mut dyn RngCore) -> Patch {
        let mut draw_pile = session.draw_pile.clone();
        let mut discard_pile = session.discard_pile.clone();
        let current = draw_pile.remove(0);
        discard_pile.push(current);

        let phase = if draw_pile.is_empty() {
            Phase::Ended
        } else {
            Phase::Playing
        };

        Patch::new()
            .set(fields::DRAW_PILE, draw_pile)
            .set(fields::DISCARD_PILE, discard_pile)
            .set(fields::REVEALED, false)
            .set(fields::PHASE, phase)
    }
}

/// Host steps back to the most recently discarded slip, face-up.
///
/// Legal from `ended` too, so the final slip can be shown again.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RetreatSlip;

impl Transition for RetreatSlip {
    fn kind(&self) -> CommandKind {
        CommandKind::RetreatSlip
    }

    fn allowed_phases(&self) -> &'static [Phase] {
        &[Phase::Playing, Phase::Ended]
    }

    fn pre_validate(&self, session: &Session, _actor: &PlayerId) -> Result<(), SessionError> {
        if session.discard_pile.is_empty() {
            return Err(SessionError::not_found("slip to step back to"));
        }
        Ok(())
    }

    fn plan(&self, session: &Session, _actor: &PlayerId, _rng: &mut dyn RngCore) -> Patch {
        let mut draw_pile = session.draw_pile.clone();
        let mut discard_pile = session.discard_pile.clone();
        if let Some(previous) = discard_pile.pop() {
            draw_pile.insert(0, previous);
        }

        Patch::new()
            .set(fields::DRAW_PILE, draw_pile)
            .set(fields::DISCARD_PILE, discard_pile)
            .set(fields::REVEALED, true)
            .set(fields::PHASE, Phase::Playing)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::command::Command;
    use crate::error::ErrorKind;
    use crate::state::{Player, SessionCode};

    fn pid(raw: &str) -> PlayerId {
        PlayerId::parse(raw).unwrap()
    }

    fn playing(draw: &[&str], discard: &[&str], revealed: bool) -> Session {
        let mut session =
            Session::new(SessionCode::parse("K7QZ").unwrap(), pid("ann"), "Ann").unwrap();
        session.players.insert(pid("bo"), Player::new("Bo", false));
        session.phase = Phase::Playing;
        session.draw_pile = draw.iter().map(|s| s.to_string()).collect();
        session.discard_pile = discard.iter().map(|s| s.to_string()).collect();
        session.revealed = revealed;
        session
    }

    #[test]
    fn playing_operations_fail_in_lobby() {
        let mut session = playing(&["a"], &["b"], false);
        session.phase = Phase::Lobby;
        let mut rng = StdRng::seed_from_u64(0);

        for command in [
            Command::RevealCurrent(RevealCurrent),
            Command::AdvanceSlip(AdvanceSlip),
            Command::RetreatSlip(RetreatSlip),
        ] {
            let err = session.plan(&pid("ann"), &command, &mut rng).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidPhase, "{}", command.kind());
        }
    }

    #[test]
    fn non_host_is_rejected_before_phase() {
        let mut session = playing(&["a"], &[], false);
        session.phase = Phase::Lobby;
        let mut rng = StdRng::seed_from_u64(0);

        let err = session
            .plan(&pid("bo"), &Command::AdvanceSlip(AdvanceSlip), &mut rng)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
    }

    #[test]
    fn reveal_is_idempotent() {
        let mut session = playing(&["a", "b"], &[], false);
        let mut rng = StdRng::seed_from_u64(0);

        let patch = session
            .execute(&pid("ann"), &Command::RevealCurrent(RevealCurrent), &mut rng)
            .unwrap();
        assert!(!patch.is_empty());
        assert_eq!(session.revealed_slip(), Some("a"));

        let patch = session
            .execute(&pid("ann"), &Command::RevealCurrent(RevealCurrent), &mut rng)
            .unwrap();
        assert!(patch.is_empty());
        assert!(session.revealed);
    }

    #[test]
    fn advance_moves_head_to_discard() {
        let mut session = playing(&["a", "b", "c"], &["z"], true);
        let mut rng = StdRng::seed_from_u64(0);
        session
            .execute(&pid("ann"), &Command::AdvanceSlip(AdvanceSlip), &mut rng)
            .unwrap();

        assert_eq!(session.draw_pile, ["b", "c"]);
        assert_eq!(session.discard_pile, ["z", "a"]);
        assert!(!session.revealed);
        assert_eq!(session.phase, Phase::Playing);
    }

    #[test]
    fn advancing_past_last_slip_ends_game() {
        let mut session = playing(&["only"], &[], true);
        let mut rng = StdRng::seed_from_u64(0);
        session
            .execute(&pid("ann"), &Command::AdvanceSlip(AdvanceSlip), &mut rng)
            .unwrap();

        assert!(session.draw_pile.is_empty());
        assert_eq!(session.phase, Phase::Ended);

        let err = session
            .plan(&pid("ann"), &Command::AdvanceSlip(AdvanceSlip), &mut rng)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPhase);
    }

    #[test]
    fn empty_piles_are_not_found() {
        let session = playing(&[], &[], false);
        let mut rng = StdRng::seed_from_u64(0);

        for command in [
            Command::RevealCurrent(RevealCurrent),
            Command::AdvanceSlip(AdvanceSlip),
            Command::RetreatSlip(RetreatSlip),
        ] {
            let err = session.plan(&pid("ann"), &command, &mut rng).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NotFound, "{}", command.kind());
        }
    }

    #[test]
    fn retreat_undoes_advance() {
        let cases: &[(&[&str], &[&str])] = &[
            (&["a"], &[]),
            (&["a", "b"], &[]),
            (&["a", "b", "c"], &["x", "y"]),
            (&["dup", "dup"], &["dup"]),
        ];
        let mut rng = StdRng::seed_from_u64(0);

        for (draw, discard) in cases {
            let mut session = playing(draw, discard, true);
            let before = session.clone();

            session
                .execute(&pid("ann"), &Command::AdvanceSlip(AdvanceSlip), &mut rng)
                .unwrap();
            session
                .execute(&pid("ann"), &Command::RetreatSlip(RetreatSlip), &mut rng)
                .unwrap();

            assert_eq!(session.draw_pile, before.draw_pile);
            assert_eq!(session.discard_pile, before.discard_pile);
            assert_eq!(session.revealed, before.revealed);
            assert_eq!(session.phase, Phase::Playing);
        }
    }

    #[test]
    fn retreat_after_unrevealed_advance_restores_piles_face_up() {
        let cases: &[(&[&str], &[&str])] = &[(&["a"], &[]), (&["a", "b"], &["x"])];
        let mut rng = StdRng::seed_from_u64(0);

        for (draw, discard) in cases {
            let mut session = playing(draw, discard, false);
            let before = session.clone();

            session
                .execute(&pid("ann"), &Command::AdvanceSlip(AdvanceSlip), &mut rng)
                .unwrap();
            session
                .execute(&pid("ann"), &Command::RetreatSlip(RetreatSlip), &mut rng)
                .unwrap();

            assert_eq!(session.draw_pile, before.draw_pile);
            assert_eq!(session.discard_pile, before.discard_pile);
            assert!(session.revealed);
            assert_eq!(session.revealed_slip(), Some("a"));
            assert_eq!(session.phase, Phase::Playing);
        }
    }
}
