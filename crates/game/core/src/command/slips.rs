use rand::RngCore;

use super::{CommandKind, Transition};
use crate::error::SessionError;
use crate::patch::Patch;
use crate::state::{Phase, PlayerId, Session};

/// Slips are collected before the pile is shuffled; afterwards they would
/// never be drawn.
const SLIP_PHASES: &[Phase] = &[Phase::Lobby, Phase::Submitting];

/// Appends a slip to the acting player's own list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddSlip {
    pub text: String,
}

impl AddSlip {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Transition for AddSlip {
    fn kind(&self) -> CommandKind {
        CommandKind::AddSlip
    }

    fn requires_host(&self) -> bool {
        false
    }

    fn allowed_phases(&self) -> &'static [Phase] {
        SLIP_PHASES
    }

    fn pre_validate(&self, _session: &Session, _actor: &PlayerId) -> Result<(), SessionError> {
        if self.text.trim().is_empty() {
            return Err(SessionError::validation("slip text must not be empty"));
        }
        Ok(())
    }

    fn plan(&self, session: &Session, actor: &PlayerId, _rng: &mut dyn RngCore) -> Patch {
        let mut slips = session.slips_of(actor).to_vec();
        slips.push(self.text.trim().to_string());
        Session::slips_patch(actor, slips)
    }
}

/// Removes the slip at `index` from the acting player's own list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RemoveSlip {
    pub index: usize,
}

impl RemoveSlip {
    pub fn new(index: usize) -> Self {
        Self { index }
    }
}

impl Transition for RemoveSlip {
    fn kind(&self) -> CommandKind {
        CommandKind::RemoveSlip
    }

    fn requires_host(&self) -> bool {
        false
    }

    fn allowed_phases(&self) -> &'static [Phase] {
        SLIP_PHASES
    }

    fn pre_validate(&self, session: &Session, actor: &PlayerId) -> Result<(), SessionError> {
        let slips = session.slips_of(actor);
        if slips.is_empty() {
            return Err(SessionError::not_found(format!("slips of player `{actor}`")));
        }
        if self.index >= slips.len() {
            return Err(SessionError::not_found(format!(
                "slip {} of player `{actor}` ({} submitted)",
                self.index,
                slips.len()
            )));
        }
        Ok(())
    }

    fn plan(&self, session: &Session, actor: &PlayerId, _rng: &mut dyn RngCore) -> Patch {
        let mut slips = session.slips_of(actor).to_vec();
        slips.remove(self.index);
        Session::slips_patch(actor, slips)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::command::Command;
    use crate::error::ErrorKind;
    use crate::state::{Phase, PlayerId, Session, SessionCode};

    fn pid(raw: &str) -> PlayerId {
        PlayerId::parse(raw).unwrap()
    }

    fn lobby() -> Session {
        Session::new(SessionCode::parse("K7QZ").unwrap(), pid("ann"), "Ann").unwrap()
    }

    #[test]
    fn replaying_adds_and_removes_preserves_order() {
        let mut session = lobby();
        let mut rng = StdRng::seed_from_u64(1);
        let ann = pid("ann");

        let script = [
            Command::add_slip("one"),
            Command::add_slip("two"),
            Command::add_slip("three"),
            Command::remove_slip(1),
            Command::add_slip("four"),
            Command::remove_slip(0),
        ];
        let mut expected: Vec<String> = Vec::new();
        for command in script {
            match &command {
                Command::AddSlip(add) => expected.push(add.text.clone()),
                Command::RemoveSlip(remove) => {
                    expected.remove(remove.index);
                }
                _ => unreachable!(),
            }
            session.execute(&ann, &command, &mut rng).unwrap();
        }

        assert_eq!(session.slips_of(&ann), ["three", "four"]);
        assert_eq!(session.slips_of(&ann), expected.as_slice());
    }

    #[test]
    fn slip_text_is_trimmed() {
        let mut session = lobby();
        let mut rng = StdRng::seed_from_u64(1);
        session
            .execute(&pid("ann"), &Command::add_slip("  I juggle \n"), &mut rng)
            .unwrap();

        assert_eq!(session.slips_of(&pid("ann")), ["I juggle"]);
    }

    #[test]
    fn blank_slip_is_a_validation_error() {
        let session = lobby();
        let mut rng = StdRng::seed_from_u64(1);
        let err = session
            .plan(&pid("ann"), &Command::add_slip(" \t "), &mut rng)
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn removing_out_of_range_is_not_found() {
        let mut session = lobby();
        let mut rng = StdRng::seed_from_u64(1);
        let ann = pid("ann");

        let err = session.plan(&ann, &Command::remove_slip(0), &mut rng).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        session.execute(&ann, &Command::add_slip("x"), &mut rng).unwrap();
        let err = session.plan(&ann, &Command::remove_slip(1), &mut rng).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(session.slips_of(&ann), ["x"]);
    }

    #[test]
    fn non_member_cannot_add_slips() {
        let session = lobby();
        let mut rng = StdRng::seed_from_u64(1);
        let err = session
            .plan(&pid("ghost"), &Command::add_slip("boo"), &mut rng)
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn slips_are_frozen_once_playing() {
        let mut session = lobby();
        session.phase = Phase::Playing;
        let mut rng = StdRng::seed_from_u64(1);
        let err = session
            .plan(&pid("ann"), &Command::add_slip("late"), &mut rng)
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidPhase);
    }
}
