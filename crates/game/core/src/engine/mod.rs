//! Command validation and patch planning.
//!
//! The [`SessionEngine`] is the single gate between a client's intent and the
//! shared document. It orchestrates the checks every command shares, then
//! delegates to the command's [`Transition`] for its own preconditions and
//! planned patch:
//!
//! membership → authorization → phase → pre_validate → plan
//!
//! The engine never writes anything. The resulting [`Patch`] is handed to the
//! store in one round trip, or applied locally with [`Session::execute`].

use rand::RngCore;

use crate::command::{Command, Transition};
use crate::error::SessionError;
use crate::patch::Patch;
use crate::state::{PlayerId, Session};

/// Validates commands against a point-in-time view of a session.
pub struct SessionEngine<'a> {
    session: &'a Session,
}

impl<'a> SessionEngine<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Validates `command` for `actor` and plans its patch.
    pub fn plan(
        &self,
        actor: &PlayerId,
        command: &Command,
        rng: &mut dyn RngCore,
    ) -> Result<Patch, SessionError> {
        let transition = command.transition();
        self.validate_actor(actor, transition)?;
        self.validate_phase(transition)?;
        transition.pre_validate(self.session, actor)?;
        Ok(transition.plan(self.session, actor, rng))
    }

    fn validate_actor(
        &self,
        actor: &PlayerId,
        transition: &dyn Transition,
    ) -> Result<(), SessionError> {
        if !self.session.is_member(actor) {
            return Err(SessionError::not_found(format!(
                "player `{actor}` in session `{}`",
                self.session.code
            )));
        }
        if transition.requires_host() && !self.session.is_host(actor) {
            return Err(SessionError::Authorization {
                actor: actor.clone(),
                operation: transition.kind(),
            });
        }
        Ok(())
    }

    fn validate_phase(&self, transition: &dyn Transition) -> Result<(), SessionError> {
        if transition.allowed_phases().contains(&self.session.phase) {
            Ok(())
        } else {
            Err(SessionError::InvalidPhase {
                operation: transition.kind(),
                actual: self.session.phase,
            })
        }
    }
}

impl Session {
    /// Shorthand for [`SessionEngine::plan`].
    pub fn plan(
        &self,
        actor: &PlayerId,
        command: &Command,
        rng: &mut dyn RngCore,
    ) -> Result<Patch, SessionError> {
        SessionEngine::new(self).plan(actor, command, rng)
    }

    /// Plans `command` and applies the patch to this local copy.
    pub fn execute(
        &mut self,
        actor: &PlayerId,
        command: &Command,
        rng: &mut dyn RngCore,
    ) -> Result<Patch, SessionError> {
        let patch = self.plan(actor, command, rng)?;
        self.apply_patch(&patch)?;
        Ok(patch)
    }
}
