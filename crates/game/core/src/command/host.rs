use rand::RngCore;

use super::{CommandKind, Transition};
use crate::patch::Patch;
use crate::state::{Phase, PlayerId, Session, fields};

/// Any member takes the host role without the current host's consent.
///
/// Only `isHost` flags are touched: every current host is demoted and the
/// actor promoted. Usurping while already the sole host plans nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UsurpHost;

impl Transition for UsurpHost {
    fn kind(&self) -> CommandKind {
        CommandKind::UsurpHost
    }

    fn requires_host(&self) -> bool {
        false
    }

    fn allowed_phases(&self) -> &'static [Phase] {
        Phase::ALL
    }

    fn plan(&self, session: &Session, actor: &PlayerId, _rng: &mut dyn RngCore) -> Patch {
        let mut patch = Patch::new();
        for host in session.hosts().filter(|host| *host != actor) {
            patch.push_set(fields::player_is_host(host), false);
        }
        if !session.is_host(actor) {
            patch.push_set(fields::player_is_host(actor), true);
        }
        patch
    }
}
