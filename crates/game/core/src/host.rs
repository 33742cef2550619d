//! Host election.
//!
//! Every client runs the same reconciliation on every roster snapshot. The
//! result depends only on the roster, so concurrent watchers compute the same
//! winner and their writes are idempotent.

use std::collections::BTreeMap;

use crate::patch::Patch;
use crate::state::{Player, PlayerId, fields};

/// Player that should hold the host role for `players`.
///
/// An existing host keeps the role; with several, the lowest id among them
/// wins. With none, the lowest id overall is elected. Departed entries never
/// win.
pub fn elect(players: &BTreeMap<PlayerId, Player>) -> Option<&PlayerId> {
    let mut members = players.iter().filter(|(_, player)| !player.is_departed());
    members
        .clone()
        .find(|(_, player)| player.is_host)
        .or_else(|| members.next())
        .map(|(id, _)| id)
}

/// Patch restoring exactly one host and deleting departed entries, or `None`
/// when the roster is already consistent (or empty).
pub fn reconcile(players: &BTreeMap<PlayerId, Player>) -> Option<Patch> {
    let winner = elect(players);

    let mut patch = Patch::new();
    for (id, player) in players {
        if player.is_departed() {
            patch.push_delete(fields::player(id));
            continue;
        }
        let should_host = winner == Some(id);
        if should_host != player.is_host {
            patch.push_set(fields::player_is_host(id), should_host);
        }
    }

    if patch.is_empty() { None } else { Some(patch) }
}
