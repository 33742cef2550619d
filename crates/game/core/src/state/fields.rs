//! Field paths inside a session document.

use super::PlayerId;

pub const PHASE: &str = "phase";
pub const PLAYERS: &str = "players";
pub const DRAW_PILE: &str = "drawPile";
pub const DISCARD_PILE: &str = "discardPile";
pub const REVEALED: &str = "revealed";

pub fn player(id: &PlayerId) -> String {
    format!("{PLAYERS}/{id}")
}

pub fn player_is_host(id: &PlayerId) -> String {
    format!("{PLAYERS}/{id}/isHost")
}

pub fn slips(id: &PlayerId) -> String {
    format!("slipsByPlayer/{id}")
}
