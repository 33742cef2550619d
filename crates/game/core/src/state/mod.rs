//! Authoritative session document representation.
//!
//! This module owns the data structures that describe a session, its players
//! and the slip piles. Clients decode the shared document into these types and
//! mutate it exclusively through patches planned by the engine.
pub mod fields;
mod ids;
mod session;

pub use ids::{PLAYER_ID_LEN, PlayerId, SessionCode};
pub use session::{Phase, Player, Session, normalize_nickname};
