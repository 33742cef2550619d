//! Identifier newtypes used as store path segments.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::words::GAME_WORDS;

/// Length of generated player ids.
pub const PLAYER_ID_LEN: usize = 12;

const PLAYER_ID_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_";

/// Opaque per-client player identifier.
///
/// Ordering is plain lexicographic byte order, which is what host election
/// relies on for its deterministic tie-break.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlayerId(String);

impl PlayerId {
    /// Generates a fresh id from the path-safe alphabet.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let id = (0..PLAYER_ID_LEN)
            .map(|_| PLAYER_ID_ALPHABET[rng.gen_range(0..PLAYER_ID_ALPHABET.len())] as char)
            .collect();
        Self(id)
    }

    pub fn parse(raw: &str) -> Result<Self, SessionError> {
        if raw.is_empty() {
            return Err(SessionError::validation("player id must not be empty"));
        }
        if !raw.bytes().all(|b| PLAYER_ID_ALPHABET.contains(&b)) {
            return Err(SessionError::validation(format!(
                "player id `{raw}` contains characters that are not path safe"
            )));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PlayerId {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PlayerId {
    type Error = SessionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PlayerId> for String {
    fn from(id: PlayerId) -> Self {
        id.0
    }
}

/// Short human-shareable session code.
///
/// Codes are upper-case and limited to `[A-Z0-9_]` so they can be typed back
/// in any case and used directly as a store path segment.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionCode(String);

impl SessionCode {
    /// Picks a code from the curated vocabulary.
    ///
    /// Collisions with a live session are possible and deliberately not
    /// checked.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let word = GAME_WORDS.choose(rng).copied().unwrap_or("SLIPS");
        Self(word.to_string())
    }

    /// Normalizes user input: surrounding whitespace is dropped and letters
    /// are upper-cased.
    pub fn parse(raw: &str) -> Result<Self, SessionError> {
        let code = raw.trim().to_ascii_uppercase();
        if code.is_empty() {
            return Err(SessionError::validation("session code must not be empty"));
        }
        if !code
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_')
        {
            return Err(SessionError::validation(format!(
                "session code `{code}` may only contain letters, digits and underscores"
            )));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SessionCode {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SessionCode {
    type Error = SessionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SessionCode> for String {
    fn from(code: SessionCode) -> Self {
        code.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn generated_player_ids_are_path_safe() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..64 {
            let id = PlayerId::generate(&mut rng);
            assert_eq!(id.as_str().len(), PLAYER_ID_LEN);
            assert_eq!(PlayerId::parse(id.as_str()), Ok(id));
        }
    }

    #[test]
    fn player_id_rejects_path_separators() {
        assert!(PlayerId::parse("a/b").is_err());
        assert!(PlayerId::parse("a.b").is_err());
        assert!(PlayerId::parse("").is_err());
    }

    #[test]
    fn session_code_is_normalized() {
        let code = SessionCode::parse("  k7qz ").unwrap();
        assert_eq!(code.as_str(), "K7QZ");
        assert!(SessionCode::parse("   ").is_err());
        assert!(SessionCode::parse("NO/PE").is_err());
    }

    #[test]
    fn generated_codes_come_from_vocabulary() {
        let mut rng = StdRng::seed_from_u64(11);
        let code = SessionCode::generate(&mut rng);
        assert!(GAME_WORDS.contains(&code.as_str()));
    }
}
