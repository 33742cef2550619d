//! In-memory ProfileRepository implementation for tests and local runs.

use std::collections::HashMap;
use std::sync::RwLock;

use game_core::SessionCode;

use crate::repository::{JoinedSession, ProfileRepository, RepositoryError, Result};

/// Profile that lives as long as the process.
#[derive(Default)]
pub struct InMemoryProfileRepo {
    entries: RwLock<HashMap<SessionCode, JoinedSession>>,
}

impl InMemoryProfileRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileRepository for InMemoryProfileRepo {
    fn save(&self, code: &SessionCode, entry: &JoinedSession) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        entries.insert(code.clone(), entry.clone());
        Ok(())
    }

    fn load(&self, code: &SessionCode) -> Result<Option<JoinedSession>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(entries.get(code).cloned())
    }

    fn delete(&self, code: &SessionCode) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        entries.remove(code);
        Ok(())
    }

    fn list_sessions(&self) -> Result<Vec<SessionCode>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut codes: Vec<SessionCode> = entries.keys().cloned().collect();
        codes.sort();
        Ok(codes)
    }
}
