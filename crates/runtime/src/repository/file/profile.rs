//! File-based ProfileRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};

use game_core::SessionCode;

use crate::repository::{JoinedSession, ProfileRepository, RepositoryError, Result};

/// One `profile_<CODE>.json` file per joined session under a base directory.
///
/// Writes go to a temp file first and are moved into place with a rename, so
/// a crash never leaves a half-written entry behind.
pub struct FileProfileRepository {
    base_dir: PathBuf,
}

impl FileProfileRepository {
    /// Create the repository, creating `base_dir` if needed.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn entry_path(&self, code: &SessionCode) -> PathBuf {
        self.base_dir.join(format!("profile_{}.json", code))
    }
}

impl ProfileRepository for FileProfileRepository {
    fn save(&self, code: &SessionCode, entry: &JoinedSession) -> Result<()> {
        let path = self.entry_path(code);
        let temp_path = path.with_extension("json.tmp");

        let json = serde_json::to_string_pretty(entry)
            .map_err(|e| RepositoryError::Json(e.to_string()))?;
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, &path)?;

        tracing::debug!("Saved profile entry: {}", path.display());
        Ok(())
    }

    fn load(&self, code: &SessionCode) -> Result<Option<JoinedSession>> {
        let path = self.entry_path(code);
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path)?;
        let entry = serde_json::from_str(&json).map_err(|e| RepositoryError::Json(e.to_string()))?;
        Ok(Some(entry))
    }

    fn delete(&self, code: &SessionCode) -> Result<()> {
        let path = self.entry_path(code);
        if path.exists() {
            fs::remove_file(&path)?;
            tracing::debug!("Deleted profile entry: {}", path.display());
        }
        Ok(())
    }

    fn list_sessions(&self) -> Result<Vec<SessionCode>> {
        let mut codes = Vec::new();

        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            let Some(filename) = path.file_name().and_then(|s| s.to_str()) else {
                continue;
            };
            let Some(raw) = filename
                .strip_prefix("profile_")
                .and_then(|s| s.strip_suffix(".json"))
            else {
                continue;
            };
            match SessionCode::parse(raw) {
                Ok(code) => codes.push(code),
                Err(err) => tracing::warn!("Skipping profile file {}: {}", path.display(), err),
            }
        }

        codes.sort();
        Ok(codes)
    }
}
