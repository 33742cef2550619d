//! Runtime configuration structures and loaders.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Settings for the in-process document substrate.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Silence after which a connection is declared lost.
    pub liveness_timeout: Duration,
    /// How often the liveness supervisor checks connections.
    pub sweep_interval: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            liveness_timeout: Duration::from_secs(10),
            sweep_interval: Duration::from_secs(1),
        }
    }
}

impl StoreConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `SLIPBOWL_LIVENESS_TIMEOUT_MS` - Silence before a connection is lost (default: 10000)
    /// - `SLIPBOWL_SWEEP_INTERVAL_MS` - Liveness sweep period (default: 1000)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(ms) = read_env::<u64>("SLIPBOWL_LIVENESS_TIMEOUT_MS") {
            config.liveness_timeout = Duration::from_millis(ms.max(1));
        }
        if let Some(ms) = read_env::<u64>("SLIPBOWL_SWEEP_INTERVAL_MS") {
            config.sweep_interval = Duration::from_millis(ms.max(1));
        }

        config
    }
}

/// Settings for one client's session context.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Period of liveness keep-alives sent to the store.
    pub heartbeat_interval: Duration,
    /// Store path under which session documents live.
    pub sessions_root: String,
    /// Directory for the local profile; `None` keeps it in memory.
    pub profile_dir: Option<PathBuf>,
    /// Fixed seed for codes, ids and shuffles (tests and replays).
    pub rng_seed: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(2),
            sessions_root: "sessions".to_string(),
            profile_dir: None,
            rng_seed: None,
        }
    }
}

impl ClientConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `SLIPBOWL_HEARTBEAT_INTERVAL_MS` - Keep-alive period (default: 2000)
    /// - `SLIPBOWL_SESSIONS_ROOT` - Store path for session documents (default: `sessions`)
    /// - `SLIPBOWL_PROFILE_DIR` - Local profile directory (default: in-memory);
    ///   the value `default` selects the platform data directory
    /// - `SLIPBOWL_RNG_SEED` - Deterministic randomness (default: entropy)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(ms) = read_env::<u64>("SLIPBOWL_HEARTBEAT_INTERVAL_MS") {
            config.heartbeat_interval = Duration::from_millis(ms.max(1));
        }

        if let Ok(root) = env::var("SLIPBOWL_SESSIONS_ROOT") {
            let root = root.trim_matches('/');
            if !root.is_empty() {
                config.sessions_root = root.to_string();
            }
        }

        config.profile_dir = match env::var("SLIPBOWL_PROFILE_DIR") {
            Ok(dir) if dir == "default" => Self::default_profile_dir(),
            Ok(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
            _ => None,
        };

        config.rng_seed = read_env::<u64>("SLIPBOWL_RNG_SEED");

        config
    }

    /// Platform-specific profile directory.
    pub fn default_profile_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "slipbowl")
            .map(|dirs| dirs.data_dir().join("profiles"))
    }

    /// Store path of the document for `code`.
    pub fn session_path(&self, code: &game_core::SessionCode) -> String {
        format!("{}/{}", self.sessions_root, code)
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
