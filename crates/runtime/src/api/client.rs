//! Per-client session context.
//!
//! A [`SessionClient`] bundles everything one device needs to take part in
//! sessions: its store connection, its configuration, the local profile of
//! joined sessions, and a random source for codes, ids and shuffles.
use std::sync::{Arc, Mutex};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use game_core::{
    JoinSession, PlayerId, Session, SessionCode, SessionError, fields, normalize_nickname,
};

use super::errors::Result;
use super::handle::SessionHandle;
use crate::config::ClientConfig;
use crate::repository::{
    FileProfileRepository, InMemoryProfileRepo, JoinedSession, ProfileRepository,
};
use crate::store::{CleanupAction, DocumentStore};
use crate::workers::{HeartbeatWorker, HostWatcher, StopSignal, WorkerSet};

pub(crate) type SharedRng = Arc<Mutex<StdRng>>;

/// Entry point for creating, joining, and resuming sessions.
pub struct SessionClient<S> {
    store: S,
    config: ClientConfig,
    profiles: Arc<dyn ProfileRepository>,
    rng: SharedRng,
}

impl<S> SessionClient<S>
where
    S: DocumentStore + Clone + 'static,
{
    /// Builds a client whose profile lives in `config.profile_dir`, or in
    /// memory when unset.
    pub fn new(store: S, config: ClientConfig) -> Result<Self> {
        let profiles: Arc<dyn ProfileRepository> = match &config.profile_dir {
            Some(dir) => Arc::new(FileProfileRepository::new(dir)?),
            None => Arc::new(InMemoryProfileRepo::new()),
        };
        Ok(Self::with_profiles(store, config, profiles))
    }

    pub fn with_profiles(
        store: S,
        config: ClientConfig,
        profiles: Arc<dyn ProfileRepository>,
    ) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            store,
            config,
            profiles,
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn profiles(&self) -> &Arc<dyn ProfileRepository> {
        &self.profiles
    }

    /// Opens a new lobby with a freshly generated code, hosted by the caller.
    pub async fn create_session(&self, nickname: &str) -> Result<SessionHandle<S>> {
        let code = {
            let mut rng = lock_rng(&self.rng);
            SessionCode::generate(&mut *rng)
        };
        self.create_session_with_code(code, nickname).await
    }

    /// Opens a new lobby under `code`, replacing any document already there.
    pub async fn create_session_with_code(
        &self,
        code: SessionCode,
        nickname: &str,
    ) -> Result<SessionHandle<S>> {
        let player_id = self.generate_player_id();
        let session = Session::new(code.clone(), player_id.clone(), nickname)?;
        let path = self.config.session_path(&code);

        self.store.create(&path, session.to_document()?).await?;
        info!(%code, player = %player_id, "session created");

        let nickname = normalize_nickname(nickname)?;
        self.attach(code, player_id, nickname).await
    }

    /// Joins an existing session under a new player id.
    pub async fn join_session(&self, code: &str, nickname: &str) -> Result<SessionHandle<S>> {
        let code = SessionCode::parse(code)?;
        let player_id = self.generate_player_id();
        self.join_as(code, player_id, nickname).await
    }

    /// Picks a previously joined session back up from the local profile.
    ///
    /// If the stored player is still on the roster the client reattaches
    /// under that id. Otherwise it joins again under the stored nickname.
    pub async fn resume_session(&self, code: &str) -> Result<SessionHandle<S>> {
        let code = SessionCode::parse(code)?;
        let entry = self.profiles.load(&code)?.ok_or_else(|| {
            SessionError::NotFound(format!("profile entry for session `{code}`"))
        })?;

        let session = self.fetch(&code).await?;
        match entry.player_id {
            Some(player_id) if session.is_member(&player_id) => {
                info!(%code, player = %player_id, "reattaching to session");
                let nickname = session
                    .member(&player_id)
                    .map_or(entry.nickname, |player| player.nickname.clone());
                self.attach(code, player_id, nickname).await
            }
            Some(player_id) => {
                info!(%code, player = %player_id, "rejoining session");
                self.join_as(code, player_id, &entry.nickname).await
            }
            None => {
                let player_id = self.generate_player_id();
                self.join_as(code, player_id, &entry.nickname).await
            }
        }
    }

    /// Codes of every session recorded in the local profile.
    pub fn joined_sessions(&self) -> Result<Vec<SessionCode>> {
        Ok(self.profiles.list_sessions()?)
    }

    async fn join_as(
        &self,
        code: SessionCode,
        player_id: PlayerId,
        nickname: &str,
    ) -> Result<SessionHandle<S>> {
        let session = self.fetch(&code).await?;
        let join = JoinSession::new(player_id, nickname)?;
        let patch = join.plan(&session)?;

        self.store
            .patch(&self.config.session_path(&code), &patch)
            .await?;
        info!(%code, player = %join.player_id(), "joined session");

        self.attach(code, join.player_id().clone(), join.nickname().to_string())
            .await
    }

    async fn fetch(&self, code: &SessionCode) -> Result<Session> {
        let snapshot = self.store.read(&self.config.session_path(code)).await?;
        let document = snapshot.ok_or_else(|| SessionError::SessionNotFound(code.clone()))?;
        Ok(Session::from_document(&document)?)
    }

    /// Registers the disconnect cleanup, records the profile entry and starts
    /// the background workers for a player already on the roster.
    async fn attach(
        &self,
        code: SessionCode,
        player_id: PlayerId,
        nickname: String,
    ) -> Result<SessionHandle<S>> {
        let path = self.config.session_path(&code);

        self.store
            .register_disconnect_cleanup(&path, CleanupAction::RemoveField(fields::player(&player_id)))
            .await?;
        self.profiles
            .save(&code, &JoinedSession::new(player_id.clone(), nickname.clone()))?;

        let subscription = self.store.subscribe(&path).await?;
        let (stop_tx, stop) = StopSignal::channel();
        let interval = self.config.heartbeat_interval;

        let watcher = HostWatcher::new(self.store.clone(), subscription, interval, stop.clone());
        let heartbeat = HeartbeatWorker::new(self.store.clone(), interval, stop);
        let handles = vec![
            tokio::spawn(async move {
                watcher.run().await;
            }),
            tokio::spawn(async move {
                heartbeat.run().await;
            }),
        ];

        Ok(SessionHandle::new(
            self.store.clone(),
            code,
            path,
            player_id,
            nickname,
            Arc::clone(&self.profiles),
            Arc::clone(&self.rng),
            WorkerSet::new(stop_tx, handles),
        ))
    }

    fn generate_player_id(&self) -> PlayerId {
        let mut rng = lock_rng(&self.rng);
        PlayerId::generate(&mut *rng)
    }
}

/// Locks the shared generator, recovering it if a holder panicked.
pub(crate) fn lock_rng(rng: &SharedRng) -> std::sync::MutexGuard<'_, StdRng> {
    rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
