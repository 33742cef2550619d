//! Handle to one joined session.
//!
//! [`SessionHandle`] issues every session operation as read → plan → one
//! patch. It never applies anything locally; the new state arrives through
//! [`SessionHandle::subscribe`] like everyone else's.
use std::sync::Arc;

use tracing::{debug, info};

use game_core::{
    AdvanceSlip, Command, Patch, PlayerId, RetreatSlip, RevealCurrent, Session, SessionCode,
    SessionError, StartPlaying, StartSubmitting, UsurpHost, fields,
};

use super::client::{SharedRng, lock_rng};
use super::errors::{ClientError, Result};
use crate::repository::ProfileRepository;
use crate::store::{DocumentStore, StoreError, Subscription};
use crate::workers::WorkerSet;

/// One player's membership in one session.
///
/// Dropping the handle stops its background workers but leaves the player on
/// the roster until the connection goes away. Call [`leave`](Self::leave) to
/// exit explicitly.
pub struct SessionHandle<S> {
    store: S,
    code: SessionCode,
    path: String,
    player_id: PlayerId,
    nickname: String,
    profiles: Arc<dyn ProfileRepository>,
    rng: SharedRng,
    workers: Option<WorkerSet>,
}

impl<S: DocumentStore> SessionHandle<S> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        store: S,
        code: SessionCode,
        path: String,
        player_id: PlayerId,
        nickname: String,
        profiles: Arc<dyn ProfileRepository>,
        rng: SharedRng,
        workers: WorkerSet,
    ) -> Self {
        Self {
            store,
            code,
            path,
            player_id,
            nickname,
            profiles,
            rng,
            workers: Some(workers),
        }
    }

    pub fn code(&self) -> &SessionCode {
        &self.code
    }

    pub fn player_id(&self) -> &PlayerId {
        &self.player_id
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    /// Store path of the session document.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Point-in-time state of the session.
    pub async fn snapshot(&self) -> Result<Session> {
        let document = self
            .store
            .read(&self.path)
            .await?
            .ok_or_else(|| SessionError::SessionNotFound(self.code.clone()))?;
        Ok(Session::from_document(&document)?)
    }

    /// Stream of decoded session states, starting with the current one.
    pub async fn subscribe(&self) -> Result<SessionUpdates> {
        let subscription = self.store.subscribe(&self.path).await?;
        Ok(SessionUpdates {
            code: self.code.clone(),
            subscription,
        })
    }

    /// Waits for the first state satisfying `predicate`. Undecodable
    /// snapshots are skipped.
    pub async fn wait_until<F>(&self, mut predicate: F) -> Result<Session>
    where
        F: FnMut(&Session) -> bool,
    {
        let mut updates = self.subscribe().await?;
        loop {
            match updates.next().await {
                Some(Ok(session)) if predicate(&session) => return Ok(session),
                Some(Ok(_)) => {}
                Some(Err(ClientError::Session(SessionError::MalformedDocument(err)))) => {
                    debug!(code = %self.code, %err, "skipping undecodable snapshot");
                }
                Some(Err(err)) => return Err(err),
                None => return Err(StoreError::Disconnected.into()),
            }
        }
    }

    pub async fn my_slips(&self) -> Result<Vec<String>> {
        let session = self.snapshot().await?;
        Ok(session.slips_of(&self.player_id).to_vec())
    }

    pub async fn is_host(&self) -> Result<bool> {
        Ok(self.snapshot().await?.is_host(&self.player_id))
    }

    pub async fn add_slip(&self, text: &str) -> Result<()> {
        self.execute(Command::add_slip(text)).await
    }

    pub async fn remove_slip(&self, index: usize) -> Result<()> {
        self.execute(Command::remove_slip(index)).await
    }

    pub async fn start_submitting(&self) -> Result<()> {
        self.execute(Command::StartSubmitting(StartSubmitting)).await
    }

    pub async fn start_playing(&self) -> Result<()> {
        self.execute(Command::StartPlaying(StartPlaying)).await
    }

    pub async fn reveal_current(&self) -> Result<()> {
        self.execute(Command::RevealCurrent(RevealCurrent)).await
    }

    pub async fn advance_slip(&self) -> Result<()> {
        self.execute(Command::AdvanceSlip(AdvanceSlip)).await
    }

    pub async fn retreat_slip(&self) -> Result<()> {
        self.execute(Command::RetreatSlip(RetreatSlip)).await
    }

    pub async fn usurp_host(&self) -> Result<()> {
        self.execute(Command::UsurpHost(UsurpHost)).await
    }

    /// Validates `command` against the current document and writes its patch.
    pub async fn execute(&self, command: Command) -> Result<()> {
        let session = self.snapshot().await?;
        let patch = {
            let mut rng = lock_rng(&self.rng);
            session.plan(&self.player_id, &command, &mut *rng)?
        };

        if patch.is_empty() {
            debug!(code = %self.code, command = %command.kind(), "command is a no-op");
            return Ok(());
        }

        self.store.patch(&self.path, &patch).await?;
        if let Some(phase) = patch.value_of(fields::PHASE) {
            if phase != &serde_json::Value::from(session.phase) {
                info!(code = %self.code, %phase, "phase changed");
            }
        }
        debug!(code = %self.code, command = %command.kind(), "command applied");
        Ok(())
    }

    /// Leaves the session: stops the workers, removes this player from the
    /// roster, drops the disconnect cleanup and forgets the profile entry.
    pub async fn leave(mut self) -> Result<()> {
        if let Some(workers) = self.workers.take() {
            workers.shutdown().await;
        }

        let patch = Patch::new().delete(fields::player(&self.player_id));
        match self.store.patch(&self.path, &patch).await {
            Ok(()) | Err(StoreError::DocumentMissing(_)) => {}
            Err(err) => return Err(err.into()),
        }
        self.store.cancel_disconnect_cleanups(&self.path).await?;
        self.profiles.delete(&self.code)?;

        info!(code = %self.code, player = %self.player_id, "left session");
        Ok(())
    }
}

/// Decoded view over a session subscription.
pub struct SessionUpdates {
    code: SessionCode,
    subscription: Subscription,
}

impl SessionUpdates {
    /// Next session state. An absent document yields
    /// [`SessionError::SessionNotFound`]; `None` means the store shut down.
    pub async fn next(&mut self) -> Option<Result<Session>> {
        let snapshot = self.subscription.recv().await?;
        Some(match snapshot {
            Some(document) => Session::from_document(&document).map_err(Into::into),
            None => Err(SessionError::SessionNotFound(self.code.clone()).into()),
        })
    }
}
