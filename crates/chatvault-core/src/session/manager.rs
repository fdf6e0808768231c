//! Session lifecycle controller.
//!
//! `ContextManager` owns the per-user `SessionContext`, the codec, the durable
//! slot and the inactivity timer, and is the only thing allowed to move the
//! session between `Fresh`, `Active` and `Terminated`.
//!
//! All paths that touch the context (interactive updates, manual saves,
//! autosave fires, signal-driven termination) go through one async mutex, so
//! a save always sees a complete snapshot and two saves never interleave
//! their writes to the slot.

use std::sync::Arc;

use chatvault_types::config::SessionConfig;
use chatvault_types::error::{ContextError, ErrorKind};
use chatvault_types::session::{
    ContextSummary, HistoryEntry, LifecycleState, SessionContext, UpdateRequest,
};
use chrono::{DateTime, Utc};
use futures_util::FutureExt;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::codec::SessionCodec;
use super::scheduler::InactivityScheduler;
use super::store::ContextStore;

/// How a `load` ended. Every variant leaves the session `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No slot existed; starting from an empty context.
    Fresh,
    /// The saved context was restored.
    Restored { history_len: usize },
    /// The slot could not be read or decoded and the context was reset.
    Recovered(ErrorKind),
}

/// Everything guarded by the session lock.
struct SessionState {
    lifecycle: LifecycleState,
    context: SessionContext,
    last_interaction: DateTime<Utc>,
}

struct Inner<C, S> {
    user_id: String,
    config: SessionConfig,
    codec: C,
    store: S,
    session: Mutex<SessionState>,
    scheduler: InactivityScheduler,
    shutdown: CancellationToken,
}

/// Manages the lifecycle and persistence of one user's session.
///
/// Cheap to clone: clones share the same session, so the interactive loop
/// and a signal handler can each hold one.
pub struct ContextManager<C, S> {
    inner: Arc<Inner<C, S>>,
}

impl<C, S> Clone for ContextManager<C, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C, S> ContextManager<C, S>
where
    C: SessionCodec + 'static,
    S: ContextStore + 'static,
{
    /// Create a controller in the `Fresh` state with an empty context.
    pub fn new(user_id: impl Into<String>, codec: C, store: S, config: SessionConfig) -> Self {
        let user_id = user_id.into();
        let session = SessionState {
            lifecycle: LifecycleState::Fresh,
            context: SessionContext::new(user_id.clone()),
            last_interaction: Utc::now(),
        };
        Self {
            inner: Arc::new(Inner {
                user_id,
                config,
                codec,
                store,
                session: Mutex::new(session),
                scheduler: InactivityScheduler::new(),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.inner.user_id
    }

    /// Token cancelled once the session terminates. The host process
    /// watches it to know when to stop.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.inner.shutdown.clone()
    }

    /// Whether an autosave is currently pending.
    pub fn is_autosave_armed(&self) -> bool {
        self.inner.scheduler.is_armed()
    }

    pub async fn state(&self) -> LifecycleState {
        self.inner.session.lock().await.lifecycle
    }

    // --- Lifecycle ---

    /// Read the persisted context and move to `Active`.
    ///
    /// Missing, corrupt, undecryptable or unreadable slots never block
    /// startup: the failure is logged and the session starts empty.
    pub async fn load(&self) -> Result<LoadOutcome, ContextError> {
        let mut session = self.inner.session.lock().await;
        if session.lifecycle == LifecycleState::Terminated {
            return Err(ContextError::SessionClosed);
        }

        let outcome = match self.read_slot().await {
            Ok(Some(context)) => {
                let history_len = context.history().len();
                session.context = context;
                info!(user_id = %self.inner.user_id, history_len, "Session context loaded");
                LoadOutcome::Restored { history_len }
            }
            Ok(None) => {
                session.context = SessionContext::new(self.inner.user_id.clone());
                info!(user_id = %self.inner.user_id, "No saved context found, starting fresh");
                LoadOutcome::Fresh
            }
            Err(e) => {
                error!(
                    user_id = %self.inner.user_id,
                    kind = %e.kind(),
                    error = %e,
                    "Error loading session context, resetting to empty"
                );
                session.context.clear();
                LoadOutcome::Recovered(e.kind())
            }
        };

        session.lifecycle = LifecycleState::Active;
        session.last_interaction = Utc::now();
        Ok(outcome)
    }

    /// Apply one turn's fields and restart the inactivity timer.
    pub async fn update(&self, update: UpdateRequest) -> Result<(), ContextError> {
        let mut session = self.inner.session.lock().await;
        ensure_active(session.lifecycle)?;

        session.context.apply_update(update);
        session.last_interaction = Utc::now();
        self.arm_autosave();
        debug!(
            user_id = %self.inner.user_id,
            history_len = session.context.history().len(),
            "Session context updated"
        );
        Ok(())
    }

    /// Persist the context now. Does not touch the inactivity timer.
    pub async fn save(&self) -> Result<(), ContextError> {
        let session = self.inner.session.lock().await;
        ensure_active(session.lifecycle)?;
        self.persist(&session.context).await
    }

    /// Reset the context to empty in one step. The user id is kept.
    pub async fn clear(&self) -> Result<(), ContextError> {
        let mut session = self.inner.session.lock().await;
        ensure_active(session.lifecycle)?;

        session.context.clear();
        session.last_interaction = Utc::now();
        info!(user_id = %self.inner.user_id, "Session context cleared");
        Ok(())
    }

    /// Save, stop the timer, move to `Terminated` and signal shutdown.
    ///
    /// The transition happens even when the save fails so the process can
    /// still exit; the save error is returned for reporting. A second call
    /// returns `SessionClosed` and writes nothing.
    pub async fn terminate(&self) -> Result<(), ContextError> {
        let mut session = self.inner.session.lock().await;
        let saved = match session.lifecycle {
            LifecycleState::Terminated => return Err(ContextError::SessionClosed),
            // Nothing was loaded, so there is nothing worth writing over the slot.
            LifecycleState::Fresh => Ok(()),
            LifecycleState::Active => self.persist(&session.context).await,
        };

        self.inner.scheduler.cancel();
        session.lifecycle = LifecycleState::Terminated;
        self.inner.shutdown.cancel();

        match &saved {
            Ok(()) => info!(user_id = %self.inner.user_id, "Session terminated"),
            Err(e) => error!(
                user_id = %self.inner.user_id,
                kind = %e.kind(),
                error = %e,
                "Session terminated without a successful save"
            ),
        }
        saved
    }

    // --- Views ---

    /// Topic, last intent, last entity and history size.
    pub async fn summary(&self) -> ContextSummary {
        let session = self.inner.session.lock().await;
        ContextSummary {
            current_topic: session.context.topic.clone(),
            last_intent: session.context.last_intent.clone(),
            last_entity: session.context.last_entity.clone(),
            history_len: session.context.history().len(),
            last_interaction: session.last_interaction,
        }
    }

    /// A consistent copy of the current context.
    pub async fn context(&self) -> SessionContext {
        self.inner.session.lock().await.context.clone()
    }

    pub async fn history(&self) -> Vec<HistoryEntry> {
        self.inner.session.lock().await.context.history().to_vec()
    }

    pub async fn last_interaction(&self) -> DateTime<Utc> {
        self.inner.session.lock().await.last_interaction
    }

    /// Whether `long_inactivity_threshold` has passed since the last
    /// interaction. Informational only.
    pub async fn is_long_inactive(&self, now: DateTime<Utc>) -> bool {
        let last = self.last_interaction().await;
        now.signed_duration_since(last)
            .to_std()
            .is_ok_and(|idle| idle >= self.inner.config.long_inactivity())
    }

    // --- Internals ---

    async fn read_slot(&self) -> Result<Option<SessionContext>, ContextError> {
        let Some(blob) = self.inner.store.load(&self.inner.user_id).await? else {
            return Ok(None);
        };
        let context = self.inner.codec.decode(&blob)?;
        if context.user_id() != self.inner.user_id {
            return Err(ContextError::Format(
                "slot holds a context for a different user".to_string(),
            ));
        }
        Ok(Some(context))
    }

    /// Encode and write a snapshot. Callers hold the session lock.
    async fn persist(&self, context: &SessionContext) -> Result<(), ContextError> {
        let blob = self.inner.codec.encode(context)?;
        self.inner.store.save(&self.inner.user_id, &blob).await?;
        info!(
            user_id = %self.inner.user_id,
            bytes = blob.len(),
            "Session context saved"
        );
        Ok(())
    }

    /// Best-effort save from the inactivity timer. Never raises.
    async fn autosave(&self) {
        let session = self.inner.session.lock().await;
        if session.lifecycle != LifecycleState::Active {
            debug!(user_id = %self.inner.user_id, state = %session.lifecycle, "Autosave skipped");
            return;
        }
        info!(user_id = %self.inner.user_id, "Inactivity timeout reached, saving context");
        if let Err(e) = self.persist(&session.context).await {
            warn!(
                user_id = %self.inner.user_id,
                kind = %e.kind(),
                error = %e,
                "Autosave failed"
            );
        }
    }

    fn arm_autosave(&self) {
        // The timer task holds a weak handle so a dropped controller is not
        // kept alive by a pending autosave.
        let weak = Arc::downgrade(&self.inner);
        self.inner.scheduler.reset(
            self.inner.config.autosave_after(),
            Box::new(move || {
                async move {
                    if let Some(inner) = weak.upgrade() {
                        let manager = ContextManager { inner };
                        manager.autosave().await;
                    }
                }
                .boxed()
            }),
        );
    }
}

fn ensure_active(lifecycle: LifecycleState) -> Result<(), ContextError> {
    match lifecycle {
        LifecycleState::Active => Ok(()),
        LifecycleState::Fresh => Err(ContextError::NotLoaded),
        LifecycleState::Terminated => Err(ContextError::SessionClosed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatvault_types::error::{CodecError, StoreError};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    /// Plain JSON codec: enough to exercise the controller without crypto.
    struct JsonCodec;

    impl SessionCodec for JsonCodec {
        fn encode(&self, context: &SessionContext) -> Result<Vec<u8>, CodecError> {
            serde_json::to_vec(context).map_err(|e| CodecError::Format(e.to_string()))
        }

        fn decode(&self, blob: &[u8]) -> Result<SessionContext, CodecError> {
            serde_json::from_slice(blob).map_err(|e| CodecError::Format(e.to_string()))
        }
    }

    /// Codec that rejects everything as a crypto failure.
    struct WrongKeyCodec;

    impl SessionCodec for WrongKeyCodec {
        fn encode(&self, _context: &SessionContext) -> Result<Vec<u8>, CodecError> {
            Err(CodecError::Crypto)
        }

        fn decode(&self, _blob: &[u8]) -> Result<SessionContext, CodecError> {
            Err(CodecError::Crypto)
        }
    }

    #[derive(Clone, Default)]
    struct MemoryStore {
        slots: Arc<StdMutex<HashMap<String, Vec<u8>>>>,
        writes: Arc<AtomicUsize>,
        fail: Arc<AtomicBool>,
    }

    impl MemoryStore {
        fn put(&self, user_id: &str, blob: &[u8]) {
            self.slots.lock().unwrap().insert(user_id.to_string(), blob.to_vec());
        }

        fn get(&self, user_id: &str) -> Option<Vec<u8>> {
            self.slots.lock().unwrap().get(user_id).cloned()
        }

        fn writes(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }
    }

    impl ContextStore for MemoryStore {
        async fn save(&self, user_id: &str, blob: &[u8]) -> Result<(), StoreError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(StoreError::Io("disk full".to_string()));
            }
            self.put(user_id, blob);
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn load(&self, user_id: &str) -> Result<Option<Vec<u8>>, StoreError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(StoreError::Io("permission denied".to_string()));
            }
            Ok(self.get(user_id))
        }
    }

    fn manager(store: &MemoryStore) -> ContextManager<JsonCodec, MemoryStore> {
        ContextManager::new("user123", JsonCodec, store.clone(), SessionConfig::default())
    }

    fn greeting() -> UpdateRequest {
        UpdateRequest::new().intent("greet").exchange("hi", "Hello!")
    }

    #[tokio::test]
    async fn test_load_without_slot_starts_fresh() {
        let store = MemoryStore::default();
        let mgr = manager(&store);
        assert_eq!(mgr.state().await, LifecycleState::Fresh);

        let outcome = mgr.load().await.unwrap();
        assert_eq!(outcome, LoadOutcome::Fresh);
        assert_eq!(mgr.state().await, LifecycleState::Active);
        assert!(mgr.context().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_and_reload_in_new_controller() {
        let store = MemoryStore::default();
        let mgr = manager(&store);
        mgr.load().await.unwrap();
        mgr.update(greeting()).await.unwrap();
        mgr.save().await.unwrap();
        let saved = mgr.context().await;

        let reloaded = manager(&store);
        let outcome = reloaded.load().await.unwrap();
        assert_eq!(outcome, LoadOutcome::Restored { history_len: 1 });
        assert_eq!(reloaded.context().await, saved);
    }

    #[tokio::test]
    async fn test_undecodable_slot_recovers_to_empty() {
        let store = MemoryStore::default();
        store.put("user123", b"corrupt {json:");
        let mgr = manager(&store);

        let outcome = mgr.load().await.unwrap();
        assert_eq!(outcome, LoadOutcome::Recovered(ErrorKind::Format));
        assert_eq!(mgr.state().await, LifecycleState::Active);
        assert!(mgr.context().await.is_empty());
    }

    #[tokio::test]
    async fn test_crypto_failure_recovers_to_empty() {
        let store = MemoryStore::default();
        store.put("user123", b"\x00\x01\x02");
        let mgr = ContextManager::new("user123", WrongKeyCodec, store.clone(), SessionConfig::default());

        assert_eq!(mgr.load().await.unwrap(), LoadOutcome::Recovered(ErrorKind::Crypto));
        assert!(mgr.context().await.is_empty());
    }

    #[tokio::test]
    async fn test_io_failure_recovers_to_empty() {
        let store = MemoryStore::default();
        store.fail.store(true, Ordering::SeqCst);
        let mgr = manager(&store);

        assert_eq!(mgr.load().await.unwrap(), LoadOutcome::Recovered(ErrorKind::Io));
        assert_eq!(mgr.state().await, LifecycleState::Active);
    }

    #[tokio::test]
    async fn test_slot_for_other_user_is_rejected() {
        let store = MemoryStore::default();
        let other = ContextManager::new("someone-else", JsonCodec, store.clone(), SessionConfig::default());
        other.load().await.unwrap();
        other.update(greeting()).await.unwrap();
        other.save().await.unwrap();
        let blob = store.get("someone-else").unwrap();
        store.put("user123", &blob);

        let mgr = manager(&store);
        assert_eq!(mgr.load().await.unwrap(), LoadOutcome::Recovered(ErrorKind::Format));
        assert_eq!(mgr.context().await.user_id(), "user123");
    }

    #[tokio::test]
    async fn test_operations_before_load_are_rejected() {
        let store = MemoryStore::default();
        let mgr = manager(&store);

        assert!(matches!(mgr.update(greeting()).await, Err(ContextError::NotLoaded)));
        assert!(matches!(mgr.save().await, Err(ContextError::NotLoaded)));
        assert!(matches!(mgr.clear().await, Err(ContextError::NotLoaded)));
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_history_counts_only_complete_exchanges() {
        let store = MemoryStore::default();
        let mgr = manager(&store);
        mgr.load().await.unwrap();

        for i in 0..3 {
            mgr.update(UpdateRequest::new().exchange(format!("q{i}"), format!("a{i}")))
                .await
                .unwrap();
        }
        mgr.update(UpdateRequest::new().entity("developer")).await.unwrap();
        mgr.update(UpdateRequest::new().topic("rust")).await.unwrap();

        let history = mgr.history().await;
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].input, "q0");
        assert_eq!(history[2].response, "a2");
    }

    #[tokio::test]
    async fn test_summary_reflects_context() {
        let store = MemoryStore::default();
        let mgr = manager(&store);
        mgr.load().await.unwrap();
        mgr.update(greeting().entity("developer").topic("profession")).await.unwrap();

        let summary = mgr.summary().await;
        assert_eq!(summary.current_topic.as_deref(), Some("profession"));
        assert_eq!(summary.last_intent.as_deref(), Some("greet"));
        assert_eq!(summary.last_entity.as_deref(), Some("developer"));
        assert_eq!(summary.history_len, 1);
    }

    #[tokio::test]
    async fn test_clear_twice_yields_same_empty_state() {
        let store = MemoryStore::default();
        let mgr = manager(&store);
        mgr.load().await.unwrap();
        mgr.update(greeting()).await.unwrap();

        mgr.clear().await.unwrap();
        let first = mgr.context().await;
        mgr.clear().await.unwrap();
        let second = mgr.context().await;

        assert_eq!(first, second);
        assert!(second.is_empty());
        assert_eq!(second.user_id(), "user123");
    }

    #[tokio::test]
    async fn test_manual_save_surfaces_store_failure() {
        let store = MemoryStore::default();
        let mgr = manager(&store);
        mgr.load().await.unwrap();
        store.fail.store(true, Ordering::SeqCst);

        let err = mgr.save().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(mgr.state().await, LifecycleState::Active);
    }

    #[tokio::test]
    async fn test_manual_save_leaves_timer_armed() {
        let store = MemoryStore::default();
        let mgr = manager(&store);
        mgr.load().await.unwrap();
        mgr.update(greeting()).await.unwrap();
        assert!(mgr.is_autosave_armed());

        mgr.save().await.unwrap();
        assert!(mgr.is_autosave_armed());
    }

    #[tokio::test]
    async fn test_terminate_saves_and_closes_session() {
        let store = MemoryStore::default();
        let mgr = manager(&store);
        let shutdown = mgr.shutdown_token();
        mgr.load().await.unwrap();
        mgr.update(greeting()).await.unwrap();

        mgr.terminate().await.unwrap();
        assert_eq!(mgr.state().await, LifecycleState::Terminated);
        assert!(shutdown.is_cancelled());
        assert!(!mgr.is_autosave_armed());
        assert_eq!(store.writes(), 1);
    }

    #[tokio::test]
    async fn test_operations_after_terminate_return_session_closed() {
        let store = MemoryStore::default();
        let mgr = manager(&store);
        mgr.load().await.unwrap();
        mgr.update(greeting()).await.unwrap();
        mgr.terminate().await.unwrap();
        let blob = store.get("user123");

        assert!(matches!(mgr.update(greeting()).await, Err(ContextError::SessionClosed)));
        assert!(matches!(mgr.save().await, Err(ContextError::SessionClosed)));
        assert!(matches!(mgr.load().await, Err(ContextError::SessionClosed)));
        assert!(matches!(mgr.clear().await, Err(ContextError::SessionClosed)));
        assert!(matches!(mgr.terminate().await, Err(ContextError::SessionClosed)));

        assert_eq!(store.writes(), 1);
        assert_eq!(store.get("user123"), blob);
    }

    #[tokio::test]
    async fn test_terminate_reports_failed_save_but_still_closes() {
        let store = MemoryStore::default();
        let mgr = manager(&store);
        mgr.load().await.unwrap();
        store.fail.store(true, Ordering::SeqCst);

        let err = mgr.terminate().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(mgr.state().await, LifecycleState::Terminated);
        assert!(mgr.shutdown_token().is_cancelled());
    }

    #[tokio::test]
    async fn test_terminate_before_load_does_not_overwrite_slot() {
        let store = MemoryStore::default();
        store.put("user123", b"previous session");
        let mgr = manager(&store);

        mgr.terminate().await.unwrap();
        assert_eq!(store.writes(), 0);
        assert_eq!(store.get("user123").as_deref(), Some(&b"previous session"[..]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_autosave_fires_once_after_rapid_updates() {
        let store = MemoryStore::default();
        let mgr = manager(&store);
        mgr.load().await.unwrap();

        for i in 0..5 {
            mgr.update(UpdateRequest::new().exchange(format!("q{i}"), "a"))
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        }
        assert_eq!(store.writes(), 0);

        tokio::time::sleep(Duration::from_secs(301)).await;
        assert_eq!(store.writes(), 1);
        assert!(!mgr.is_autosave_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_autosave_failure_is_swallowed() {
        let store = MemoryStore::default();
        let mgr = manager(&store);
        mgr.load().await.unwrap();
        mgr.update(greeting()).await.unwrap();
        store.fail.store(true, Ordering::SeqCst);

        tokio::time::sleep(Duration::from_secs(301)).await;
        assert_eq!(store.writes(), 0);
        assert_eq!(mgr.state().await, LifecycleState::Active);

        // The session keeps working after a failed autosave.
        store.fail.store(false, Ordering::SeqCst);
        mgr.update(greeting()).await.unwrap();
        mgr.save().await.unwrap();
        assert_eq!(store.writes(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_autosave_after_terminate() {
        let store = MemoryStore::default();
        let mgr = manager(&store);
        mgr.load().await.unwrap();
        mgr.update(greeting()).await.unwrap();
        mgr.terminate().await.unwrap();

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(store.writes(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_terminates_save_once() {
        let store = MemoryStore::default();
        let mgr = manager(&store);
        mgr.load().await.unwrap();
        mgr.update(greeting()).await.unwrap();

        let a = tokio::spawn({
            let mgr = mgr.clone();
            async move { mgr.terminate().await }
        });
        let b = tokio::spawn({
            let mgr = mgr.clone();
            async move { mgr.terminate().await }
        });
        let results = [a.await.unwrap(), b.await.unwrap()];

        let closed = results
            .iter()
            .filter(|r| matches!(r, Err(ContextError::SessionClosed)))
            .count();
        assert_eq!(closed, 1);
        assert_eq!(store.writes(), 1);
    }

    #[tokio::test]
    async fn test_long_inactivity_is_metadata_only() {
        let store = MemoryStore::default();
        let mgr = manager(&store);
        mgr.load().await.unwrap();
        mgr.update(greeting()).await.unwrap();

        let last = mgr.last_interaction().await;
        assert!(!mgr.is_long_inactive(last + chrono::Duration::seconds(599)).await);
        assert!(mgr.is_long_inactive(last + chrono::Duration::seconds(600)).await);
        // A clock reading before the last interaction is never long-inactive.
        assert!(!mgr.is_long_inactive(last - chrono::Duration::seconds(5)).await);
        assert_eq!(mgr.state().await, LifecycleState::Active);
    }
}
