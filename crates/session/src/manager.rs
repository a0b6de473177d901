//! Session manager.
//!
//! Owns the authentication state machine:
//!
//! ```text
//! Initializing ──restore()──▶ Authenticated | Unauthenticated
//!                                  ▲   │
//!                        login() ──┘   └── logout()
//! ```
//!
//! Every operation passes through a transient `Loading` phase. State lives in
//! a [`watch`] channel: `state()` takes a snapshot, `subscribe()` hands out a
//! receiver that wakes on every change.
//!
//! Operations never return errors. Failures end up in [`Session::error`] for
//! the UI to read once, display, and clear with [`SessionManager::clear_error`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tracing::instrument;

use prestamos_core::{LoginCredentials, Role};

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::models::session::{AuthToken, Phase, Session, keys};
use crate::models::user::{StoredUser, User};
use crate::remote::{AuthEndpoint, normalize};
use crate::store::CredentialStore;

/// Default delay before the start-up restore.
const DEFAULT_RESTORE_DELAY: Duration = Duration::from_millis(100);

/// What the credential store held at start-up.
enum Restored {
    /// Valid token and user.
    Session(User, AuthToken),
    /// Token or user missing.
    Nothing,
    /// User entry is not a JSON object.
    Corrupted,
    /// User entry is an object that fails validation.
    Incomplete,
}

/// Marks the session as loading for as long as it is alive.
///
/// Dropping the guard clears the flag if the operation did not settle the
/// state itself, so no exit path can leave the session loading.
struct LoadingGuard<'a> {
    state: &'a watch::Sender<Session>,
}

impl<'a> LoadingGuard<'a> {
    fn enter(state: &'a watch::Sender<Session>) -> Self {
        state.send_modify(|s| s.set_loading(true));
        Self { state }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.send_if_modified(|s| {
            if s.is_loading() {
                s.set_loading(false);
                true
            } else {
                false
            }
        });
    }
}

/// Authentication session for the running app.
///
/// Create one at start-up, share it through an `Arc`, and call
/// [`restore`](Self::restore) once. Overlapping `login`/`logout` calls are not
/// serialized; the UI disables its controls while [`Session::is_loading`].
pub struct SessionManager {
    store: Arc<dyn CredentialStore>,
    remote: Arc<dyn AuthEndpoint>,
    state: watch::Sender<Session>,
    restore_delay: Duration,
    restored: AtomicBool,
}

impl SessionManager {
    /// Create a manager in the `Initializing` state.
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>, remote: Arc<dyn AuthEndpoint>) -> Self {
        let (state, _) = watch::channel(Session::initializing());
        Self {
            store,
            remote,
            state,
            restore_delay: DEFAULT_RESTORE_DELAY,
            restored: AtomicBool::new(false),
        }
    }

    /// Create a manager using the configured restore delay.
    #[must_use]
    pub fn from_config(
        config: &SessionConfig,
        store: Arc<dyn CredentialStore>,
        remote: Arc<dyn AuthEndpoint>,
    ) -> Self {
        Self::new(store, remote).with_restore_delay(config.restore_delay)
    }

    /// Override the delay before the start-up restore.
    #[must_use]
    pub const fn with_restore_delay(mut self, delay: Duration) -> Self {
        self.restore_delay = delay;
        self
    }

    // =========================================================================
    // State access
    // =========================================================================

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.state.borrow().phase()
    }

    /// Whether a valid user and token are held.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.state.borrow().is_logged_in()
    }

    /// Role of the signed-in user, from the first backend role name.
    ///
    /// `None` when signed out, when the user has no roles, or when the first
    /// role is not in the mapping table.
    #[must_use]
    pub fn user_role(&self) -> Option<Role> {
        self.state.borrow().role()
    }

    /// Clear the last error without touching anything else.
    pub fn clear_error(&self) {
        self.state.send_if_modified(|s| {
            let had_error = s.error().is_some();
            s.clear_error();
            had_error
        });
    }

    // =========================================================================
    // Restore
    // =========================================================================

    /// Resume a cached session from the credential store.
    ///
    /// Waits the configured delay, then settles into `Authenticated` or
    /// `Unauthenticated` without contacting the backend. Corrupted or
    /// incomplete cached data is purged, never repaired. Runs at most once;
    /// later calls return the current state.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> Session {
        if self.restored.swap(true, Ordering::SeqCst) {
            tracing::warn!("restore already ran; ignoring");
            return self.state();
        }

        if !self.restore_delay.is_zero() {
            tokio::time::sleep(self.restore_delay).await;
        }

        let _loading = LoadingGuard::enter(&self.state);

        match self.read_cached_session().await {
            Ok(Restored::Session(user, token)) => {
                tracing::info!(user_id = %user.id, "session restored");
                self.settle(Session::authenticated(user, token));
            }
            Ok(Restored::Nothing) => {
                tracing::debug!("no cached session");
                self.settle(Session::unauthenticated());
            }
            Ok(Restored::Corrupted) => {
                tracing::warn!("cached user is not valid JSON; clearing credentials");
                self.purge_store().await;
                self.settle(Session::unauthenticated());
            }
            Ok(Restored::Incomplete) => {
                tracing::warn!("cached user is missing id or name; signing out");
                self.sign_out().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "session restore failed");
                self.sign_out().await;
                self.settle(Session::failed(e.user_message()));
            }
        }

        self.state()
    }

    async fn read_cached_session(&self) -> Result<Restored, SessionError> {
        let token = self.store.get(keys::AUTH_TOKEN).await?;
        let user = self.store.get(keys::AUTH_USER).await?;

        let (Some(token), Some(user)) = (token, user) else {
            return Ok(Restored::Nothing);
        };

        Ok(match StoredUser::parse(&user) {
            StoredUser::Valid(user) => Restored::Session(user, AuthToken::new(token)),
            StoredUser::Corrupted => Restored::Corrupted,
            StoredUser::Incomplete => Restored::Incomplete,
        })
    }

    // =========================================================================
    // Login
    // =========================================================================

    /// Log in with `credentials`.
    ///
    /// Returns `true` once the user is authenticated and cached. On failure
    /// returns `false`, clears any user and token from memory and from the
    /// credential store, and leaves the reason in [`Session::error`].
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    pub async fn login(&self, credentials: &LoginCredentials) -> bool {
        let _loading = LoadingGuard::enter(&self.state);
        self.clear_error();

        match self.authenticate(credentials).await {
            Ok((user, token)) => {
                tracing::info!(user_id = %user.id, role = ?user.role(), "login succeeded");
                self.settle(Session::authenticated(user, token));
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "login failed");
                self.purge_store().await;
                self.settle(Session::failed(e.user_message()));
                false
            }
        }
    }

    async fn authenticate(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<(User, AuthToken), SessionError> {
        let reply = self
            .remote
            .login(credentials.email(), credentials.password())
            .await?;
        let response = normalize::normalize_login(&reply, credentials.email())?;

        if let Some(expires_in) = response.expires_in {
            tracing::debug!(expires_in, "token lifetime reported by backend");
        }

        self.persist(&response.user, &response.token).await?;
        Ok((response.user, response.token))
    }

    async fn persist(&self, user: &User, token: &AuthToken) -> Result<(), SessionError> {
        let user_json = serde_json::to_string(user).map_err(crate::store::StoreError::from)?;
        self.store.set(keys::AUTH_TOKEN, token.expose()).await?;
        self.store.set(keys::AUTH_USER, &user_json).await?;
        Ok(())
    }

    // =========================================================================
    // Logout
    // =========================================================================

    /// Log out.
    ///
    /// Notifies the backend on a best-effort basis, always removes the cached
    /// credentials, and settles into `Unauthenticated` with no error. Safe to
    /// call when already signed out.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        let _loading = LoadingGuard::enter(&self.state);
        self.sign_out().await;
    }

    async fn sign_out(&self) {
        let token = self.state.borrow().token().cloned();

        if let Some(token) = token
            && let Err(e) = self.remote.logout(&token).await
        {
            tracing::warn!(error = %e, "backend logout notification failed; continuing");
        }

        self.purge_store().await;
        self.settle(Session::unauthenticated());
        tracing::info!("signed out");
    }

    /// Remove both credential keys, attempting each independently.
    async fn purge_store(&self) {
        for key in [keys::AUTH_TOKEN, keys::AUTH_USER] {
            if let Err(e) = self.store.remove(key).await {
                tracing::error!(key, error = %e, "failed to remove cached credential");
            }
        }
    }

    fn settle(&self, session: Session) {
        self.state.send_replace(session);
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("state", &*self.state.borrow())
            .field("restore_delay", &self.restore_delay)
            .field("restored", &self.restored.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use secrecy::SecretString;
    use serde_json::json;
    use tokio::sync::{Mutex, Notify};

    use super::*;
    use crate::remote::{LoginReply, RemoteError};
    use crate::store::{MemoryCredentialStore, StoreError};

    /// Backend double that answers every login the same way.
    ///
    /// With a gate, each call waits for one `notify_one` before answering.
    struct FakeBackend {
        reply: Mutex<Result<serde_json::Value, String>>,
        logouts: AtomicUsize,
        fail_logout: bool,
        gate: Option<Arc<Notify>>,
    }

    impl FakeBackend {
        fn accepting() -> Self {
            Self {
                reply: Mutex::new(Ok(json!({
                    "user": {"id": 1, "name": "Test User", "email": "test@example.com", "roles": ["cliente"]},
                    "token": "mock-token-123"
                }))),
                logouts: AtomicUsize::new(0),
                fail_logout: false,
                gate: None,
            }
        }

        fn rejecting(message: &str) -> Self {
            Self {
                reply: Mutex::new(Err(message.to_string())),
                ..Self::accepting()
            }
        }

        fn gated(gate: Arc<Notify>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::accepting()
            }
        }

        async fn start_rejecting(&self, message: &str) {
            *self.reply.lock().await = Err(message.to_string());
        }

        async fn pass_gate(&self) {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
        }
    }

    #[async_trait]
    impl AuthEndpoint for FakeBackend {
        async fn login(&self, _email: &str, _password: &SecretString) -> Result<LoginReply, RemoteError> {
            self.pass_gate().await;
            match &*self.reply.lock().await {
                Ok(value) => LoginReply::from_value(value.clone()),
                Err(message) => Err(RemoteError::Rejected {
                    status: 401,
                    message: message.clone(),
                }),
            }
        }

        async fn logout(&self, _token: &AuthToken) -> Result<(), RemoteError> {
            self.pass_gate().await;
            self.logouts.fetch_add(1, Ordering::SeqCst);
            if self.fail_logout {
                Err(RemoteError::Timeout)
            } else {
                Ok(())
            }
        }
    }

    /// Store that fails every read.
    struct BrokenStore;

    #[async_trait]
    impl CredentialStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable("disk on fire".to_string()))
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("disk on fire".to_string()))
        }

        async fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn manager(store: Arc<MemoryCredentialStore>, backend: Arc<FakeBackend>) -> SessionManager {
        SessionManager::new(store, backend).with_restore_delay(Duration::ZERO)
    }

    fn credentials() -> LoginCredentials {
        LoginCredentials::new("test@example.com", "password123").unwrap()
    }

    #[tokio::test]
    async fn test_starts_initializing() {
        let m = manager(Arc::default(), Arc::new(FakeBackend::accepting()));
        assert_eq!(m.phase(), Phase::Initializing);
        assert!(m.state().is_loading());
    }

    #[tokio::test]
    async fn test_login_success_persists() {
        let store = Arc::new(MemoryCredentialStore::new());
        let m = manager(store.clone(), Arc::new(FakeBackend::accepting()));

        assert!(m.login(&credentials()).await);

        let state = m.state();
        assert!(state.is_logged_in());
        assert!(!state.is_loading());
        assert!(state.error().is_none());
        assert_eq!(state.token().unwrap().expose(), "mock-token-123");
        assert_eq!(m.user_role(), Some(Role::Cliente));
        assert_eq!(
            store.get(keys::AUTH_TOKEN).await.unwrap().as_deref(),
            Some("mock-token-123")
        );
        assert!(store.contains(keys::AUTH_USER).await);
    }

    #[tokio::test]
    async fn test_login_failure_sets_error() {
        let store = Arc::new(MemoryCredentialStore::new());
        let m = manager(store.clone(), Arc::new(FakeBackend::rejecting("Invalid credentials")));

        assert!(!m.login(&credentials()).await);

        let state = m.state();
        assert!(!state.is_logged_in());
        assert!(state.user().is_none());
        assert!(state.token().is_none());
        assert_eq!(state.error(), Some("Invalid credentials"));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_login_without_user_id_fails() {
        let backend = FakeBackend {
            reply: Mutex::new(Ok(json!({"user": {"name": "Sin Id"}, "token": "t"}))),
            ..FakeBackend::accepting()
        };
        let m = manager(Arc::default(), Arc::new(backend));

        assert!(!m.login(&credentials()).await);
        assert!(m.state().error().is_some());
        assert_eq!(m.phase(), Phase::Unauthenticated);
    }

    #[tokio::test]
    async fn test_login_clears_previous_error() {
        let m = manager(Arc::default(), Arc::new(FakeBackend::accepting()));
        m.settle(Session::failed("old".to_string()));

        assert!(m.login(&credentials()).await);
        assert!(m.state().error().is_none());
    }

    #[tokio::test]
    async fn test_login_persist_failure_is_reported() {
        let m = SessionManager::new(Arc::new(BrokenStore), Arc::new(FakeBackend::accepting()))
            .with_restore_delay(Duration::ZERO);

        assert!(!m.login(&credentials()).await);
        let state = m.state();
        assert!(!state.is_logged_in());
        assert!(!state.is_loading());
        assert!(state.error().unwrap().contains("disk on fire"));
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let store = Arc::new(MemoryCredentialStore::new());
        let backend = Arc::new(FakeBackend::accepting());
        let m = manager(store.clone(), backend.clone());
        assert!(m.login(&credentials()).await);

        m.logout().await;

        let state = m.state();
        assert!(!state.is_logged_in());
        assert!(state.user().is_none());
        assert!(state.token().is_none());
        assert!(!state.is_loading());
        assert!(store.is_empty().await);
        assert_eq!(backend.logouts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_logout_ignores_backend_failure() {
        let store = Arc::new(MemoryCredentialStore::new());
        let backend = Arc::new(FakeBackend {
            fail_logout: true,
            ..FakeBackend::accepting()
        });
        let m = manager(store.clone(), backend);
        assert!(m.login(&credentials()).await);

        m.logout().await;

        assert_eq!(m.phase(), Phase::Unauthenticated);
        assert!(m.state().error().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let store = Arc::new(MemoryCredentialStore::with_entries([("unrelated", "x")]));
        let backend = Arc::new(FakeBackend::accepting());
        let m = manager(store.clone(), backend.clone());

        m.logout().await;
        m.logout().await;

        let state = m.state();
        assert!(state.user().is_none());
        assert!(state.token().is_none());
        assert!(state.error().is_none());
        assert!(!state.is_loading());
        // no token held, so the backend is never told
        assert_eq!(backend.logouts.load(Ordering::SeqCst), 0);
        assert!(store.contains("unrelated").await);
    }

    #[tokio::test]
    async fn test_restore_empty_store() {
        let m = manager(Arc::default(), Arc::new(FakeBackend::accepting()));
        let state = m.restore().await;
        assert_eq!(state.phase(), Phase::Unauthenticated);
        assert!(state.error().is_none());
    }

    #[tokio::test]
    async fn test_restore_token_without_user() {
        let store = Arc::new(MemoryCredentialStore::with_entries([(keys::AUTH_TOKEN, "t")]));
        let m = manager(store, Arc::new(FakeBackend::accepting()));
        assert_eq!(m.restore().await.phase(), Phase::Unauthenticated);
    }

    #[tokio::test]
    async fn test_restore_valid_session() {
        let store = Arc::new(MemoryCredentialStore::with_entries([
            (keys::AUTH_TOKEN, "stored-token"),
            (keys::AUTH_USER, r#"{"id":7,"name":"Ana","roles":["Prestatario"]}"#),
        ]));
        let backend = Arc::new(FakeBackend::accepting());
        let m = manager(store, backend.clone());

        let state = m.restore().await;

        assert!(state.is_logged_in());
        assert_eq!(state.user().unwrap().name, "Ana");
        assert_eq!(state.token().unwrap().expose(), "stored-token");
        assert_eq!(m.user_role(), Some(Role::Asesor));
        assert_eq!(backend.logouts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_restore_corrupted_user_never_authenticates() {
        let store = Arc::new(MemoryCredentialStore::with_entries([
            (keys::AUTH_TOKEN, "stored-token"),
            (keys::AUTH_USER, "not-json"),
        ]));
        let m = manager(store.clone(), Arc::new(FakeBackend::accepting()));

        let state = m.restore().await;

        assert_eq!(state.phase(), Phase::Unauthenticated);
        assert!(state.user().is_none());
        assert!(state.error().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_restore_incomplete_user_signs_out() {
        let store = Arc::new(MemoryCredentialStore::with_entries([
            (keys::AUTH_TOKEN, "stored-token"),
            (keys::AUTH_USER, r#"{"name":"Sin Id"}"#),
        ]));
        let m = manager(store.clone(), Arc::new(FakeBackend::accepting()));

        let state = m.restore().await;

        assert_eq!(state.phase(), Phase::Unauthenticated);
        assert!(state.error().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_restore_store_failure_sets_error() {
        let m = SessionManager::new(Arc::new(BrokenStore), Arc::new(FakeBackend::accepting()))
            .with_restore_delay(Duration::ZERO);

        let state = m.restore().await;

        assert_eq!(state.phase(), Phase::Unauthenticated);
        assert!(!state.is_loading());
        assert!(state.error().unwrap().contains("disk on fire"));
    }

    #[tokio::test]
    async fn test_restore_runs_once() {
        let store = Arc::new(MemoryCredentialStore::new());
        let m = manager(store.clone(), Arc::new(FakeBackend::accepting()));
        assert_eq!(m.restore().await.phase(), Phase::Unauthenticated);

        store.set(keys::AUTH_TOKEN, "late").await.unwrap();
        store
            .set(keys::AUTH_USER, r#"{"id":1,"name":"Late"}"#)
            .await
            .unwrap();

        assert_eq!(m.restore().await.phase(), Phase::Unauthenticated);
    }

    #[tokio::test]
    async fn test_clear_error_only_touches_error() {
        let m = manager(Arc::default(), Arc::new(FakeBackend::rejecting("Invalid credentials")));
        assert!(!m.login(&credentials()).await);
        let before = m.state();

        m.clear_error();

        let after = m.state();
        assert!(after.error().is_none());
        assert_eq!(after.phase(), before.phase());
        assert_eq!(after.is_loading(), before.is_loading());
    }

    #[tokio::test]
    async fn test_role_is_none_when_signed_out() {
        let m = manager(Arc::default(), Arc::new(FakeBackend::accepting()));
        assert_eq!(m.user_role(), None);
    }

    #[tokio::test]
    async fn test_subscribers_see_login() {
        let m = manager(Arc::default(), Arc::new(FakeBackend::accepting()));
        let mut updates = m.subscribe();

        assert!(m.login(&credentials()).await);

        assert!(updates.has_changed().unwrap());
        assert!(updates.borrow_and_update().is_logged_in());
    }

    #[tokio::test]
    async fn test_failed_relogin_purges_previous_session() {
        let store = Arc::new(MemoryCredentialStore::new());
        let backend = Arc::new(FakeBackend::accepting());
        let m = manager(store.clone(), backend.clone());
        assert!(m.login(&credentials()).await);
        assert!(store.contains(keys::AUTH_TOKEN).await);

        backend.start_rejecting("Invalid credentials").await;
        assert!(!m.login(&credentials()).await);

        assert!(!store.contains(keys::AUTH_TOKEN).await);
        assert!(!store.contains(keys::AUTH_USER).await);

        let relaunched = manager(store, backend);
        assert_eq!(relaunched.restore().await.phase(), Phase::Unauthenticated);
    }

    #[tokio::test]
    async fn test_failed_login_keeps_biometric_record() {
        let store = Arc::new(MemoryCredentialStore::with_entries([(
            keys::BIOMETRIC_CREDENTIALS,
            "{}",
        )]));
        let m = manager(store.clone(), Arc::new(FakeBackend::rejecting("Invalid credentials")));

        assert!(!m.login(&credentials()).await);
        assert!(store.contains(keys::BIOMETRIC_CREDENTIALS).await);
    }

    #[tokio::test]
    async fn test_login_is_loading_while_in_flight() {
        let gate = Arc::new(Notify::new());
        let m = Arc::new(manager(Arc::default(), Arc::new(FakeBackend::gated(gate.clone()))));
        m.restore().await;
        let mut updates = m.subscribe();

        let task = tokio::spawn({
            let m = m.clone();
            async move { m.login(&credentials()).await }
        });

        let in_flight = updates.wait_for(Session::is_loading).await.unwrap().clone();
        assert_eq!(in_flight.phase(), Phase::Loading);
        assert!(in_flight.user().is_none());
        assert_eq!(m.phase(), Phase::Loading);

        gate.notify_one();
        assert!(task.await.unwrap());

        let settled = m.state();
        assert!(!settled.is_loading());
        assert_eq!(settled.phase(), Phase::Authenticated);
    }

    #[tokio::test]
    async fn test_logout_is_loading_while_in_flight() {
        let gate = Arc::new(Notify::new());
        let m = Arc::new(manager(Arc::default(), Arc::new(FakeBackend::gated(gate.clone()))));
        gate.notify_one();
        assert!(m.login(&credentials()).await);
        let mut updates = m.subscribe();

        let task = tokio::spawn({
            let m = m.clone();
            async move { m.logout().await }
        });

        let in_flight = updates.wait_for(Session::is_loading).await.unwrap().clone();
        assert_eq!(in_flight.phase(), Phase::Loading);
        // still signed in until the backend answers
        assert!(in_flight.is_logged_in());

        gate.notify_one();
        task.await.unwrap();

        let settled = m.state();
        assert!(!settled.is_loading());
        assert_eq!(settled.phase(), Phase::Unauthenticated);
    }

    #[tokio::test]
    async fn test_restore_is_loading_until_settled() {
        let store = Arc::new(MemoryCredentialStore::with_entries([
            (keys::AUTH_TOKEN, "stored-token"),
            (keys::AUTH_USER, r#"{"id":7,"name":"Ana"}"#),
        ]));
        let m = Arc::new(
            SessionManager::new(store, Arc::new(FakeBackend::accepting()))
                .with_restore_delay(Duration::from_millis(50)),
        );
        let updates = m.subscribe();

        let task = tokio::spawn({
            let m = m.clone();
            async move { m.restore().await }
        });

        tokio::task::yield_now().await;
        assert!(updates.borrow().is_loading());
        assert_eq!(updates.borrow().phase(), Phase::Initializing);

        let state = task.await.unwrap();
        assert!(!state.is_loading());
        assert_eq!(state.phase(), Phase::Authenticated);
    }

    #[test]
    fn test_loading_guard_clears_on_drop() {
        let (tx, _rx) = watch::channel(Session::unauthenticated());
        {
            let _guard = LoadingGuard::enter(&tx);
            assert!(tx.borrow().is_loading());
        }
        assert!(!tx.borrow().is_loading());
    }
}
