//! # Session Manager
//!
//! Credential lifecycle and the proactive token-refresh scheduler.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Credential Refresh State Machine                      │
//! │                                                                         │
//! │   login / register / restore                                           │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   ┌─────────┐  exp readable   ┌───────────┐  timer fires  ┌──────────┐ │
//! │   │  Idle   │───────────────► │ Scheduled │─────────────► │Refreshing│ │
//! │   └─────────┘                 └───────────┘               └────┬─────┘ │
//! │        ▲    exp unreadable:        ▲                           │       │
//! │        │    no timer armed         │ success: credential       │       │
//! │        │    (fail open)            │ replaced, timer re-armed  │       │
//! │        │                           └───────────────────────────┤       │
//! │        │                                                       │       │
//! │        │              failure: revoke best-effort,             │       │
//! │        └──────────────credential cleared, NO retry ◄───────────┘       │
//! │                       (terminal for the session)                       │
//! │                                                                         │
//! │   Timer delay = max(expiry - now - margin, min_delay)                  │
//! │   Inside the margin already? Refresh immediately.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! At most one renewal is ever in flight. Renewals serialize behind an async
//! mutex; a caller that raced a pending renewal observes its outcome (via an
//! epoch check) instead of issuing a second network call.
//!
//! ## Ownership
//! The armed timer is a single owned resource: arming cancels the prior
//! handle, and dropping the manager cancels the armed one. The timer task
//! holds only a `Weak` reference and dies with its owner.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use tillpoint_store::{KeyValueStore, StorageScope};

use crate::api::auth::{AuthBackend, RegisterRequest};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::jwt;

/// Storage key under which the serialized credential lives.
const CREDENTIAL_KEY: &str = "session.credential";

// =============================================================================
// Credential
// =============================================================================

/// The access/refresh token pair plus identity claims issued by the
/// authentication API.
///
/// Both tokens are always present together; a logged-out session is the
/// absence of the whole credential, never a half-filled one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: String,
    pub tenant_id: String,
    pub role: String,
    pub email: String,
}

// =============================================================================
// Refresh State
// =============================================================================

/// Transient, in-memory renewal bookkeeping. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct RefreshState {
    /// A renewal request is currently in flight.
    pub in_flight: bool,

    /// Last renewal error, if any.
    pub last_error: Option<String>,

    /// When the last renewal succeeded.
    pub last_refreshed_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Delay Computation
// =============================================================================

/// Computes the delay until the next proactive renewal.
///
/// Returns `None` when the token is already within `margin` of expiry (or
/// past it): refresh immediately instead of arming a timer. Otherwise the
/// delay is `expiry - now - margin`, floored at `min_delay` so clock skew
/// can never produce a tight refresh loop.
pub fn next_refresh_delay(
    expiry_ms: i64,
    now_ms: i64,
    margin: Duration,
    min_delay: Duration,
) -> Option<Duration> {
    let margin_ms = margin.as_millis() as i64;
    let until_expiry = expiry_ms - now_ms;

    if until_expiry <= margin_ms {
        return None;
    }

    let delay_ms = (until_expiry - margin_ms).max(min_delay.as_millis() as i64);
    Some(Duration::from_millis(delay_ms as u64))
}

// =============================================================================
// Session Manager
// =============================================================================

/// Owner of the client's credential.
///
/// The mutation surface is closed: [`SessionManager::login`],
/// [`SessionManager::register`], [`SessionManager::set_credential`],
/// [`SessionManager::refresh_session`], and [`SessionManager::logout`].
/// Everything else is read access.
pub struct SessionManager {
    backend: Arc<dyn AuthBackend>,
    store: Arc<dyn KeyValueStore>,
    scope: StorageScope,
    refresh_margin: Duration,
    min_refresh_delay: Duration,

    credential: RwLock<Option<Credential>>,
    refresh_state: RwLock<RefreshState>,

    /// Serializes renewals: the at-most-one-in-flight guarantee.
    renewal: Mutex<()>,

    /// Bumped on every credential install or clear; lets a caller that
    /// waited on `renewal` detect that the work was already done.
    epoch: AtomicU64,

    /// The single armed refresh timer.
    timer: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl SessionManager {
    /// Creates a manager over the given auth backend and credential store.
    pub fn new(
        backend: Arc<dyn AuthBackend>,
        store: Arc<dyn KeyValueStore>,
        config: &ClientConfig,
    ) -> Arc<Self> {
        let scope = if config.remember_session {
            StorageScope::Durable
        } else {
            StorageScope::Session
        };

        Arc::new(SessionManager {
            backend,
            store,
            scope,
            refresh_margin: config.refresh_margin,
            min_refresh_delay: config.min_refresh_delay,
            credential: RwLock::new(None),
            refresh_state: RwLock::new(RefreshState::default()),
            renewal: Mutex::new(()),
            epoch: AtomicU64::new(0),
            timer: std::sync::Mutex::new(None),
        })
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Current credential, if logged in.
    pub async fn credential(&self) -> Option<Credential> {
        self.credential.read().await.clone()
    }

    /// Current access token, or [`ClientError::NotAuthenticated`].
    pub async fn access_token(&self) -> ClientResult<String> {
        self.credential
            .read()
            .await
            .as_ref()
            .map(|c| c.access_token.clone())
            .ok_or(ClientError::NotAuthenticated)
    }

    /// Whether a credential is present.
    pub async fn is_authenticated(&self) -> bool {
        self.credential.read().await.is_some()
    }

    /// Current renewal bookkeeping.
    pub async fn refresh_state(&self) -> RefreshState {
        self.refresh_state.read().await.clone()
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Logs in and installs the resulting credential.
    pub async fn login(self: &Arc<Self>, email: &str, password: &str) -> ClientResult<Credential> {
        tillpoint_core::validation::validate_email(email)?;
        if password.is_empty() {
            return Err(tillpoint_core::ValidationError::Required {
                field: "password".to_string(),
            }
            .into());
        }

        let credential = self.backend.login(email, password).await?;
        self.install(credential.clone()).await?;
        info!(user_id = %credential.user_id, "Logged in");
        Ok(credential)
    }

    /// Registers a new account and installs the resulting credential.
    pub async fn register(self: &Arc<Self>, request: &RegisterRequest) -> ClientResult<Credential> {
        tillpoint_core::validation::validate_email(&request.email)?;
        tillpoint_core::validation::validate_name("name", &request.name)?;
        if request.password.is_empty() {
            return Err(tillpoint_core::ValidationError::Required {
                field: "password".to_string(),
            }
            .into());
        }

        let credential = self.backend.register(request).await?;
        self.install(credential.clone()).await?;
        info!(user_id = %credential.user_id, "Registered");
        Ok(credential)
    }

    /// Installs an externally obtained credential (e.g. restored elsewhere).
    pub async fn set_credential(self: &Arc<Self>, credential: Credential) -> ClientResult<()> {
        self.install(credential).await
    }

    /// Restores a persisted credential from the store, if any.
    ///
    /// Returns whether a credential was restored. A value that fails to
    /// deserialize is discarded from the store.
    pub async fn restore(self: &Arc<Self>) -> ClientResult<bool> {
        let Some(raw) = self.store.get(self.scope, CREDENTIAL_KEY).await? else {
            return Ok(false);
        };

        match serde_json::from_str::<Credential>(&raw) {
            Ok(credential) => {
                debug!(user_id = %credential.user_id, "Restored persisted credential");
                self.install(credential).await?;
                Ok(true)
            }
            Err(e) => {
                warn!(error = %e, "Discarding unreadable persisted credential");
                self.store.delete(self.scope, CREDENTIAL_KEY).await?;
                Ok(false)
            }
        }
    }

    /// Renews the credential using the stored refresh token.
    ///
    /// Serialized: a call racing an in-flight renewal does not issue a
    /// second request; it observes the pending renewal's outcome. Failure
    /// is terminal for the session: the credential is revoked best-effort,
    /// cleared everywhere, and no retry is scheduled.
    pub async fn refresh_session(self: &Arc<Self>) -> ClientResult<Credential> {
        let entry_epoch = self.epoch.load(Ordering::SeqCst);
        let _guard = self.renewal.lock().await;

        // Credential changed while we waited: that renewal's outcome is ours
        if self.epoch.load(Ordering::SeqCst) != entry_epoch {
            return match self.credential.read().await.clone() {
                Some(credential) => Ok(credential),
                None => {
                    let reason = self
                        .refresh_state
                        .read()
                        .await
                        .last_error
                        .clone()
                        .unwrap_or_else(|| "session cleared".to_string());
                    Err(ClientError::SessionExpired(reason))
                }
            };
        }

        let refresh_token = match self.credential.read().await.as_ref() {
            Some(credential) => credential.refresh_token.clone(),
            None => return Err(ClientError::NotAuthenticated),
        };

        self.refresh_state.write().await.in_flight = true;
        debug!("Renewing access credential");

        match self.backend.refresh(&refresh_token).await {
            Ok(credential) => {
                self.refresh_state.write().await.in_flight = false;

                // The credential changed while the renewal was in flight
                // (logout, explicit set): do not resurrect the old session
                if self.epoch.load(Ordering::SeqCst) != entry_epoch {
                    return match self.credential.read().await.clone() {
                        Some(current) => Ok(current),
                        None => Err(ClientError::NotAuthenticated),
                    };
                }

                {
                    let mut state = self.refresh_state.write().await;
                    state.last_error = None;
                    state.last_refreshed_at = Some(Utc::now());
                }
                self.install(credential.clone()).await?;
                info!("Access credential renewed");
                Ok(credential)
            }
            Err(e) => {
                self.refresh_state.write().await.in_flight = false;
                warn!(error = %e, "Credential renewal failed; logging out");

                let reason = e.to_string();
                self.clear_session().await;
                self.refresh_state.write().await.last_error = Some(reason.clone());
                Err(ClientError::SessionExpired(reason))
            }
        }
    }

    /// Logs out: revokes best-effort, clears memory and store, cancels the
    /// armed timer.
    pub async fn logout(self: &Arc<Self>) {
        self.clear_session().await;
        info!("Logged out");
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    /// Installs a credential: persist, swap, bump epoch, re-arm the timer.
    async fn install(self: &Arc<Self>, credential: Credential) -> ClientResult<()> {
        let serialized = serde_json::to_string(&credential)?;
        self.store
            .put(self.scope, CREDENTIAL_KEY, &serialized)
            .await?;

        *self.credential.write().await = Some(credential);
        self.epoch.fetch_add(1, Ordering::SeqCst);

        self.arm_timer().await;
        Ok(())
    }

    /// Clears the session: cancel timer, take the credential, best-effort
    /// revoke, wipe the store, reset refresh state.
    async fn clear_session(self: &Arc<Self>) {
        self.cancel_timer();

        let credential = self.credential.write().await.take();
        self.epoch.fetch_add(1, Ordering::SeqCst);

        if let Some(credential) = credential {
            // The credential is being discarded regardless; a failed revoke
            // only gets a warning
            if let Err(e) = self.backend.revoke(&credential.refresh_token).await {
                warn!(error = %e, "Token revocation failed");
            }
        }

        if let Err(e) = self.store.delete(self.scope, CREDENTIAL_KEY).await {
            warn!(error = %e, "Failed to remove persisted credential");
        }

        *self.refresh_state.write().await = RefreshState::default();
    }

    /// Arms the refresh timer for the current credential.
    ///
    /// Cancels any prior timer first. A token without a readable expiry
    /// arms nothing.
    async fn arm_timer(self: &Arc<Self>) {
        self.cancel_timer();

        let Some(access_token) = self
            .credential
            .read()
            .await
            .as_ref()
            .map(|c| c.access_token.clone())
        else {
            return;
        };

        let Some(expiry_ms) = jwt::expiry_unix_millis(&access_token) else {
            debug!("Access token has no readable expiry; refresh timer not armed");
            return;
        };

        let delay = next_refresh_delay(
            expiry_ms,
            Utc::now().timestamp_millis(),
            self.refresh_margin,
            self.min_refresh_delay,
        );

        match delay {
            Some(d) => debug!(delay_secs = d.as_secs(), "Refresh timer armed"),
            None => debug!("Token inside refresh margin; renewing immediately"),
        }

        let weak = Arc::downgrade(self);
        let handle = tokio::spawn(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            // The manager may be gone by the time the timer fires
            let Some(manager) = weak.upgrade() else {
                return;
            };
            // The renewal runs as its own task: the armed-timer handle must
            // never be the task that installs the new credential, or
            // re-arming would abort the renewal itself.
            //
            // The spawn lives in the `renewal_task` submodule: spawning
            // `refresh_session` here would require the compiler to prove its
            // future is `Send` while inferring the hidden type of the
            // surrounding async fns (a cycle it cannot resolve inside their
            // defining scope). Performing the spawn from a separate module
            // breaks that cycle without changing behavior.
            renewal_task::spawn(manager);
        });

        *self.timer.lock().expect("timer mutex poisoned") = Some(handle);
    }

    fn cancel_timer(&self) {
        if let Some(handle) = self.timer.lock().expect("timer mutex poisoned").take() {
            handle.abort();
        }
    }

    #[cfg(test)]
    fn timer_armed(&self) -> bool {
        self.timer.lock().expect("timer mutex poisoned").is_some()
    }
}

/// Spawns the scheduled renewal task.
///
/// Lives in its own module so the `tokio::spawn` below sits outside the
/// defining scope of [`SessionManager`]'s async fns. That placement lets the
/// compiler prove the renewal future is `Send` without trying to infer the
/// hidden types of those async fns mid-cycle (refresh_session -> install ->
/// arm_timer -> spawn). Behavior is identical to spawning inline.
mod renewal_task {
    use std::sync::Arc;

    use tracing::warn;

    use super::SessionManager;

    pub(super) fn spawn(manager: Arc<SessionManager>) {
        tokio::spawn(async move {
            if let Err(e) = manager.refresh_session().await {
                if !e.is_cancellation() {
                    warn!(error = %e, "Scheduled credential renewal failed");
                }
            }
        });
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.timer.lock() {
            if let Some(handle) = guard.take() {
                handle.abort();
            }
        }
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("scope", &self.scope)
            .field("refresh_margin", &self.refresh_margin)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    use tillpoint_store::MemoryStore;

    const MARGIN: Duration = Duration::from_secs(60);
    const MIN_DELAY: Duration = Duration::from_secs(5);

    /// Unsigned token whose `exp` lies `secs_from_now` in the future.
    fn token_expiring_in(secs_from_now: i64) -> String {
        let exp = Utc::now().timestamp() + secs_from_now;
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none"}"#);
        let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{}}}"#, exp).as_bytes());
        format!("{}.{}.sig", header, payload)
    }

    fn credential_with_token(access_token: &str) -> Credential {
        Credential {
            access_token: access_token.to_string(),
            refresh_token: "refresh-1".to_string(),
            user_id: "u1".to_string(),
            tenant_id: "t1".to_string(),
            role: "cashier".to_string(),
            email: "maria@example.com".to_string(),
        }
    }

    /// Scripted auth backend counting calls.
    #[derive(Default)]
    struct MockBackend {
        refresh_calls: AtomicUsize,
        revoke_calls: AtomicUsize,
        refresh_results: Mutex<VecDeque<ClientResult<Credential>>>,
        /// Added latency per refresh call, to widen race windows.
        refresh_latency: Option<Duration>,
    }

    impl MockBackend {
        fn with_refresh_results(results: Vec<ClientResult<Credential>>) -> Self {
            MockBackend {
                refresh_results: Mutex::new(results.into_iter().collect()),
                ..MockBackend::default()
            }
        }

        fn refresh_count(&self) -> usize {
            self.refresh_calls.load(Ordering::SeqCst)
        }

        fn revoke_count(&self) -> usize {
            self.revoke_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AuthBackend for MockBackend {
        async fn login(&self, _email: &str, _password: &str) -> ClientResult<Credential> {
            Ok(credential_with_token(&token_expiring_in(3600)))
        }

        async fn register(&self, _request: &RegisterRequest) -> ClientResult<Credential> {
            Ok(credential_with_token(&token_expiring_in(3600)))
        }

        async fn refresh(&self, _refresh_token: &str) -> ClientResult<Credential> {
            self.refresh_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(latency) = self.refresh_latency {
                tokio::time::sleep(latency).await;
            }
            self.refresh_results
                .lock()
                .await
                .pop_front()
                .unwrap_or_else(|| Ok(credential_with_token(&token_expiring_in(3600))))
        }

        async fn revoke(&self, _refresh_token: &str) -> ClientResult<()> {
            self.revoke_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn manager(backend: Arc<MockBackend>) -> (Arc<SessionManager>, Arc<MemoryStore>) {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("tillpoint_client=debug")
            .with_test_writer()
            .try_init();

        let store = Arc::new(MemoryStore::new());
        let config = ClientConfig::default();
        let manager = SessionManager::new(backend, store.clone(), &config);
        (manager, store)
    }

    // -------------------------------------------------------------------------
    // Delay computation
    // -------------------------------------------------------------------------

    #[test]
    fn test_delay_formula_beyond_margin() {
        // 10 minutes out: fire margin-early, exactly
        let now = 1_000_000_000_000;
        let expiry = now + 600_000;
        assert_eq!(
            next_refresh_delay(expiry, now, MARGIN, MIN_DELAY),
            Some(Duration::from_millis(540_000))
        );
    }

    #[test]
    fn test_delay_floored_at_minimum() {
        // 61s out: formula yields 1s, floored to the 5s minimum
        let now = 1_000_000_000_000;
        let expiry = now + 61_000;
        assert_eq!(
            next_refresh_delay(expiry, now, MARGIN, MIN_DELAY),
            Some(MIN_DELAY)
        );
    }

    #[test]
    fn test_within_margin_refreshes_immediately() {
        let now = 1_000_000_000_000;
        assert_eq!(next_refresh_delay(now + 30_000, now, MARGIN, MIN_DELAY), None);
        assert_eq!(next_refresh_delay(now + 60_000, now, MARGIN, MIN_DELAY), None);
        // Already expired
        assert_eq!(next_refresh_delay(now - 10_000, now, MARGIN, MIN_DELAY), None);
    }

    // -------------------------------------------------------------------------
    // Scheduling
    // -------------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn test_scheduled_refresh_fires_and_replaces_credential() {
        let backend = Arc::new(MockBackend::default());
        let (manager, _store) = manager(backend.clone());

        // 2 minutes to expiry: timer due in ~60s
        let original = credential_with_token(&token_expiring_in(120));
        manager.set_credential(original.clone()).await.unwrap();
        assert!(manager.timer_armed());

        tokio::time::sleep(Duration::from_secs(65)).await;

        assert_eq!(backend.refresh_count(), 1);
        let current = manager.credential().await.unwrap();
        assert_ne!(current.access_token, original.access_token);
        assert!(manager.refresh_state().await.last_refreshed_at.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_token_inside_margin_refreshes_immediately() {
        let backend = Arc::new(MockBackend::default());
        let (manager, _store) = manager(backend.clone());

        // 10s to expiry, inside the 60s margin: no future timer, refresh now
        manager
            .set_credential(credential_with_token(&token_expiring_in(10)))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(backend.refresh_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_undecodable_token_arms_no_timer() {
        let backend = Arc::new(MockBackend::default());
        let (manager, _store) = manager(backend.clone());

        manager
            .set_credential(credential_with_token("not.a.jwt-at-all"))
            .await
            .unwrap();
        assert!(!manager.timer_armed());

        tokio::time::sleep(Duration::from_secs(3600)).await;
        // Fail open: no renewal was ever attempted
        assert_eq!(backend.refresh_count(), 0);
        assert!(manager.is_authenticated().await);
    }

    // -------------------------------------------------------------------------
    // Serialization of renewals
    // -------------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_refreshes_issue_one_request() {
        let backend = Arc::new(MockBackend {
            refresh_latency: Some(Duration::from_millis(200)),
            ..MockBackend::default()
        });
        let (manager, _store) = manager(backend.clone());

        // Far-future expiry so the armed timer stays out of the way
        manager
            .set_credential(credential_with_token(&token_expiring_in(86_400)))
            .await
            .unwrap();

        let (a, b) = tokio::join!(manager.refresh_session(), manager.refresh_session());

        assert_eq!(backend.refresh_count(), 1);
        // Both callers observe the same outcome
        assert_eq!(a.unwrap().access_token, b.unwrap().access_token);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_refresh_shares_failure() {
        let backend = Arc::new(MockBackend {
            refresh_latency: Some(Duration::from_millis(200)),
            ..MockBackend::with_refresh_results(vec![Err(ClientError::Network(
                "connection reset".to_string(),
            ))])
        });
        let (manager, _store) = manager(backend.clone());

        manager
            .set_credential(credential_with_token(&token_expiring_in(86_400)))
            .await
            .unwrap();

        let (a, b) = tokio::join!(manager.refresh_session(), manager.refresh_session());

        assert_eq!(backend.refresh_count(), 1);
        assert!(matches!(a, Err(ClientError::SessionExpired(_))));
        assert!(matches!(b, Err(ClientError::SessionExpired(_))));
    }

    // -------------------------------------------------------------------------
    // Failure semantics
    // -------------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn test_refresh_failure_forces_logout() {
        let backend = Arc::new(MockBackend::with_refresh_results(vec![Err(
            ClientError::api(401, Default::default()),
        )]));
        let (manager, store) = manager(backend.clone());

        manager
            .set_credential(credential_with_token(&token_expiring_in(86_400)))
            .await
            .unwrap();
        assert!(store
            .get(StorageScope::Durable, CREDENTIAL_KEY)
            .await
            .unwrap()
            .is_some());

        let err = manager.refresh_session().await.unwrap_err();
        assert!(err.is_session_reset());

        // Credential cleared everywhere, revoke attempted, error recorded
        assert!(!manager.is_authenticated().await);
        assert!(store
            .get(StorageScope::Durable, CREDENTIAL_KEY)
            .await
            .unwrap()
            .is_none());
        assert_eq!(backend.revoke_count(), 1);
        assert!(manager.refresh_state().await.last_error.is_some());
        assert!(!manager.timer_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_without_credential() {
        let backend = Arc::new(MockBackend::default());
        let (manager, _store) = manager(backend.clone());

        let err = manager.refresh_session().await.unwrap_err();
        assert!(matches!(err, ClientError::NotAuthenticated));
        assert_eq!(backend.refresh_count(), 0);
    }

    // -------------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn test_restore_roundtrip() {
        let backend = Arc::new(MockBackend::default());
        let store = Arc::new(MemoryStore::new());
        let config = ClientConfig::default();

        let credential = credential_with_token(&token_expiring_in(86_400));
        {
            let first = SessionManager::new(backend.clone(), store.clone(), &config);
            first.set_credential(credential.clone()).await.unwrap();
        }

        let second = SessionManager::new(backend, store, &config);
        assert!(second.restore().await.unwrap());
        assert_eq!(second.credential().await.unwrap(), credential);
        assert!(second.timer_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restore_discards_unreadable_credential() {
        let backend = Arc::new(MockBackend::default());
        let store = Arc::new(MemoryStore::new());
        store
            .put(StorageScope::Durable, CREDENTIAL_KEY, "not json")
            .await
            .unwrap();

        let manager = SessionManager::new(backend, store.clone(), &ClientConfig::default());
        assert!(!manager.restore().await.unwrap());
        assert!(store
            .get(StorageScope::Durable, CREDENTIAL_KEY)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_revokes_and_clears() {
        let backend = Arc::new(MockBackend::default());
        let (manager, store) = manager(backend.clone());

        manager
            .set_credential(credential_with_token(&token_expiring_in(86_400)))
            .await
            .unwrap();
        manager.logout().await;

        assert!(!manager.is_authenticated().await);
        assert_eq!(backend.revoke_count(), 1);
        assert!(store
            .get(StorageScope::Durable, CREDENTIAL_KEY)
            .await
            .unwrap()
            .is_none());
        assert!(!manager.timer_armed());

        let state = manager.refresh_state().await;
        assert!(state.last_error.is_none());
        assert!(state.last_refreshed_at.is_none());
    }
}
