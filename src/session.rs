//! Session manager — the single source of truth for "who is logged in".
//!
//! ARCHITECTURE
//! ============
//! `SessionManager` owns the `{current_user, is_loading}` snapshot behind a
//! `watch` channel and emits `Navigation` signals over a `broadcast`
//! channel after sign-in/sign-out. The presentation layer subscribes to
//! both and invokes the public operations; it never mutates state itself.
//! Store and adapter access go through injected trait objects so every
//! login path is fakeable in tests.
//!
//! CONCURRENCY
//! ===========
//! Login operations are serialized by an atomic in-flight flag: a second
//! `phone_login`/`social_login` while one is pending is rejected with
//! `LoginInFlight` instead of racing the first to `sign_in`. The flag is
//! released by an RAII guard on every exit path. Every adapter and
//! exchange call is bounded by the configured timeout; a third-party SDK
//! is never awaited unboundedly.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{broadcast, watch};
use tracing::{error, info, warn};

use crate::adapter::{AUTH_SCOPE, AuthResponse, SocialLoginAdapter, generate_state_token};
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::exchange::ProfileExchange;
use crate::store::{CredentialStore, StoreError, USER_KEY};
use crate::user::User;

/// The one verification code the mock SMS policy accepts.
pub const MAGIC_SMS_CODE: &str = "123456";

const PHONE_LEN: usize = 11;
const CODE_LEN: usize = 6;
const NAV_CHANNEL_CAPACITY: usize = 16;

// =============================================================================
// OBSERVABLE STATE
// =============================================================================

/// Process-wide authentication state, observed by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    /// The authenticated identity, `None` when unauthenticated.
    pub current_user: Option<User>,
    /// `true` until the bootstrap credential lookup resolves, then `false`
    /// for the rest of the process lifetime.
    pub is_loading: bool,
}

impl AuthSession {
    fn initial() -> Self {
        Self { current_user: None, is_loading: true }
    }
}

/// Route-replacement signal emitted after a login state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Enter the authenticated area.
    Home,
    /// Return to the login screen.
    Login,
}

/// Terminal outcome of a social-login handshake that did not error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocialLoginOutcome {
    SignedIn(User),
    /// The user backed out of the consent screen. Not an error; no message
    /// is shown.
    Cancelled,
}

// =============================================================================
// SESSION MANAGER
// =============================================================================

pub struct SessionManager {
    config: AuthConfig,
    store: Arc<dyn CredentialStore>,
    adapter: Arc<dyn SocialLoginAdapter>,
    exchange: Arc<dyn ProfileExchange>,
    session_tx: watch::Sender<AuthSession>,
    nav_tx: broadcast::Sender<Navigation>,
    /// Set once `register_app` has succeeded; later handshakes skip
    /// registration. Shared with the startup registration task.
    sdk_registered: Arc<AtomicBool>,
    login_in_flight: AtomicBool,
}

impl SessionManager {
    #[must_use]
    pub fn new(
        config: AuthConfig,
        store: Arc<dyn CredentialStore>,
        adapter: Arc<dyn SocialLoginAdapter>,
        exchange: Arc<dyn ProfileExchange>,
    ) -> Self {
        let (session_tx, _) = watch::channel(AuthSession::initial());
        let (nav_tx, _) = broadcast::channel(NAV_CHANNEL_CAPACITY);
        Self {
            config,
            store,
            adapter,
            exchange,
            session_tx,
            nav_tx,
            sdk_registered: Arc::new(AtomicBool::new(false)),
            login_in_flight: AtomicBool::new(false),
        }
    }

    /// Fully simulated manager: in-memory store, simulated adapter and
    /// exchange, `simulate_social_login` forced on. Used in development
    /// builds and tests.
    #[must_use]
    pub fn simulated(mut config: AuthConfig) -> Self {
        config.simulate_social_login = true;
        Self::new(
            config,
            Arc::new(crate::store::MemoryCredentialStore::new()),
            Arc::new(crate::adapter::SimulatedAdapter::new()),
            Arc::new(crate::exchange::SimulatedProfileExchange::new()),
        )
    }

    /// Subscribe to `{current_user, is_loading}` snapshots.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthSession> {
        self.session_tx.subscribe()
    }

    /// Subscribe to route-replacement signals.
    #[must_use]
    pub fn navigation(&self) -> broadcast::Receiver<Navigation> {
        self.nav_tx.subscribe()
    }

    /// Current snapshot.
    #[must_use]
    pub fn session(&self) -> AuthSession {
        self.session_tx.borrow().clone()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.session_tx.borrow().current_user.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.session_tx.borrow().is_loading
    }

    // =========================================================================
    // BOOTSTRAP
    // =========================================================================

    /// Restore a persisted session, then schedule SDK registration.
    ///
    /// Invoked once at process start. Store failures and corrupt records
    /// are logged, never surfaced; the session always leaves the loading
    /// state. SDK registration runs fire-and-forget on its own task after
    /// `sdk_init_delay`, so the login screen is never gated on the SDK. In
    /// simulation mode registration is skipped entirely.
    pub async fn bootstrap(&self) {
        match self.store.get(USER_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => {
                    info!(user_id = %user.id, "restored persisted session");
                    self.session_tx.send_modify(|s| s.current_user = Some(user));
                }
                Err(e) => warn!(error = %e, "stored user record is corrupt, starting unauthenticated"),
            },
            Ok(None) => info!("no persisted session"),
            Err(e) => error!(error = %e, "credential store read failed, starting unauthenticated"),
        }
        // Runs on every path above; the login screen must become
        // interactive no matter what the store did.
        self.session_tx.send_modify(|s| s.is_loading = false);

        if self.config.simulate_social_login {
            info!("simulation mode, SDK registration skipped");
            self.sdk_registered.store(true, Ordering::SeqCst);
            return;
        }

        // Startup registration is best-effort; the handshake retries
        // registration on demand if this never lands.
        tokio::spawn(startup_registration(
            Arc::clone(&self.adapter),
            self.config.clone(),
            Arc::clone(&self.sdk_registered),
        ));
    }

    // =========================================================================
    // SIGN IN / SIGN OUT
    // =========================================================================

    /// Persist `user` and make it current.
    ///
    /// The record is written before any in-memory change: if the store
    /// write fails, the current user is untouched and persisted and live
    /// state stay in agreement.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Persistence`] when the store write fails.
    pub async fn sign_in(&self, user: User) -> Result<(), AuthError> {
        let raw = serde_json::to_string(&user).map_err(StoreError::from)?;
        self.store.set(USER_KEY, &raw).await?;
        info!(user_id = %user.id, "signed in");
        self.session_tx.send_modify(|s| s.current_user = Some(user));
        let _ = self.nav_tx.send(Navigation::Home);
        Ok(())
    }

    /// Remove the persisted record and clear the current user. Idempotent
    /// when nobody is signed in.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Persistence`] when the store removal fails; the
    /// current user is left in place.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.store.remove(USER_KEY).await?;
        info!("signed out");
        self.session_tx.send_modify(|s| s.current_user = None);
        let _ = self.nav_tx.send(Navigation::Login);
        Ok(())
    }

    // =========================================================================
    // PHONE LOGIN
    // =========================================================================

    /// Mock SMS delivery. Logs the pretend send and reports success; there
    /// is no failure path in the mock policy.
    // Async with no await point: the operation contract is uniform for the
    // presentation layer, and real delivery would suspend here.
    #[allow(clippy::unused_async)]
    pub async fn send_sms_code(&self, phone: &str) -> bool {
        info!(phone, code = MAGIC_SMS_CODE, "mock SMS verification code sent");
        true
    }

    /// Verify `code` against the mock policy and sign in a synthesized
    /// phone identity.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredential`] when the phone is not 11
    /// digits or the code is not the accepted one (no state change),
    /// [`AuthError::LoginInFlight`] when another login is pending, and
    /// [`AuthError::Persistence`] when persisting the new user fails.
    pub async fn phone_login(&self, phone: &str, code: &str) -> Result<User, AuthError> {
        let _slot = self.acquire_login_slot()?;

        let phone = normalize_phone(phone).ok_or(AuthError::InvalidCredential)?;
        let code = normalize_code(code).ok_or(AuthError::InvalidCredential)?;
        if code != MAGIC_SMS_CODE {
            warn!(%phone, "verification code mismatch");
            return Err(AuthError::InvalidCredential);
        }

        let user = User::from_phone(&phone);
        self.sign_in(user.clone()).await?;
        Ok(user)
    }

    // =========================================================================
    // SOCIAL LOGIN
    // =========================================================================

    /// Run the social-login handshake: availability probe, on-demand SDK
    /// registration, install check, authorization request, profile
    /// exchange, sign-in. Steps run strictly in this order and every
    /// failure exits with no partial state committed.
    ///
    /// User cancellation resolves to [`SocialLoginOutcome::Cancelled`]
    /// without an error.
    ///
    /// # Errors
    ///
    /// Each stage fails with its own variant: `AuthenticationUnavailable`,
    /// `Initialization`, `CompanionAppMissing`, `Authorization`,
    /// `ProfileExchange`, plus `AdapterTimeout` when a call exceeds the
    /// configured bound and `LoginInFlight` when a login is already
    /// pending.
    pub async fn social_login(&self) -> Result<SocialLoginOutcome, AuthError> {
        let _slot = self.acquire_login_slot()?;

        if !self.adapter.probe_availability() {
            warn!("social login adapter unavailable");
            return Err(AuthError::AuthenticationUnavailable);
        }

        if !self.sdk_registered.load(Ordering::SeqCst) {
            self.with_timeout("registration", self.register_sdk()).await??;
        }

        let installed = self.with_timeout("install check", self.adapter.is_installed()).await??;
        if !installed {
            warn!("companion app not installed");
            return Err(AuthError::CompanionAppMissing);
        }

        let state = generate_state_token();
        let response = self
            .with_timeout("authorization", self.adapter.request_authorization(AUTH_SCOPE, &state))
            .await?
            .map_err(|e| AuthError::Authorization(e.to_string()))?;
        let Some(AuthResponse { code }) = response else {
            info!("user cancelled social login");
            return Ok(SocialLoginOutcome::Cancelled);
        };

        let profile = self.with_timeout("profile exchange", self.exchange.exchange(&code)).await??;
        let Some(user) = profile else {
            warn!("profile exchange returned no user");
            return Err(AuthError::ProfileExchange);
        };

        self.sign_in(user.clone()).await?;
        Ok(SocialLoginOutcome::SignedIn(user))
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    /// Register with the provider and remember success.
    async fn register_sdk(&self) -> Result<(), AuthError> {
        if self.config.app_id_is_placeholder() {
            warn!(app_id = %self.config.app_id, "social app id is still the placeholder value");
        }
        let registered = self
            .adapter
            .register_app(&self.config.app_id, &self.config.universal_link)
            .await
            .map_err(|e| AuthError::Initialization(e.to_string()))?;
        if !registered {
            return Err(AuthError::Initialization("SDK declined registration".to_owned()));
        }
        self.sdk_registered.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Bound an adapter/exchange call by the configured timeout.
    async fn with_timeout<T>(&self, stage: &'static str, fut: impl Future<Output = T> + Send) -> Result<T, AuthError> {
        tokio::time::timeout(self.config.adapter_timeout, fut)
            .await
            .map_err(|_| AuthError::AdapterTimeout(stage))
    }

    /// Claim the single login slot; released when the returned guard drops.
    fn acquire_login_slot(&self) -> Result<LoginSlot<'_>, AuthError> {
        if self
            .login_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("login attempt rejected, another is in flight");
            return Err(AuthError::LoginInFlight);
        }
        Ok(LoginSlot { flag: &self.login_in_flight })
    }
}

/// Delayed fire-and-forget SDK registration, spawned by `bootstrap`.
///
/// Bounded by the configured adapter timeout like every other SDK call; a
/// hung `register_app` must not park this task for the process lifetime.
/// On timeout or failure the flag stays unset and the next handshake
/// registers on demand.
async fn startup_registration(
    adapter: Arc<dyn SocialLoginAdapter>,
    config: AuthConfig,
    registered: Arc<AtomicBool>,
) {
    tokio::time::sleep(config.sdk_init_delay).await;
    if config.app_id_is_placeholder() {
        warn!(app_id = %config.app_id, "social app id is still the placeholder value");
    }
    let register = adapter.register_app(&config.app_id, &config.universal_link);
    match tokio::time::timeout(config.adapter_timeout, register).await {
        Ok(Ok(true)) => {
            registered.store(true, Ordering::SeqCst);
            info!("social login SDK registered at startup");
        }
        Ok(Ok(false)) => warn!("social login SDK declined registration at startup"),
        Ok(Err(e)) => warn!(error = %e, "startup SDK registration failed"),
        Err(_) => warn!(
            timeout_ms = config.adapter_timeout.as_millis(),
            "startup SDK registration timed out"
        ),
    }
}

/// RAII release of the in-flight flag, covering every exit path of a
/// guarded operation.
struct LoginSlot<'a> {
    flag: &'a AtomicBool,
}

impl Drop for LoginSlot<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

// =============================================================================
// INPUT NORMALIZATION
// =============================================================================

fn normalize_phone(phone: &str) -> Option<String> {
    let trimmed = phone.trim();
    if trimmed.len() != PHONE_LEN || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(trimmed.to_owned())
}

fn normalize_code(code: &str) -> Option<String> {
    let trimmed = code.trim();
    if trimmed.len() != CODE_LEN || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(trimmed.to_owned())
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
