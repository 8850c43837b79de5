//! Social-login SDK adapter — the stable contract over the third-party
//! native SDK.
//!
//! ERROR HANDLING
//! ==============
//! Adapter failures are never swallowed, with one exception: the SDK's
//! "user cancelled" failure is translated into `Ok(None)` by
//! [`request_authorization`](SocialLoginAdapter::request_authorization)
//! implementations. Cancellation must reach the caller as the absence of a
//! code, never as an error, so no error dialog is shown when the user backs
//! out of the consent screen.

use std::fmt::Write;

use rand::Rng;
use tracing::info;

use crate::user::unix_millis;

/// OAuth-style scope requested for every authorization.
pub const AUTH_SCOPE: &str = "snsapi_userinfo";

/// Result of a granted authorization request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResponse {
    /// Opaque single-use authorization code, consumed by the profile
    /// exchange. Never persisted.
    pub code: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// The native module did not load; the adapter cannot be used at all.
    #[error("social login SDK is not loaded")]
    NotLoaded,
    /// Failure reported by the SDK itself.
    #[error("{0}")]
    Sdk(String),
}

/// Capability surface of the third-party login SDK.
#[async_trait::async_trait]
pub trait SocialLoginAdapter: Send + Sync {
    /// Whether the SDK is present at all. A capability probe, not a network
    /// call.
    fn probe_availability(&self) -> bool;

    /// Register this application with the provider. `Ok(false)` means the
    /// SDK declined registration without raising.
    ///
    /// # Errors
    ///
    /// Returns an [`AdapterError`] when the SDK raises during registration.
    async fn register_app(&self, app_id: &str, universal_link: &str) -> Result<bool, AdapterError>;

    /// Whether the companion app is installed on-device.
    ///
    /// # Errors
    ///
    /// Returns an [`AdapterError`] when the SDK cannot answer.
    async fn is_installed(&self) -> Result<bool, AdapterError>;

    /// Issue the authorization request. `Ok(None)` means the user cancelled;
    /// implementations must translate the SDK's cancel signal via
    /// [`is_cancellation`] rather than letting it propagate as an error.
    ///
    /// # Errors
    ///
    /// Returns an [`AdapterError`] for any failure other than cancellation.
    async fn request_authorization(&self, scope: &str, state: &str) -> Result<Option<AuthResponse>, AdapterError>;
}

/// Whether an SDK failure message is the user-cancel signal. The SDK reports
/// cancellation either localized or in English depending on platform.
#[must_use]
pub fn is_cancellation(message: &str) -> bool {
    message.contains("用户取消") || message.to_ascii_lowercase().contains("user cancelled")
}

/// Generate the per-handshake anti-replay state token: 16 random bytes, hex.
#[must_use]
pub fn generate_state_token() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

// =============================================================================
// SIMULATED ADAPTER
// =============================================================================

/// Adapter used when `simulate_social_login` is set: always available,
/// always installed, and grants a synthetic authorization code without
/// touching a native SDK.
#[derive(Debug, Default)]
pub struct SimulatedAdapter;

impl SimulatedAdapter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl SocialLoginAdapter for SimulatedAdapter {
    fn probe_availability(&self) -> bool {
        true
    }

    async fn register_app(&self, app_id: &str, _universal_link: &str) -> Result<bool, AdapterError> {
        info!(app_id, "simulated SDK registration");
        Ok(true)
    }

    async fn is_installed(&self) -> Result<bool, AdapterError> {
        Ok(true)
    }

    async fn request_authorization(&self, scope: &str, state: &str) -> Result<Option<AuthResponse>, AdapterError> {
        info!(scope, state, "simulated authorization granted");
        Ok(Some(AuthResponse { code: format!("sim_{}", unix_millis()) }))
    }
}

#[cfg(test)]
#[path = "adapter_test.rs"]
mod tests;
