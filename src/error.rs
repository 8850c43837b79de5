//! Failure taxonomy for session operations.
//!
//! ERROR HANDLING
//! ==============
//! Each social-login stage fails with its own variant so the presentation
//! layer can show a distinct message per stage. User cancellation is NOT an
//! error anywhere in this crate — it travels as
//! [`SocialLoginOutcome::Cancelled`](crate::session::SocialLoginOutcome)
//! and must never produce an error dialog.

use crate::adapter::AdapterError;
use crate::exchange::ExchangeError;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Credential store read/write/remove failed; in-memory state is left
    /// unchanged so persisted and live state never diverge.
    #[error("credential store error: {0}")]
    Persistence(#[from] StoreError),

    /// Phone number or verification code rejected. No state change.
    #[error("invalid phone number or verification code")]
    InvalidCredential,

    /// The social-login SDK is not available on this build/device.
    #[error("social login is not available on this device")]
    AuthenticationUnavailable,

    /// SDK registration with the provider failed.
    #[error("social login SDK initialization failed: {0}")]
    Initialization(String),

    /// The companion app is not installed on-device.
    #[error("the companion app is not installed")]
    CompanionAppMissing,

    /// The authorization request failed for a reason other than
    /// user cancellation.
    #[error("authorization failed: {0}")]
    Authorization(String),

    /// The code-for-profile exchange returned no profile.
    #[error("fetching the user profile failed")]
    ProfileExchange,

    /// The backend exchange itself errored.
    #[error("profile exchange error: {0}")]
    Exchange(#[from] ExchangeError),

    /// An adapter call exceeded the configured timeout.
    #[error("social login adapter timed out during {0}")]
    AdapterTimeout(&'static str),

    /// Adapter failure outside the classified handshake stages.
    #[error("social login adapter error: {0}")]
    Adapter(#[from] AdapterError),

    /// A login operation is already in flight; the second call is rejected
    /// rather than racing the first to sign in.
    #[error("another login attempt is already in progress")]
    LoginInFlight,
}
