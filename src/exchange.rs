//! Authorization-code-for-profile exchange.
//!
//! The real exchange belongs on a backend the app talks to; its wire
//! protocol is not this crate's concern. The contract here is minimal:
//! code in, `User` or `None` out. [`SimulatedProfileExchange`] stands in
//! for that backend during development and tests.

use std::time::Duration;

use tracing::info;

use crate::user::{User, unix_millis};

/// Display name the simulated backend assigns to social logins.
pub const SOCIAL_USER_NAME: &str = "微信用户";

const SIMULATED_AVATAR_URL: &str = "https://example.com/avatar.png";
const SIMULATED_EXCHANGE_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("profile exchange failed: {0}")]
    Backend(String),
}

/// Exchange a single-use authorization code for a user profile.
#[async_trait::async_trait]
pub trait ProfileExchange: Send + Sync {
    /// `Ok(None)` means the backend could not resolve a profile for the
    /// code; the handshake fails without partial state.
    ///
    /// # Errors
    ///
    /// Returns an [`ExchangeError`] when the exchange itself fails.
    async fn exchange(&self, code: &str) -> Result<Option<User>, ExchangeError>;
}

/// Stand-in backend: resolves every code to a fresh social-login profile
/// after a short simulated round trip.
#[derive(Debug, Default)]
pub struct SimulatedProfileExchange;

impl SimulatedProfileExchange {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl ProfileExchange for SimulatedProfileExchange {
    async fn exchange(&self, code: &str) -> Result<Option<User>, ExchangeError> {
        info!(code, "simulated profile exchange");
        tokio::time::sleep(SIMULATED_EXCHANGE_DELAY).await;
        Ok(Some(User {
            id: format!("wx_{}", unix_millis()),
            name: SOCIAL_USER_NAME.to_owned(),
            phone: None,
            avatar_url: Some(SIMULATED_AVATAR_URL.to_owned()),
        }))
    }
}

#[cfg(test)]
#[path = "exchange_test.rs"]
mod tests;
