//! Session configuration, loaded from environment variables.
//!
//! DESIGN
//! ======
//! One config value (`simulate_social_login`) replaces the debug/production
//! fork: the flow is always the same, only the injected adapter and the
//! skipped SDK registration differ. There are never two parallel login
//! code paths.

use std::time::Duration;

/// Placeholder app id shipped in example configs. Registration warns when it
/// is still in use.
pub const APP_ID_PLACEHOLDER: &str = "wx_app_id_here";

const DEFAULT_ADAPTER_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_SDK_INIT_DELAY_MS: u64 = 2_000;

/// Authentication configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// App id issued by the social-login provider.
    pub app_id: String,
    /// iOS universal link registered with the provider. Empty on platforms
    /// that do not use one.
    pub universal_link: String,
    /// When set, the handshake runs against the simulated adapter and SDK
    /// registration is skipped entirely at bootstrap.
    pub simulate_social_login: bool,
    /// Upper bound on every individual adapter/exchange call.
    pub adapter_timeout: Duration,
    /// Delay before the fire-and-forget SDK registration at bootstrap, so
    /// login-screen rendering is never gated on the SDK.
    pub sdk_init_delay: Duration,
}

impl AuthConfig {
    /// Load from `SOCIAL_APP_ID`, `SOCIAL_UNIVERSAL_LINK`,
    /// `SIMULATE_SOCIAL_LOGIN`, `ADAPTER_TIMEOUT_MS` and
    /// `SDK_INIT_DELAY_MS`, with defaults for anything unset.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            app_id: std::env::var("SOCIAL_APP_ID").unwrap_or_else(|_| APP_ID_PLACEHOLDER.into()),
            universal_link: std::env::var("SOCIAL_UNIVERSAL_LINK").unwrap_or_default(),
            simulate_social_login: env_parse("SIMULATE_SOCIAL_LOGIN", false),
            adapter_timeout: Duration::from_millis(env_parse("ADAPTER_TIMEOUT_MS", DEFAULT_ADAPTER_TIMEOUT_MS)),
            sdk_init_delay: Duration::from_millis(env_parse("SDK_INIT_DELAY_MS", DEFAULT_SDK_INIT_DELAY_MS)),
        }
    }

    /// Whether the configured app id is still the shipped placeholder.
    #[must_use]
    pub fn app_id_is_placeholder(&self) -> bool {
        self.app_id == APP_ID_PLACEHOLDER
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            app_id: APP_ID_PLACEHOLDER.into(),
            universal_link: String::new(),
            simulate_social_login: false,
            adapter_timeout: Duration::from_millis(DEFAULT_ADAPTER_TIMEOUT_MS),
            sdk_init_delay: Duration::from_millis(DEFAULT_SDK_INIT_DELAY_MS),
        }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
