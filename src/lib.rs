//! Authentication session core for the Drakon mobile app.
//!
//! ARCHITECTURE
//! ============
//! `SessionManager` is the single source of truth for "who is logged in".
//! It owns the `{current_user, is_loading}` snapshot behind a watch channel,
//! persists the user record through an injected [`CredentialStore`], and
//! drives the social-login handshake through an injected
//! [`SocialLoginAdapter`] plus a [`ProfileExchange`] stand-in for the
//! server-side code exchange. The presentation layer subscribes to session
//! snapshots and navigation signals; it never mutates state directly.
//!
//! All third-party SDK access goes through the adapter trait so the whole
//! flow is fakeable in tests and runnable in simulation mode without a
//! native SDK present.

pub mod adapter;
pub mod config;
pub mod error;
pub mod exchange;
pub mod session;
pub mod store;
pub mod user;

pub use adapter::{AuthResponse, SimulatedAdapter, SocialLoginAdapter};
pub use config::AuthConfig;
pub use error::AuthError;
pub use exchange::{ProfileExchange, SimulatedProfileExchange};
pub use session::{AuthSession, Navigation, SessionManager, SocialLoginOutcome};
pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use user::User;
