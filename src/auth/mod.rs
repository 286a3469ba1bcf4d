use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::AuthConfig;

pub mod guard;
mod identity;
mod local;
mod login;
mod logout;

pub use guard::{require_admin, GuardOutcome};
pub use identity::IdentityToolkit;
pub use local::StaticAdmin;
pub(crate) use login::{login, login_page};
pub(crate) use logout::logout;

/// Proof of a signed-in admin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    pub token: String,
    pub email: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// The provider said no; the message is the provider's own.
    #[error("{0}")]
    Rejected(String),

    #[error("identity provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected identity provider response: {0}")]
    Protocol(String),
}

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AdminSession, AuthError>;
    async fn sign_out(&self, session: &AdminSession) -> Result<(), AuthError>;
    /// `Ok(None)` when the token is unknown or expired.
    async fn get_session(&self, token: &str) -> Result<Option<AdminSession>, AuthError>;
}

pub type Auth = Arc<dyn AuthService>;

pub fn from_config(config: &AuthConfig) -> Auth {
    match config {
        AuthConfig::Identity { api_key, base_url } => Arc::new(IdentityToolkit::new(api_key, base_url)),
        AuthConfig::Static { email, password } => Arc::new(StaticAdmin::new(email, password)),
    }
}

/// Only site-relative paths, so a crafted link can't bounce a fresh login
/// off to another host.
pub(crate) fn safe_return_url(return_url: Option<&str>) -> &str {
    match return_url {
        Some(url) if url.starts_with('/') && !url.starts_with("//") && !url.contains('\\') => url,
        _ => "/admin",
    }
}
