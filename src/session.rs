//! Keys and helpers for the cookie-backed session.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::warn;

/// Token handed out by the auth service on sign-in.
pub const ADMIN_TOKEN: &str = "admin_token";
pub const FLASH: &str = "flash";

/// One-shot message for the next admin page render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Flash {
    Success(String),
    Error(String),
}

pub async fn flash(session: &Session, flash: Flash) -> Result<(), tower_sessions::session::Error> {
    session.insert(FLASH, flash).await
}

/// Removes and returns the pending flash. A broken session just means no
/// banner.
pub async fn take_flash(session: &Session) -> Option<Flash> {
    match session.remove::<Flash>(FLASH).await {
        Ok(flash) => flash,
        Err(e) => {
            warn!("couldn't read flash: {e}");
            None
        }
    }
}
