use std::collections::HashMap;

use async_trait::async_trait;
use rand::{distr::Alphanumeric, Rng};
use tokio::sync::RwLock;
use tracing::info;

use super::{AdminSession, AuthError, AuthService};

/// One admin account from configuration. Tokens live in memory, so a restart
/// signs everyone out.
pub struct StaticAdmin {
    email: String,
    password: String,
    sessions: RwLock<HashMap<String, AdminSession>>,
}

impl StaticAdmin {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.trim().to_owned(),
            password: password.to_owned(),
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

fn new_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

#[async_trait]
impl AuthService for StaticAdmin {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AdminSession, AuthError> {
        if !email.trim().eq_ignore_ascii_case(&self.email) || password != self.password {
            return Err(AuthError::Rejected("Invalid login credentials".to_owned()));
        }

        let session = AdminSession { token: new_token(), email: self.email.clone() };
        self.sessions.write().await.insert(session.token.clone(), session.clone());
        info!("admin {} signed in", self.email);
        Ok(session)
    }

    async fn sign_out(&self, session: &AdminSession) -> Result<(), AuthError> {
        self.sessions.write().await.remove(&session.token);
        info!("admin {} signed out", session.email);
        Ok(())
    }

    async fn get_session(&self, token: &str) -> Result<Option<AdminSession>, AuthError> {
        Ok(self.sessions.read().await.get(token).cloned())
    }
}
