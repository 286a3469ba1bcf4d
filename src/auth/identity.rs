use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::GetField;

use super::{AdminSession, AuthError, AuthService};

/// Email/password accounts kept by a hosted identity toolkit.
///
/// Tokens are the provider's ID tokens; checking one is a lookup call, and
/// signing out only has to forget it locally.
#[derive(Clone)]
pub struct IdentityToolkit {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    id_token: &'a str,
}

impl IdentityToolkit {
    pub fn new(api_key: &str, base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.to_owned(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    fn url(&self, method: &str) -> String {
        format!("{}/accounts:{method}?key={}", self.base_url, self.api_key)
    }

    async fn call(&self, method: &str, body: &impl Serialize) -> Result<(StatusCode, Value), AuthError> {
        let response = self.http.post(self.url(method))
            .json(body)
            .send()
            .await?;
        let status = response.status();
        let body: Value = response.json().await?;
        Ok((status, body))
    }
}

/// `{"error": {"message": "INVALID_PASSWORD"}}`
fn provider_message(body: &Value) -> String {
    body.get_obj_field("error")
        .and_then(|e| e.get_str_field("message"))
        .unwrap_or_else(|_| body.to_string())
}

fn protocol(e: anyhow::Error) -> AuthError {
    AuthError::Protocol(e.to_string())
}

#[async_trait]
impl AuthService for IdentityToolkit {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AdminSession, AuthError> {
        let request = PasswordRequest { email, password, return_secure_token: true };
        let (status, body) = self.call("signInWithPassword", &request).await?;
        if !status.is_success() {
            return Err(AuthError::Rejected(provider_message(&body)));
        }

        let session = AdminSession {
            token: body.get_str_field("idToken").map_err(protocol)?,
            email: body.get_str_field("email").map_err(protocol)?,
        };
        info!("admin {} signed in", session.email);
        Ok(session)
    }

    async fn sign_out(&self, session: &AdminSession) -> Result<(), AuthError> {
        info!("admin {} signed out", session.email);
        Ok(())
    }

    async fn get_session(&self, token: &str) -> Result<Option<AdminSession>, AuthError> {
        let (status, body) = self.call("lookup", &LookupRequest { id_token: token }).await?;
        if status == StatusCode::BAD_REQUEST {
            // expired or revoked token
            warn!("session lookup refused: {}", provider_message(&body));
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AuthError::Protocol(provider_message(&body)));
        }

        let email = body.get("users")
            .and_then(Value::as_array)
            .and_then(|users| users.first())
            .map(|user| user.get_str_field("email"))
            .transpose()
            .map_err(protocol)?;

        Ok(email.map(|email| AdminSession { token: token.to_owned(), email }))
    }
}
