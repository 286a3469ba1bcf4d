pub mod admin;
pub mod auth;
pub mod config;
pub mod db;
pub mod filter;
pub mod forms;
pub mod models;
pub mod pages;
pub mod res;
pub mod session;
pub mod store;

use axum::{extract::FromRef, http::StatusCode, response::{IntoResponse, Response}, Router};
use serde_json::Value;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};
use tracing::error;

use crate::{auth::Auth, config::Config, store::{Objects, Store}};

/// Where uploaded objects are served from.
pub const STORAGE_ROUTE: &str = "/storage";

#[derive(Clone, FromRef)]
pub struct AppState {
    pub store: Store,
    pub objects: Objects,
    pub auth: Auth,
}

/// The whole site: public pages, the admin area, and uploaded files.
pub fn app(state: AppState, config: &Config) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(config.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(config.session_minutes)));

    Router::new()
        .merge(pages::router())
        .nest("/admin", admin::router(state.clone()))
        .nest_service(STORAGE_ROUTE, ServeDir::new(&config.storage_dir))
        .with_state(state)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
}

pub trait GetField {
    fn get_str_field(&self, field: &str) -> anyhow::Result<String>;
    fn get_obj_field(&self, field: &str) -> anyhow::Result<&Value>;
}

impl GetField for serde_json::Value {
    fn get_str_field(&self, field: &str) -> anyhow::Result<String> {
        Ok(
            self.get(field)
            .ok_or_else(|| anyhow::anyhow!("expected {field} in {self}"))?
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("expected {field} in {self} to be string"))?
            .to_owned()
        )
    }

    fn get_obj_field(&self, field: &str) -> anyhow::Result<&Value> {
        self.get(field)
            .filter(|v| v.is_object())
            .ok_or_else(|| anyhow::anyhow!("expected object {field} in {self}"))
    }
}

pub type AppResult<T> = Result<T, AppError>;
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("request failed: {:#}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("{:#}", self.0),
        )
            .into_response()
    }
}

impl From<String> for AppError {
    fn from(err: String) -> Self {
        Self(anyhow::Error::msg(err))
    }
}

impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        Self(anyhow::Error::msg(err.to_owned()))
    }
}

macro_rules! apperr_impl {
    ($E:ty) => {
        impl From<$E> for AppError {
            fn from(err: $E) -> Self {
                Self(anyhow::Error::from(err))
            }
        }
    };
}

apperr_impl!(anyhow::Error);
apperr_impl!(serde_json::Error);
apperr_impl!(sqlx::Error);
apperr_impl!(tower_sessions::session::Error);
apperr_impl!(axum::Error);
apperr_impl!(axum::extract::multipart::MultipartError);
apperr_impl!(std::io::Error);
apperr_impl!(store::StoreError);
apperr_impl!(auth::AuthError);

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn fields_are_read_or_explained() {
        let body = json!({ "idToken": "abc", "error": { "message": "NOPE" }, "n": 1 });
        assert_eq!(body.get_str_field("idToken").unwrap(), "abc");
        assert_eq!(body.get_obj_field("error").unwrap().get_str_field("message").unwrap(), "NOPE");
        assert!(body.get_str_field("n").unwrap_err().to_string().contains("to be string"));
        assert!(body.get_obj_field("idToken").is_err());
    }
}
