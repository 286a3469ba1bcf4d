mod contacts;
mod dashboard;
mod profile;
mod projects;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_sessions::Session;
use tracing::warn;

use crate::{auth, session::{self, Flash}, store::StoreError, AppResult, AppState};

/// Everything under `/admin`. Routes above the guard layer need a session,
/// the login routes below it don't.
pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::dashboard))
        .route("/profile", get(profile::profile_page).post(profile::save))
        .route("/projects", get(projects::list))
        .route("/projects/new", get(projects::new_page).post(projects::create))
        .route("/projects/upload", post(projects::upload).layer(DefaultBodyLimit::max(projects::MAX_UPLOAD)))
        .route("/projects/{id}", get(projects::edit_page).post(projects::update))
        .route("/projects/{id}/delete", post(projects::delete))
        .route("/contacts", get(contacts::list))
        .route("/contacts/{id}", get(contacts::detail))
        .route("/contacts/{id}/read", post(contacts::mark_read))
        .route("/contacts/{id}/replied", post(contacts::mark_replied))
        .route("/contacts/{id}/delete", post(contacts::delete))
        .route_layer(middleware::from_fn_with_state(state, auth::require_admin))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Records the outcome of a write for the next page the admin sees.
async fn report<T>(session: &Session, result: Result<T, StoreError>, success: &str) -> AppResult<Option<T>> {
    match result {
        Ok(value) => {
            session::flash(session, Flash::Success(success.to_owned())).await?;
            Ok(Some(value))
        }
        Err(e) => {
            warn!("admin write failed: {e}");
            session::flash(session, Flash::Error(e.to_string())).await?;
            Ok(None)
        }
    }
}
