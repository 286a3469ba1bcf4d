use axum::{
    debug_handler,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::warn;

use crate::{include_res, res, session::ADMIN_TOKEN, AppResult, AppState};

use super::{guard::current_session, safe_return_url, Auth};

#[derive(Deserialize)]
pub(crate) struct LoginQuery {
    pub(crate) return_url: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct LoginForm {
    email: String,
    password: String,
    return_url: Option<String>,
}

fn login_form(email: &str, return_url: &str, error: Option<&str>) -> String {
    let error = error
        .map(|e| format!("<p class=\"error\">{}</p>", res::escape(e)))
        .unwrap_or_default();
    include_res!(str, "/pages/login.html")
        .replace("{error}", &error)
        .replace("{email}", &res::escape(email))
        .replace("{return_url}", &res::escape(return_url))
}

#[debug_handler(state = AppState)]
pub(crate) async fn login_page(
    Query(LoginQuery { return_url }): Query<LoginQuery>,
    State(auth): State<Auth>,
    session: Session,
) -> AppResult<Response> {
    let return_url = safe_return_url(return_url.as_deref());

    // an unreadable session is the same as none here
    if let Ok(Some(_)) = current_session(&auth, &session).await {
        return Ok(Redirect::to(return_url).into_response());
    }

    Ok(res::page("Admin login", &login_form("", return_url, None)).into_response())
}

#[debug_handler(state = AppState)]
pub(crate) async fn login(
    State(auth): State<Auth>,
    session: Session,
    Form(LoginForm { email, password, return_url }): Form<LoginForm>,
) -> AppResult<Response> {
    let return_url = safe_return_url(return_url.as_deref());

    match auth.sign_in(email.trim(), &password).await {
        Ok(admin) => {
            session.cycle_id().await?;
            session.insert(ADMIN_TOKEN, admin.token).await?;
            Ok(Redirect::to(return_url).into_response())
        }
        Err(e) => {
            warn!("sign in failed for {email}: {e}");
            Ok((
                StatusCode::UNAUTHORIZED,
                res::page("Admin login", &login_form(&email, return_url, Some(&e.to_string()))),
            ).into_response())
        }
    }
}
