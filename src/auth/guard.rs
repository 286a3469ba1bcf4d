//! The one place an admin session is looked up.
//!
//! [`require_admin`] sits in front of every admin route. It asks the auth
//! service about the cookie's token once per request and either hands the
//! handler an [`AdminSession`] through request extensions or answers with a
//! redirect to the login page. Handlers never run, and so never render, while
//! the lookup is outstanding or after it has failed.

use axum::{
    extract::{OriginalUri, Request, State},
    http::Uri,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::warn;

use crate::session::ADMIN_TOKEN;

use super::{AdminSession, Auth};

pub const LOGIN_ROUTE: &str = "/admin/login";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Authenticated(AdminSession),
    Redirect,
}

impl GuardOutcome {
    /// An error looking the session up counts as no session.
    pub fn resolve<E: std::fmt::Display>(lookup: Result<Option<AdminSession>, E>) -> Self {
        match lookup {
            Ok(Some(session)) => GuardOutcome::Authenticated(session),
            Ok(None) => GuardOutcome::Redirect,
            Err(e) => {
                warn!("session lookup failed, treating as signed out: {e}");
                GuardOutcome::Redirect
            }
        }
    }
}

/// Resolves the session stored in the cookie, if any.
pub async fn current_session(auth: &Auth, session: &Session) -> anyhow::Result<Option<AdminSession>> {
    let Some(token) = session.get::<String>(ADMIN_TOKEN).await? else {
        return Ok(None);
    };
    Ok(auth.get_session(&token).await?)
}

/// Sends the visitor to log in, remembering the full page they asked for.
pub fn login_redirect(uri: &Uri) -> Redirect {
    let target = uri.path_and_query().map_or_else(|| uri.path(), |pq| pq.as_str());
    Redirect::to(&format!("{LOGIN_ROUTE}?return_url={}", urlencoding::encode(target)))
}

/// Needs the [`OriginalUri`] since the admin router is nested and only sees
/// the path below `/admin`.
pub async fn require_admin(
    State(auth): State<Auth>,
    OriginalUri(uri): OriginalUri,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    match GuardOutcome::resolve(current_session(&auth, &session).await) {
        GuardOutcome::Authenticated(admin) => {
            request.extensions_mut().insert(admin);
            next.run(request).await
        }
        GuardOutcome::Redirect => login_redirect(&uri).into_response(),
    }
}
