use axum::{debug_handler, extract::State, response::Redirect};
use tower_sessions::Session;
use tracing::warn;

use crate::{AppResult, AppState};

use super::{guard::{current_session, LOGIN_ROUTE}, Auth};

#[debug_handler(state = AppState)]
pub(crate) async fn logout(
    State(auth): State<Auth>,
    session: Session,
) -> AppResult<Redirect> {
    if let Ok(Some(admin)) = current_session(&auth, &session).await {
        if let Err(e) = auth.sign_out(&admin).await {
            warn!("sign out failed for {}: {e}", admin.email);
        }
    }
    session.flush().await?;
    Ok(Redirect::to(LOGIN_ROUTE))
}
