use axum::{debug_handler, extract::State, response::{IntoResponse, Response}, Extension};
use tower_sessions::Session;

use crate::{auth::AdminSession, include_res, res, session::take_flash, store::Store, AppResult, AppState};

#[debug_handler(state = AppState)]
pub(crate) async fn dashboard(
    State(store): State<Store>,
    Extension(admin): Extension<AdminSession>,
    session: Session,
) -> AppResult<Response> {
    let projects = store.projects(None).await?;
    let contacts = store.contacts().await?;
    let unread = contacts.iter().filter(|c| !c.read).count();

    Ok(res::admin_page(
        "Dashboard",
        take_flash(&session).await,
        &include_res!(str, "/pages/admin/dashboard.html")
            .replace("{email}", &res::escape(&admin.email))
            .replace("{projects}", &projects.len().to_string())
            .replace("{contacts}", &contacts.len().to_string())
            .replace("{unread}", &unread.to_string()),
    ).into_response())
}
