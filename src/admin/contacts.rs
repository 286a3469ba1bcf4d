use axum::{
    debug_handler,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::warn;
use uuid::Uuid;

use crate::{
    filter::{filter_contacts, StatusFilter},
    include_res,
    models::{Contact, ContactPatch},
    res::{self, escape},
    session::{take_flash, Flash},
    store::Store,
    AppResult, AppState,
};

use super::report;

#[derive(Deserialize)]
pub(crate) struct ContactsQuery {
    search: Option<String>,
    status: Option<String>,
}

fn received(contact: &Contact) -> String {
    let at = contact.created_at;
    format!("{} {:02}:{:02} UTC", at.date(), at.hour(), at.minute())
}

fn contact_row(contact: &Contact) -> String {
    include_res!(str, "/pages/admin/contact_row.html")
        .replace("{id}", &contact.id.to_string())
        .replace("{state}", contact.state().label())
        .replace("{name}", &escape(&contact.name))
        .replace("{email}", &escape(&contact.email))
        .replace("{subject}", &escape(&contact.subject))
        .replace("{received}", &received(contact))
}

#[debug_handler(state = AppState)]
pub(crate) async fn list(
    Query(ContactsQuery { search, status }): Query<ContactsQuery>,
    State(store): State<Store>,
    session: Session,
) -> AppResult<Response> {
    let all = store.contacts().await?;
    let search = search.unwrap_or_default();
    let status = StatusFilter::from_query(status.as_deref());

    let shown = filter_contacts(&all, search.trim(), status);
    let unread = all.iter().filter(|c| !c.read).count();

    let rows: String = if shown.is_empty() {
        "<tr><td colspan=\"5\">No messages.</td></tr>".to_owned()
    } else {
        shown.iter().map(contact_row).collect()
    };
    let choices = [("all", "All"), ("unread", "Unread"), ("read", "Read")];

    Ok(res::admin_page(
        "Contacts",
        take_flash(&session).await,
        &include_res!(str, "/pages/admin/contacts.html")
            .replace("{search}", &escape(&search))
            .replace("{status_options}", &res::options(choices, status.as_query()))
            .replace("{total}", &all.len().to_string())
            .replace("{unread}", &unread.to_string())
            .replace("{rows}", &rows),
    ).into_response())
}

/// Opening an unread message marks it read.
#[debug_handler(state = AppState)]
pub(crate) async fn detail(
    Path(id): Path<Uuid>,
    State(store): State<Store>,
    session: Session,
) -> AppResult<Response> {
    let Some(mut contact) = store.contact(id).await? else {
        return res::sorry("message");
    };

    let mut flash = take_flash(&session).await;
    if !contact.read {
        match store.update_contact(id, ContactPatch::MarkRead).await {
            Ok(()) => contact.apply(ContactPatch::MarkRead),
            Err(e) => {
                warn!("couldn't mark {id} read: {e}");
                flash = Some(Flash::Error(e.to_string()));
            }
        }
    }

    let replied_control = if contact.replied {
        String::new()
    } else {
        include_res!(str, "/pages/admin/mark_replied.html").replace("{id}", &id.to_string())
    };

    let body = include_res!(str, "/pages/admin/contact.html")
        .replace("{id}", &id.to_string())
        .replace("{state}", contact.state().label())
        .replace("{name}", &escape(&contact.name))
        .replace("{email}", &escape(&contact.email))
        .replace("{subject}", &escape(&contact.subject))
        .replace("{message}", &escape(&contact.message))
        .replace("{received}", &received(&contact))
        .replace("{mark_replied}", &replied_control);

    Ok(res::admin_page(&contact.subject, flash, &body).into_response())
}

#[debug_handler(state = AppState)]
pub(crate) async fn mark_read(
    Path(id): Path<Uuid>,
    State(store): State<Store>,
    session: Session,
) -> AppResult<Redirect> {
    if let Err(e) = store.update_contact(id, ContactPatch::MarkRead).await {
        warn!("couldn't mark {id} read: {e}");
        crate::session::flash(&session, Flash::Error(e.to_string())).await?;
    }
    Ok(Redirect::to(&format!("/admin/contacts/{id}")))
}

#[debug_handler(state = AppState)]
pub(crate) async fn mark_replied(
    Path(id): Path<Uuid>,
    State(store): State<Store>,
    session: Session,
) -> AppResult<Redirect> {
    report(&session, store.update_contact(id, ContactPatch::MarkReplied).await, "Marked as replied!").await?;
    Ok(Redirect::to(&format!("/admin/contacts/{id}")))
}

#[debug_handler(state = AppState)]
pub(crate) async fn delete(
    Path(id): Path<Uuid>,
    State(store): State<Store>,
    session: Session,
) -> AppResult<Redirect> {
    report(&session, store.delete_contact(id).await, "Contact deleted successfully!").await?;
    Ok(Redirect::to("/admin/contacts"))
}
