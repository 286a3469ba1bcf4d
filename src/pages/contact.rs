use axum::{
    debug_handler,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Form,
};
use tracing::warn;

use crate::{forms::ContactForm, include_res, res, store::Store, AppResult, AppState};

const SENT: &str = "Message sent successfully!";
const SEND_FAILED: &str = "Failed to send message. Please try again.";

fn contact_form(form: &ContactForm, notice: Option<(&str, &str)>) -> String {
    let notice = notice
        .map(|(class, text)| format!("<p class=\"{class}\">{}</p>", res::escape(text)))
        .unwrap_or_default();

    include_res!(str, "/pages/contact.html")
        .replace("{notice}", &notice)
        .replace("{name}", &res::escape(&form.name))
        .replace("{email}", &res::escape(&form.email))
        .replace("{subject}", &res::escape(&form.subject))
        .replace("{message}", &res::escape(&form.message))
}

#[debug_handler]
pub(crate) async fn contact_page() -> Response {
    res::page("Contact", &contact_form(&ContactForm::default(), None)).into_response()
}

#[debug_handler(state = AppState)]
pub(crate) async fn send(
    State(store): State<Store>,
    Form(form): Form<ContactForm>,
) -> AppResult<Response> {
    let draft = match form.validate() {
        Ok(draft) => draft,
        Err(e) => {
            let body = contact_form(&form, Some(("error", &e.to_string())));
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, res::page("Contact", &body)).into_response());
        }
    };

    match store.insert_contact(draft).await {
        Ok(_) => {
            let body = contact_form(&ContactForm::default(), Some(("success", SENT)));
            Ok(res::page("Contact", &body).into_response())
        }
        Err(e) => {
            warn!("couldn't store contact from {}: {e}", form.email);
            let body = contact_form(&form, Some(("error", SEND_FAILED)));
            Ok((StatusCode::BAD_GATEWAY, res::page("Contact", &body)).into_response())
        }
    }
}
