use axum::{
    debug_handler,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use tower_sessions::Session;

use crate::{
    forms::{join_tags, ProfileForm},
    include_res,
    res,
    session::{take_flash, Flash},
    store::{save_profile, Store},
    AppResult, AppState,
};

use super::report;

const SAVED: &str = "Profile updated successfully! Your changes have been saved.";

fn profile_form(form: &ProfileForm) -> String {
    include_res!(str, "/pages/admin/profile.html")
        .replace("{name}", &res::escape(&form.name))
        .replace("{location}", &res::escape(&form.location))
        .replace("{bio}", &res::escape(&form.bio))
        .replace("{skills}", &res::escape(&form.skills))
        .replace("{github}", &res::escape(&form.github))
        .replace("{twitter}", &res::escape(&form.twitter))
        .replace("{email}", &res::escape(&form.email))
}

#[debug_handler(state = AppState)]
pub(crate) async fn profile_page(
    State(store): State<Store>,
    session: Session,
) -> AppResult<Response> {
    let form = match store.profile().await? {
        Some(p) => ProfileForm {
            name: p.name,
            bio: p.bio,
            location: p.location,
            skills: join_tags(&p.skills),
            github: p.socials.github.unwrap_or_default(),
            twitter: p.socials.twitter.unwrap_or_default(),
            email: p.socials.email.unwrap_or_default(),
        },
        None => ProfileForm::default(),
    };

    Ok(res::admin_page("Profile", take_flash(&session).await, &profile_form(&form)).into_response())
}

#[debug_handler(state = AppState)]
pub(crate) async fn save(
    State(store): State<Store>,
    session: Session,
    Form(form): Form<ProfileForm>,
) -> AppResult<Response> {
    let draft = match form.clone().into_draft() {
        Ok(draft) => draft,
        Err(e) => {
            let page = res::admin_page("Profile", Some(Flash::Error(e.to_string())), &profile_form(&form));
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    report(&session, save_profile(store.as_ref(), draft).await, SAVED).await?;
    Ok(Redirect::to("/admin/profile").into_response())
}
