mod about;
mod contact;
mod home;
mod projects;

use axum::{routing::get, Router};

use crate::{
    include_res,
    models::{Profile, Project, Socials},
    res::{self, escape},
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/about", get(about::about))
        .route("/projects", get(projects::projects))
        .route("/contact", get(contact::contact_page).post(contact::send))
}

pub(crate) fn project_card(project: &Project) -> String {
    let image = project.image.as_deref()
        .and_then(res::safe_url)
        .map(|src| format!("<img src=\"{}\" alt=\"{}\">", escape(src), escape(&project.title)))
        .unwrap_or_default();

    include_res!(str, "/pages/project_card.html")
        .replace("{image}", &image)
        .replace("{title}", &escape(&project.title))
        .replace("{description}", &escape(&project.description))
        .replace("{stack}", &res::tag_list(&project.stack))
        .replace("{github}", &res::link(project.github.as_deref(), "Code"))
        .replace("{live}", &res::link(project.live.as_deref(), "Live"))
}

pub(crate) fn social_links(socials: &Socials) -> String {
    let email = socials.email.as_ref().map(|e| {
        if e.contains(':') { e.clone() } else { format!("mailto:{e}") }
    });
    [
        res::link(socials.github.as_deref(), "GitHub"),
        res::link(socials.twitter.as_deref(), "Twitter"),
        res::link(email.as_deref(), "Email"),
    ].join(" ")
}

pub(crate) fn display_name(profile: Option<&Profile>) -> String {
    profile.map_or_else(|| "Portfolio".to_owned(), |p| p.name.clone())
}
