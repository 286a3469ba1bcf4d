use axum::{debug_handler, extract::State, response::{IntoResponse, Response}};

use crate::{include_res, res, store::Store, AppResult, AppState};

use super::{display_name, project_card, social_links};

const FEATURED_PROJECTS: u32 = 3;
const FEATURED_SKILLS: usize = 6;

#[debug_handler(state = AppState)]
pub(crate) async fn home(
    State(store): State<Store>,
) -> AppResult<Response> {
    let profile = store.profile().await?;
    let featured = store.projects(Some(FEATURED_PROJECTS)).await?;

    let (bio, location, skills, socials) = match &profile {
        Some(p) => (
            p.bio.as_str(),
            p.location.as_str(),
            res::tag_list(&p.skills[..p.skills.len().min(FEATURED_SKILLS)]),
            social_links(&p.socials),
        ),
        None => ("", "", String::new(), String::new()),
    };

    let cards: String = featured.iter().map(project_card).collect();
    let name = display_name(profile.as_ref());

    Ok(res::page(
        &name,
        &include_res!(str, "/pages/home.html")
            .replace("{name}", &res::escape(&name))
            .replace("{location}", &res::escape(location))
            .replace("{bio}", &res::escape(bio))
            .replace("{skills}", &skills)
            .replace("{socials}", &socials)
            .replace("{projects}", &cards),
    ).into_response())
}
