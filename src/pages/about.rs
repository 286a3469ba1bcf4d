use axum::{debug_handler, extract::State, response::{IntoResponse, Response}};

use crate::{filter::categorize_skills, include_res, res, store::Store, AppResult, AppState};

use super::{display_name, social_links};

fn skills_section(skills: &[String]) -> String {
    if skills.is_empty() {
        return String::new();
    }

    let buckets = categorize_skills(skills);
    if buckets.is_empty() {
        return format!("<ul class=\"skills\">{}</ul>", res::tag_list(skills));
    }

    buckets.iter()
        .map(|(category, skills)| {
            format!(
                "<section><h3>{}</h3><ul class=\"skills\">{}</ul></section>",
                category.label(),
                res::tag_list(skills)
            )
        })
        .collect()
}

#[debug_handler(state = AppState)]
pub(crate) async fn about(
    State(store): State<Store>,
) -> AppResult<Response> {
    let profile = store.profile().await?;
    let name = display_name(profile.as_ref());

    let body = match &profile {
        Some(p) => include_res!(str, "/pages/about.html")
            .replace("{name}", &res::escape(&p.name))
            .replace("{location}", &res::escape(&p.location))
            .replace("{bio}", &res::markdown(&p.bio))
            .replace("{socials}", &social_links(&p.socials))
            .replace("{skills}", &skills_section(&p.skills)),
        None => "<p>Nothing here yet.</p>".to_owned(),
    };

    Ok(res::page(&format!("About {name}"), &body).into_response())
}
