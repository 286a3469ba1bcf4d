use axum::{debug_handler, extract::{Query, State}, response::{IntoResponse, Response}};
use serde::Deserialize;

use crate::{
    filter::{filter_projects, tag_universe, TechFilter},
    include_res, res,
    store::Store,
    AppResult, AppState,
};

use super::project_card;

#[derive(Deserialize)]
pub(crate) struct ProjectsQuery {
    search: Option<String>,
    tech: Option<String>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn projects(
    Query(ProjectsQuery { search, tech }): Query<ProjectsQuery>,
    State(store): State<Store>,
) -> AppResult<Response> {
    let all = store.projects(None).await?;
    let search = search.unwrap_or_default();
    let tech = TechFilter::from_query(tech.as_deref());

    let shown = filter_projects(&all, search.trim(), &tech);
    let universe = tag_universe(&all);

    let choices = std::iter::once(("all", "All technologies"))
        .chain(universe.iter().map(|t| (t.as_str(), t.as_str())));

    let cards: String = if shown.is_empty() {
        "<p>No projects match.</p>".to_owned()
    } else {
        shown.iter().map(project_card).collect()
    };

    Ok(res::page(
        "Projects",
        &include_res!(str, "/pages/projects.html")
            .replace("{search}", &res::escape(&search))
            .replace("{tech_options}", &res::options(choices, tech.as_query()))
            .replace("{shown}", &shown.len().to_string())
            .replace("{total}", &all.len().to_string())
            .replace("{projects}", &cards),
    ).into_response())
}
