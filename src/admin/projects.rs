use axum::{
    debug_handler,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use serde_json::json;
use tower_sessions::Session;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    forms::{image_extension, join_tags, ProjectForm},
    include_res,
    models::Project,
    res::{self, escape},
    session::{take_flash, Flash},
    store::{Objects, Store, PROJECT_IMAGES},
    AppResult, AppState,
};

use super::report;

pub(crate) const MAX_UPLOAD: usize = 8 * 1024 * 1024;

fn project_row(project: &Project) -> String {
    include_res!(str, "/pages/admin/project_row.html")
        .replace("{id}", &project.id.to_string())
        .replace("{title}", &escape(&project.title))
        .replace("{stack}", &escape(&join_tags(&project.stack)))
}

fn project_form(action: &str, heading: &str, form: &ProjectForm) -> String {
    include_res!(str, "/pages/admin/project_form.html")
        .replace("{action}", action)
        .replace("{heading}", heading)
        .replace("{title}", &escape(&form.title))
        .replace("{description}", &escape(&form.description))
        .replace("{stack}", &escape(&form.stack))
        .replace("{github}", &escape(&form.github))
        .replace("{live}", &escape(&form.live))
        .replace("{image}", &escape(&form.image))
}

fn form_of(project: Project) -> ProjectForm {
    ProjectForm {
        title: project.title,
        description: project.description,
        stack: join_tags(&project.stack),
        github: project.github.unwrap_or_default(),
        live: project.live.unwrap_or_default(),
        image: project.image.unwrap_or_default(),
    }
}

fn rejected_form(action: &str, heading: &str, form: &ProjectForm, error: String) -> Response {
    let page = res::admin_page(heading, Some(Flash::Error(error)), &project_form(action, heading, form));
    (StatusCode::UNPROCESSABLE_ENTITY, page).into_response()
}

#[debug_handler(state = AppState)]
pub(crate) async fn list(
    State(store): State<Store>,
    session: Session,
) -> AppResult<Response> {
    let projects = store.projects(None).await?;
    let rows: String = if projects.is_empty() {
        "<tr><td colspan=\"3\">No projects yet.</td></tr>".to_owned()
    } else {
        projects.iter().map(project_row).collect()
    };

    Ok(res::admin_page(
        "Projects",
        take_flash(&session).await,
        &include_res!(str, "/pages/admin/projects.html").replace("{rows}", &rows),
    ).into_response())
}

#[debug_handler]
pub(crate) async fn new_page(session: Session) -> Response {
    let body = project_form("/admin/projects/new", "New project", &ProjectForm::default());
    res::admin_page("New project", take_flash(&session).await, &body).into_response()
}

#[debug_handler(state = AppState)]
pub(crate) async fn create(
    State(store): State<Store>,
    session: Session,
    Form(form): Form<ProjectForm>,
) -> AppResult<Response> {
    let draft = match form.clone().into_draft() {
        Ok(draft) => draft,
        Err(e) => return Ok(rejected_form("/admin/projects/new", "New project", &form, e.to_string())),
    };

    report(&session, store.insert_project(draft).await, "Project added successfully!").await?;
    Ok(Redirect::to("/admin/projects").into_response())
}

#[debug_handler(state = AppState)]
pub(crate) async fn edit_page(
    Path(id): Path<Uuid>,
    State(store): State<Store>,
    session: Session,
) -> AppResult<Response> {
    let Some(project) = store.project(id).await? else {
        return res::sorry("project");
    };

    let body = project_form(&format!("/admin/projects/{id}"), "Edit project", &form_of(project));
    Ok(res::admin_page("Edit project", take_flash(&session).await, &body).into_response())
}

#[debug_handler(state = AppState)]
pub(crate) async fn update(
    Path(id): Path<Uuid>,
    State(store): State<Store>,
    session: Session,
    Form(form): Form<ProjectForm>,
) -> AppResult<Response> {
    let action = format!("/admin/projects/{id}");
    let draft = match form.clone().into_draft() {
        Ok(draft) => draft,
        Err(e) => return Ok(rejected_form(&action, "Edit project", &form, e.to_string())),
    };

    report(&session, store.update_project(id, draft).await, "Project updated successfully!").await?;
    Ok(Redirect::to("/admin/projects").into_response())
}

#[debug_handler(state = AppState)]
pub(crate) async fn delete(
    Path(id): Path<Uuid>,
    State(store): State<Store>,
    session: Session,
) -> AppResult<Redirect> {
    report(&session, store.delete_project(id).await, "Project deleted successfully!").await?;
    Ok(Redirect::to("/admin/projects"))
}

/// Stores the `file` field of a multipart body and answers with its public
/// URL, for the project form's image field.
#[debug_handler(state = AppState)]
pub(crate) async fn upload(
    State(objects): State<Objects>,
    mut multipart: Multipart,
) -> AppResult<Response> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let ext = match image_extension(field.file_name(), field.content_type()) {
            Ok(ext) => ext,
            Err(e) => {
                return Ok((StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))).into_response());
            }
        };
        let path = format!("{}.{ext}", Uuid::now_v7().simple());
        let bytes = field.bytes().await?;

        if let Err(e) = objects.upload(PROJECT_IMAGES, &path, bytes.to_vec()).await {
            warn!("image upload failed: {e}");
            return Ok((StatusCode::BAD_GATEWAY, Json(json!({ "error": e.to_string() }))).into_response());
        }

        let url = objects.public_url(PROJECT_IMAGES, &path);
        info!("uploaded project image {url}");
        return Ok(Json(json!({ "url": url })).into_response());
    }

    Ok((StatusCode::BAD_REQUEST, Json(json!({ "error": "no file field" }))).into_response())
}
