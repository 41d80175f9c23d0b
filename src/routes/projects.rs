use askama::Template;
use axum::extract::{Multipart, Path, Query, State};
use axum::routing::{delete, get, post, put};
use axum::{Form, Json, Router};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::routes::home::Html;
use crate::routes::uploads;
use crate::site::drafts::ProjectDraft;
use crate::site::model::MediaKind;
use crate::state::AppState;
use crate::upload::{self, Dropzone};
use crate::view::{ProjectNode, Span};

// --- Templates ---

#[derive(Template)]
#[template(path = "components/projects.html")]
pub struct ProjectsTemplate {
    pub projects: Vec<ProjectNode>,
    pub edit_mode: bool,
}

#[derive(Template)]
#[template(path = "components/project_detail.html")]
pub struct ProjectDetailTemplate {
    pub project: ProjectNode,
    pub edit_mode: bool,
}

#[derive(Template)]
#[template(path = "components/project_form.html")]
pub struct ProjectFormTemplate {
    pub id: Option<String>,
    pub draft: ProjectDraft,
}

// --- Forms ---

#[derive(Deserialize)]
pub struct ConfirmQuery {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Deserialize)]
pub struct OrderForm {
    pub ids: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropForm {
    pub pointer_y: f64,
    pub spans: Vec<Span>,
}

// --- Router ---

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/projects", post(create_project))
        .route("/api/projects/new", get(new_form))
        .route("/api/projects/order", put(reorder))
        .route(
            "/api/projects/{id}",
            get(detail).put(update_project).delete(delete_project),
        )
        .route("/api/projects/{id}/edit", get(edit_form))
        .route("/api/projects/{id}/drop", post(drop_project))
        .route("/api/projects/{id}/cover", post(upload_cover))
        .route("/api/projects/{id}/gallery", post(upload_gallery))
        .route("/api/projects/{id}/gallery/{key}", delete(remove_gallery_image))
}

/// Re-render the project grid after resolving its media.
pub async fn fragment(state: &AppState) -> Html<ProjectsTemplate> {
    state.refresh_media().await;
    let site = state.site.lock().await;
    Html(ProjectsTemplate {
        projects: site.projection().projects().to_vec(),
        edit_mode: site.edit_mode(),
    })
}

// --- Handlers ---

async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Html<ProjectDetailTemplate>> {
    state.refresh_media().await;
    let site = state.site.lock().await;
    let project = site
        .projection()
        .project(&id)
        .cloned()
        .ok_or(AppError::NotFound("Project"))?;
    Ok(Html(ProjectDetailTemplate {
        project,
        edit_mode: site.edit_mode(),
    }))
}

async fn new_form() -> Html<ProjectFormTemplate> {
    Html(ProjectFormTemplate {
        id: None,
        draft: ProjectDraft::blank(),
    })
}

async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Html<ProjectFormTemplate>> {
    let site = state.site.lock().await;
    let draft = ProjectDraft::from_project(site.project(&id)?);
    Ok(Html(ProjectFormTemplate { id: Some(id), draft }))
}

async fn create_project(
    State(state): State<AppState>,
    Form(draft): Form<ProjectDraft>,
) -> AppResult<Html<ProjectsTemplate>> {
    state.site.lock().await.create_project(draft)?;
    Ok(fragment(&state).await)
}

async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(draft): Form<ProjectDraft>,
) -> AppResult<Html<ProjectsTemplate>> {
    state.site.lock().await.update_project(&id, draft)?;
    Ok(fragment(&state).await)
}

async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ConfirmQuery>,
) -> AppResult<Html<ProjectsTemplate>> {
    if !query.confirm {
        return Err(AppError::BadRequest("Deletion must be confirmed".into()));
    }
    state.site.lock().await.delete_project(&id).await?;
    Ok(fragment(&state).await)
}

async fn reorder(
    State(state): State<AppState>,
    Json(form): Json<OrderForm>,
) -> AppResult<Html<ProjectsTemplate>> {
    state.site.lock().await.reorder_projects(&form.ids)?;
    Ok(fragment(&state).await)
}

async fn drop_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(form): Json<DropForm>,
) -> AppResult<Html<ProjectsTemplate>> {
    state
        .site
        .lock()
        .await
        .drop_project(&id, form.pointer_y, &form.spans)?;
    Ok(fragment(&state).await)
}

async fn upload_cover(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> AppResult<Html<ProjectsTemplate>> {
    let submission = Dropzone::new("image/*").collect(&mut multipart).await?;
    let missing = || AppError::Validation("Please upload an image file.".into());
    let file = submission.files.first().ok_or_else(missing)?;
    upload::validate(file, Some(MediaKind::Image), &state.config.uploads)
        .map_err(AppError::Validation)?;
    uploads::track(&state, &submission);
    let file = submission.first_file().ok_or_else(missing)?;

    state
        .site
        .lock()
        .await
        .set_project_cover(&id, file.into_blob())
        .await?;
    Ok(fragment(&state).await)
}

async fn upload_gallery(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> AppResult<Html<ProjectsTemplate>> {
    let submission = Dropzone::new("image/*")
        .multiple()
        .collect(&mut multipart)
        .await?;
    if submission.files.is_empty() {
        return Err(AppError::Validation("Please upload an image file.".into()));
    }
    for file in &submission.files {
        upload::validate(file, Some(MediaKind::Image), &state.config.uploads)
            .map_err(AppError::Validation)?;
    }
    uploads::track(&state, &submission);

    let blobs = submission
        .files
        .into_iter()
        .map(|f| f.into_blob())
        .collect();
    state
        .site
        .lock()
        .await
        .add_gallery_images(&id, blobs)
        .await?;
    Ok(fragment(&state).await)
}

async fn remove_gallery_image(
    State(state): State<AppState>,
    Path((id, key)): Path<(String, String)>,
) -> AppResult<Html<ProjectsTemplate>> {
    state
        .site
        .lock()
        .await
        .remove_gallery_image(&id, &key)
        .await?;
    Ok(fragment(&state).await)
}
