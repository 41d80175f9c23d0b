use askama::Template;
use axum::extract::{Multipart, Path, Query, State};
use axum::routing::{get, post, put};
use axum::Router;

use crate::error::{AppError, AppResult};
use crate::routes::home::Html;
use crate::routes::projects::ConfirmQuery;
use crate::routes::uploads;
use crate::site::drafts::CreativeDraft;
use crate::state::AppState;
use crate::upload::{self, Dropzone, Submission};
use crate::view::CreativeNode;

#[derive(Template)]
#[template(path = "components/creative.html")]
pub struct CreativeTemplate {
    pub creative: Vec<CreativeNode>,
    pub edit_mode: bool,
}

#[derive(Template)]
#[template(path = "components/creative_form.html")]
pub struct CreativeFormTemplate {
    pub id: Option<String>,
    pub draft: CreativeDraft,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/creative", post(create_post))
        .route("/api/creative/new", get(new_form))
        .route("/api/creative/{id}", put(update_post).delete(delete_post))
        .route("/api/creative/{id}/edit", get(edit_form))
}

pub async fn fragment(state: &AppState) -> Html<CreativeTemplate> {
    state.refresh_media().await;
    let site = state.site.lock().await;
    Html(CreativeTemplate {
        creative: site.projection().creative().to_vec(),
        edit_mode: site.edit_mode(),
    })
}

async fn read_submission(state: &AppState, multipart: &mut Multipart) -> AppResult<Submission> {
    let submission = Dropzone::new("image/*,video/*").collect(multipart).await?;
    for file in &submission.files {
        upload::validate(file, None, &state.config.uploads).map_err(AppError::Validation)?;
    }
    uploads::track(state, &submission);
    Ok(submission)
}

fn draft_of(submission: &Submission) -> CreativeDraft {
    CreativeDraft {
        caption: submission.field("caption").unwrap_or_default().to_string(),
    }
}

async fn new_form() -> Html<CreativeFormTemplate> {
    Html(CreativeFormTemplate {
        id: None,
        draft: CreativeDraft::default(),
    })
}

async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Html<CreativeFormTemplate>> {
    let site = state.site.lock().await;
    let post = site
        .document()
        .creative
        .iter()
        .find(|p| p.id == id)
        .ok_or(AppError::NotFound("Creative post"))?;
    Ok(Html(CreativeFormTemplate {
        draft: CreativeDraft::from_post(post),
        id: Some(id),
    }))
}

async fn create_post(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Html<CreativeTemplate>> {
    let submission = read_submission(&state, &mut multipart).await?;
    let draft = draft_of(&submission);
    let file = submission
        .first_file()
        .ok_or_else(|| AppError::Validation("Please upload an image or video file.".into()))?;

    state
        .site
        .lock()
        .await
        .create_creative(file.into_blob(), draft)
        .await?;
    Ok(fragment(&state).await)
}

async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> AppResult<Html<CreativeTemplate>> {
    let submission = read_submission(&state, &mut multipart).await?;
    let draft = draft_of(&submission);
    let replacement = submission.first_file().map(|f| f.into_blob());

    state
        .site
        .lock()
        .await
        .update_creative(&id, draft, replacement)
        .await?;
    Ok(fragment(&state).await)
}

async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ConfirmQuery>,
) -> AppResult<Html<CreativeTemplate>> {
    if !query.confirm {
        return Err(AppError::BadRequest("Deletion must be confirmed".into()));
    }
    state.site.lock().await.delete_creative(&id).await?;
    Ok(fragment(&state).await)
}
