use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditModeResponse {
    pub edit_mode: bool,
}

#[derive(Deserialize)]
pub struct FieldCommit {
    pub path: String,
    pub value: String,
}

#[derive(Serialize)]
pub struct FieldCommitted {
    pub path: String,
    pub value: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/edit-mode", post(toggle_edit_mode))
        .route("/api/fields", post(commit_field))
}

async fn toggle_edit_mode(State(state): State<AppState>) -> Json<EditModeResponse> {
    let edit_mode = state.site.lock().await.toggle_edit_mode();
    Json(EditModeResponse { edit_mode })
}

/// Commit the text of one editable element.
async fn commit_field(
    State(state): State<AppState>,
    Json(commit): Json<FieldCommit>,
) -> AppResult<Json<FieldCommitted>> {
    let value = state
        .site
        .lock()
        .await
        .commit_field(&commit.path, &commit.value)?;
    Ok(Json(FieldCommitted {
        path: commit.path,
        value,
    }))
}
