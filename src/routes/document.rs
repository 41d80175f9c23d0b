use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::error::{AppError, AppResult};
use crate::site::model::SiteDocument;
use crate::state::AppState;
use crate::store::{ExportEnvelope, EXPORT_FILE_NAME};
use crate::upload::Dropzone;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/site", get(site_document))
        .route("/api/export", get(export))
        .route("/api/import", post(import))
}

async fn site_document(State(state): State<AppState>) -> Json<SiteDocument> {
    Json(state.site.lock().await.document().clone())
}

/// Download the current document wrapped as `{struct, exportedAt}`.
async fn export(State(state): State<AppState>) -> AppResult<Response> {
    let document = state.site.lock().await.document().clone();
    let body = ExportEnvelope::new(document).to_pretty_json()?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME),
            ),
        ],
        body,
    )
        .into_response())
}

/// Replace the stored document with an uploaded export file.
///
/// A malformed file is rejected before anything is written.
async fn import(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<SiteDocument>> {
    let file = Dropzone::new("")
        .collect(&mut multipart)
        .await?
        .first_file()
        .ok_or_else(|| AppError::BadRequest("No file uploaded".into()))?;

    let mut site = state.site.lock().await;
    site.documents().import(&file.data)?;
    site.reload()?;
    Ok(Json(site.document().clone()))
}
