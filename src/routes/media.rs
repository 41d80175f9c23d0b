use std::sync::{Arc, Mutex};

use askama::Template;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::routes::home::Html;
use crate::routes::uploads;
use crate::site::model::MediaKind;
use crate::site::MediaSlotName;
use crate::state::AppState;
use crate::upload::{self, Dropzone, IncomingFile, ProgressIndicator};
use crate::view::MediaSlot;

#[derive(Template)]
#[template(path = "components/reel.html")]
pub struct ReelTemplate {
    pub reel: Option<MediaSlot>,
    pub edit_mode: bool,
    pub cloud_enabled: bool,
}

#[derive(Template)]
#[template(path = "components/profile.html")]
pub struct ProfileTemplate {
    pub profile: Option<MediaSlot>,
    pub edit_mode: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishQuery {
    /// Follow the transfer at `/api/uploads/{id}/events`.
    pub upload_id: Option<String>,
    /// Point this slot at the published URL on success.
    pub slot: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/media/{key}", get(serve))
        .route(
            "/api/media/demo-video",
            post(upload_demo_video).delete(remove_demo_video),
        )
        .route(
            "/api/media/profile-image",
            post(upload_profile_image).delete(remove_profile_image),
        )
        .route("/api/media/{key}/publish", post(publish))
}

fn parse_slot(name: &str) -> Option<MediaSlotName> {
    match name {
        "demo-video" => Some(MediaSlotName::DemoVideo),
        "profile-image" => Some(MediaSlotName::ProfileImage),
        _ => None,
    }
}

async fn reel_fragment(state: &AppState) -> Html<ReelTemplate> {
    state.refresh_media().await;
    let site = state.site.lock().await;
    Html(ReelTemplate {
        reel: site.projection().reel().cloned(),
        edit_mode: site.edit_mode(),
        cloud_enabled: state.cloud.is_configured(),
    })
}

async fn profile_fragment(state: &AppState) -> Html<ProfileTemplate> {
    state.refresh_media().await;
    let site = state.site.lock().await;
    Html(ProfileTemplate {
        profile: site.projection().profile().cloned(),
        edit_mode: site.edit_mode(),
    })
}

/// Stream a stored blob back with its recorded content type.
async fn serve(State(state): State<AppState>, Path(key): Path<String>) -> AppResult<Response> {
    let blobs = state.site.lock().await.blobs();
    let blob = blobs.get(&key).await?.ok_or(AppError::NotFound("Media"))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, blob.content_type),
            (header::CACHE_CONTROL, "private, max-age=3600".to_string()),
        ],
        blob.data,
    )
        .into_response())
}

/// Validate the single file of a slot upload and store it in `slot`.
async fn replace_slot_media(
    state: &AppState,
    slot: MediaSlotName,
    multipart: &mut Multipart,
) -> AppResult<String> {
    let accept = match slot {
        MediaSlotName::DemoVideo => "video/*",
        MediaSlotName::ProfileImage => "image/*",
    };
    let submission = Dropzone::new(accept).collect(multipart).await?;
    let missing = || {
        AppError::Validation(match slot.kind() {
            MediaKind::Video => "Please upload a video file.".into(),
            MediaKind::Image => "Please upload an image file.".into(),
        })
    };

    let file = submission.files.first().ok_or_else(missing)?;
    upload::validate(file, Some(slot.kind()), &state.config.uploads)
        .map_err(AppError::Validation)?;
    uploads::track(state, &submission);
    let file = submission.first_file().ok_or_else(missing)?;

    let key = state
        .site
        .lock()
        .await
        .set_media(slot, file.into_blob())
        .await?;
    tracing::info!(key = %key, "Media slot replaced");
    Ok(key)
}

async fn upload_demo_video(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Html<ReelTemplate>> {
    replace_slot_media(&state, MediaSlotName::DemoVideo, &mut multipart).await?;
    Ok(reel_fragment(&state).await)
}

async fn remove_demo_video(State(state): State<AppState>) -> AppResult<Html<ReelTemplate>> {
    state
        .site
        .lock()
        .await
        .clear_media(MediaSlotName::DemoVideo)
        .await?;
    Ok(reel_fragment(&state).await)
}

async fn upload_profile_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Html<ProfileTemplate>> {
    replace_slot_media(&state, MediaSlotName::ProfileImage, &mut multipart).await?;
    Ok(profile_fragment(&state).await)
}

async fn remove_profile_image(State(state): State<AppState>) -> AppResult<Html<ProfileTemplate>> {
    state
        .site
        .lock()
        .await
        .clear_media(MediaSlotName::ProfileImage)
        .await?;
    Ok(profile_fragment(&state).await)
}

/// Push a stored blob to the configured cloud endpoint.
///
/// The site document is only touched after a successful upload, and only
/// when `slot` names a media slot and the response carries a `url`.
async fn publish(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<PublishQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let slot = match query.slot.as_deref() {
        Some(name) => Some(
            parse_slot(name)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown media slot: {}", name)))?,
        ),
        None => None,
    };
    if !state.cloud.is_configured() {
        return Err(upload::UploadError::NotConfigured("Missing cloud endpoint or token").into());
    }

    let blobs = state.site.lock().await.blobs();
    let blob = blobs.get(&key).await?.ok_or(AppError::NotFound("Media"))?;
    let file_name = mime_guess::get_mime_extensions_str(&blob.content_type)
        .and_then(|exts| exts.first())
        .map(|ext| format!("{}.{}", key, ext))
        .unwrap_or_else(|| key.clone());
    let file = IncomingFile {
        file_name: Some(file_name),
        content_type: blob.content_type,
        data: blob.data,
    };

    let indicator = query
        .upload_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .map(|id| Arc::new(Mutex::new(state.progress.indicator(id))));
    if let Some(indicator) = &indicator {
        if let Ok(mut i) = indicator.lock() {
            i.show();
        }
    }

    let reporter = indicator.clone();
    let result = state
        .cloud
        .upload(file, move |percent| {
            if let Some(indicator) = &reporter {
                if let Ok(mut i) = indicator.lock() {
                    i.set(percent);
                }
            }
        })
        .await;

    if let Some(indicator) = &indicator {
        if let Ok(mut i) = indicator.lock() {
            i.hide();
        }
    }

    let response = result?;
    tracing::info!(key = %key, "Published media to cloud");

    if let Some(slot) = slot {
        if let Some(url) = response.get("url").and_then(|u| u.as_str()) {
            state
                .site
                .lock()
                .await
                .set_media_url(slot, url.to_string())?;
        }
    }

    Ok(Json(response))
}
