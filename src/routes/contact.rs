use axum::extract::State;
use axum::routing::post;
use axum::{Form, Json, Router};
use rusqlite::params;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub project_type: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Serialize)]
pub struct ContactReceived {
    pub id: String,
    pub message: &'static str,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/contact", post(submit))
}

async fn submit(
    State(state): State<AppState>,
    Form(form): Form<ContactForm>,
) -> AppResult<Json<ContactReceived>> {
    let name = form.name.trim();
    let email = form.email.trim();
    let project_type = form.project_type.trim();
    let message = form.message.trim();

    if name.is_empty() || email.is_empty() || project_type.is_empty() || message.is_empty() {
        return Err(AppError::Validation(
            "Please fill in all required fields.".into(),
        ));
    }
    if !email.contains('@') {
        return Err(AppError::Validation(
            "Please enter a valid email address.".into(),
        ));
    }
    if message.len() > 5000 {
        return Err(AppError::Validation(
            "Message must be 5000 characters or less.".into(),
        ));
    }

    let id = uuid::Uuid::now_v7().to_string();
    {
        let conn = state.db.get()?;
        conn.execute(
            "INSERT INTO contact_messages (id, name, email, project_type, message)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, name, email, project_type, message],
        )?;
    }
    tracing::info!(id = %id, email = %email, project_type = %project_type, "Contact message received");

    Ok(Json(ContactReceived {
        id,
        message: "Thank you for your message! I'll get back to you soon.",
    }))
}
