use askama::Template;
use axum::extract::{Path, State};
use axum::routing::put;
use axum::{Form, Router};
use serde::Deserialize;

use crate::error::AppResult;
use crate::routes::home::Html;
use crate::state::AppState;
use crate::view::SkillGroup;

#[derive(Template)]
#[template(path = "components/skills.html")]
pub struct SkillsTemplate {
    pub skills: Vec<SkillGroup>,
    pub edit_mode: bool,
}

#[derive(Deserialize)]
pub struct SkillsForm {
    /// Comma separated.
    #[serde(default)]
    pub skills: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/skills/{category}", put(set_skills).delete(remove_category))
}

async fn fragment(state: &AppState) -> Html<SkillsTemplate> {
    let site = state.site.lock().await;
    Html(SkillsTemplate {
        skills: site.projection().skills().to_vec(),
        edit_mode: site.edit_mode(),
    })
}

async fn set_skills(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Form(form): Form<SkillsForm>,
) -> AppResult<Html<SkillsTemplate>> {
    state.site.lock().await.set_skills(&category, &form.skills)?;
    Ok(fragment(&state).await)
}

async fn remove_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> AppResult<Html<SkillsTemplate>> {
    state.site.lock().await.remove_skill_category(&category)?;
    Ok(fragment(&state).await)
}
