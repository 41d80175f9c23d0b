use askama::Template;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::error::AppResult;
use crate::state::AppState;
use crate::view::{BoundField, CreativeNode, MediaSlot, ProjectNode, SkillGroup};

pub struct NavLink {
    pub id: &'static str,
    pub label: &'static str,
}

/// Section anchors shown in the header, in page order.
pub fn nav_links() -> Vec<NavLink> {
    [
        ("about", "About"),
        ("reel", "Demo Reel"),
        ("projects", "Projects"),
        ("creative", "Creative"),
        ("skills", "Skills"),
        ("contact", "Contact"),
    ]
    .into_iter()
    .map(|(id, label)| NavLink { id, label })
    .collect()
}

#[derive(Template)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub nav: Vec<NavLink>,
    pub edit_mode: bool,
    pub cloud_enabled: bool,
    pub fields: Vec<BoundField>,
    pub reel: Option<MediaSlot>,
    pub profile: Option<MediaSlot>,
    pub projects: Vec<ProjectNode>,
    pub creative: Vec<CreativeNode>,
    pub skills: Vec<SkillGroup>,
}

impl HomeTemplate {
    fn field(&self, path: &str) -> &str {
        self.fields
            .iter()
            .find(|f| f.path == path)
            .map(|f| f.text.as_str())
            .unwrap_or_default()
    }
}

/// Wrapper to render askama templates as axum responses
pub struct Html<T: Template>(pub T);

impl<T: Template> IntoResponse for Html<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("Template render error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
            }
        }
    }
}

pub async fn index(State(state): State<AppState>) -> AppResult<Html<HomeTemplate>> {
    state.refresh_media().await;

    let site = state.site.lock().await;
    let view = site.projection();
    Ok(Html(HomeTemplate {
        nav: nav_links(),
        edit_mode: site.edit_mode(),
        cloud_enabled: state.cloud.is_configured(),
        fields: view.fields().to_vec(),
        reel: view.reel().cloned(),
        profile: view.profile().cloned(),
        projects: view.projects().to_vec(),
        creative: view.creative().to_vec(),
        skills: view.skills().to_vec(),
    }))
}
