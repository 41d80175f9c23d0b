pub mod assets;
pub mod chrome;
pub mod contact;
pub mod creative;
pub mod document;
pub mod home;
pub mod media;
pub mod projects;
pub mod skills;
pub mod uploads;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// The full application router.
pub fn app(state: AppState) -> Router {
    let body_limit = state.config.uploads.body_limit();

    Router::new()
        .route("/", get(home::index))
        .route("/assets/{*path}", get(assets::serve))
        .merge(media::router())
        .merge(document::router())
        .merge(chrome::router())
        .merge(projects::router())
        .merge(creative::router())
        .merge(skills::router())
        .merge(contact::router())
        .merge(uploads::router())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
