use std::convert::Infallible;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use axum::Router;
use futures::future;
use futures::stream::{Stream, StreamExt};
use tokio_stream::wrappers::WatchStream;

use crate::state::AppState;
use crate::upload::{simulate_progress, ProgressState, Submission, Subscription};

/// Form field a dropzone uses to name its progress channel.
pub const UPLOAD_ID_FIELD: &str = "uploadId";

pub fn router() -> Router<AppState> {
    Router::new().route("/api/uploads/{id}/events", get(progress_events))
}

/// Start simulated progress for a submission that asked to be tracked.
///
/// Call only once the submission passed validation; a submission without
/// files is never tracked.
pub fn track(state: &AppState, submission: &Submission) {
    let Some(id) = submission.field(UPLOAD_ID_FIELD).filter(|id| !id.is_empty()) else {
        return;
    };
    if submission.files.is_empty() {
        return;
    }
    let total_bytes = submission.total_bytes();
    let mut indicator = state.progress.indicator(id);
    tracing::debug!(upload = %id, total_bytes, "Tracking upload progress");
    tokio::spawn(async move {
        simulate_progress(total_bytes, &mut indicator).await;
    });
}

/// Server-sent `progress` events for one upload, ending after it is done.
///
/// The subscription rides along with the stream, so a client that
/// disconnects releases the entry.
async fn progress_events(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (receiver, subscription) = state.progress.subscribe(&id);
    let updates = WatchStream::new(receiver);

    let stream = updates
        .scan(
            (false, subscription),
            |(finished, _subscription): &mut (bool, Subscription), progress: ProgressState| {
                if *finished {
                    return future::ready(None);
                }
                *finished = progress.done;
                future::ready(Some(progress))
            },
        )
        .map(|progress| {
            let event = Event::default()
                .event("progress")
                .json_data(progress)
                .unwrap_or_else(|_| Event::default().comment("unserializable"));
            Ok(event)
        });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
