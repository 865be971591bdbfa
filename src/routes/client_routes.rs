//! The salon manager's clients roster.

use std::convert::Infallible;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::{routing::get, Json, Router};
use futures::{Stream, StreamExt};
use tracing::{debug, warn};

use crate::guard::{Guarded, ManagerOnly};
use crate::metrics::MetricsRecorder;
use crate::models::Session;
use crate::roster::RosterView;
use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/clients", get(clients))
        .route("/clients/live", get(live_clients))
}

fn salon_of(session: &Session) -> Result<String, HTTPError> {
    session.salon_id().map(str::to_string).ok_or_else(|| {
        HTTPError::new(
            StatusCode::BAD_REQUEST,
            "This manager account is not linked to a salon",
        )
    })
}

async fn clients(
    guarded: Guarded<ManagerOnly>,
    State(state): State<AppState>,
) -> Result<Json<RosterView>, HTTPError> {
    let salon_id = salon_of(&guarded.session)?;
    let roster = state.roster.snapshot(&salon_id).await?;
    Ok(Json(roster))
}

/// Pushes a `roster` event after every change. The stream ends when the
/// manager it was opened for is no longer signed in.
async fn live_clients(
    guarded: Guarded<ManagerOnly>,
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, HTTPError> {
    let salon_id = salon_of(&guarded.session)?;
    let session_id = guarded.session.id.clone();
    state.metrics.record_roster_stream();
    debug!("Opening live roster for salon '{}'", salon_id);

    let mut auth = state.auth.subscribe();
    let signed_out = async move {
        let _ = auth
            .wait_for(|s| s.session.as_ref().map(|s| s.id.as_str()) != Some(session_id.as_str()))
            .await;
    };

    let events = state
        .roster
        .live(&salon_id)
        .take_until(signed_out)
        .filter_map(|view| async move {
            match Event::default().event("roster").json_data(&view) {
                Ok(event) => Some(Ok(event)),
                Err(e) => {
                    warn!("Could not encode roster event: {}", e);
                    None
                }
            }
        });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
