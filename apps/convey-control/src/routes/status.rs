use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::{longpoll::parse_timeout, state::AppState};

#[derive(Debug, Deserialize)]
pub struct LongPollQuery {
    timeout: Option<String>,
}

pub async fn status(State(state): State<AppState>) -> String {
    state.status()
}

/// GET /longpoll?timeout=<ms> - Block until the status changes or the timeout passes
pub async fn long_poll(
    State(state): State<AppState>,
    Query(query): Query<LongPollQuery>,
) -> String {
    let timeout = parse_timeout(query.timeout.as_deref());
    state.wait_for_status(timeout).await
}

/// GET /results - Latest run result, `null` before the first run
pub async fn results(State(state): State<AppState>) -> impl IntoResponse {
    (
        [
            (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
            (header::PRAGMA, "no-cache"),
            (header::EXPIRES, "0"),
        ],
        Json(state.results()),
    )
}
