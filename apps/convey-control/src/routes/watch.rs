use axum::{
    extract::{Query, State},
    http::StatusCode,
};

use super::ApiError;
use crate::state::AppState;

type QueryPairs = Query<Vec<(String, String)>>;

/// First value for `key`, or the 400 the client gets when it is absent.
fn required<'a>(pairs: &'a [(String, String)], key: &str) -> Result<&'a str, ApiError> {
    pairs
        .iter()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.as_str())
        .ok_or_else(|| {
            ApiError::BadRequest(format!("No '{key}' query string parameter included!"))
        })
}

/// GET /watch - Current watch root
pub async fn current_root(State(state): State<AppState>) -> String {
    state.current_root().to_string_lossy().into_owned()
}

/// POST /watch?root= - Move the watcher to another directory
pub async fn adjust_root(
    State(state): State<AppState>,
    Query(pairs): QueryPairs,
) -> Result<StatusCode, ApiError> {
    let root = required(&pairs, "root")?;
    if root.is_empty() {
        return Err(ApiError::BadRequest(
            "You must provide a non-blank path.".to_string(),
        ));
    }
    state.adjust_root(root).await?;
    Ok(StatusCode::OK)
}

/// /ignore?paths= - Stop watching the given paths
pub async fn ignore(
    State(state): State<AppState>,
    Query(pairs): QueryPairs,
) -> Result<StatusCode, ApiError> {
    state.ignore(required(&pairs, "paths")?).await?;
    Ok(StatusCode::OK)
}

/// /reinstate?paths= - Resume watching the given paths
pub async fn reinstate(
    State(state): State<AppState>,
    Query(pairs): QueryPairs,
) -> Result<StatusCode, ApiError> {
    state.reinstate(required(&pairs, "paths")?).await?;
    Ok(StatusCode::OK)
}

/// POST /execute - Trigger a run without waiting for it
pub async fn execute(State(state): State<AppState>) -> StatusCode {
    state.execute();
    StatusCode::OK
}

/// POST /pause - Toggle pause and report the new state
pub async fn toggle_pause(State(state): State<AppState>) -> Result<String, ApiError> {
    let paused = state.toggle_pause().await?;
    Ok(paused.to_string())
}
