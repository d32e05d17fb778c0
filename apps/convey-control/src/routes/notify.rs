use std::path::Path;

use axum::{
    body::Body,
    extract::{Form, Query, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tower::ServiceExt;
use tower_http::services::ServeFile;

use super::ApiError;
use crate::{state::AppState, validate::ConfigStatus};

#[derive(Debug, Default, Deserialize)]
pub struct PushFields {
    title: Option<String>,
    body: Option<String>,
}

/// POST /notify - Forward a push notification
///
/// Fields come from the form body, or the query string when absent there.
/// Delivery is best effort, so a well-formed request always gets 200.
pub async fn send_push(
    State(state): State<AppState>,
    Query(query): Query<PushFields>,
    form: Option<Form<PushFields>>,
) -> Result<StatusCode, ApiError> {
    let form = form.map(|Form(fields)| fields).unwrap_or_default();
    let title = form.title.or(query.title).unwrap_or_default();
    let body = form.body.or(query.body).unwrap_or_default();
    if title.is_empty() || body.is_empty() {
        return Err(ApiError::BadRequest("Missing title or body".to_string()));
    }

    state.send_push(&title, &body).await;
    Ok(StatusCode::OK)
}

pub async fn config_status(State(state): State<AppState>) -> Json<ConfigStatus> {
    Json(state.config().config_status())
}

pub async fn generic_sound(
    State(state): State<AppState>,
    request: Request,
) -> Result<Response, ApiError> {
    serve_sound(state.config().generic_sound_path(), "", request).await
}

pub async fn success_sound(
    State(state): State<AppState>,
    request: Request,
) -> Result<Response, ApiError> {
    serve_sound(state.config().success_sound_path(), "success ", request).await
}

pub async fn failure_sound(
    State(state): State<AppState>,
    request: Request,
) -> Result<Response, ApiError> {
    serve_sound(state.config().failure_sound_path(), "failure ", request).await
}

async fn serve_sound(
    path: Option<&Path>,
    label: &str,
    request: Request,
) -> Result<Response, ApiError> {
    let Some(path) = path else {
        return Err(ApiError::NotFound(format!(
            "No {label}sound file configured"
        )));
    };
    let is_file = tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false);
    if !is_file {
        return Err(ApiError::NotFound(format!("{label}sound file not found")));
    }

    match ServeFile::new(path).oneshot(request).await {
        Ok(response) => Ok(response.map(Body::new).into_response()),
        Err(never) => match never {},
    }
}
