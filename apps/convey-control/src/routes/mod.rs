mod notify;
mod status;
mod watch;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};

use crate::state::{AppState, ControlError};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/watch", get(watch::current_root).post(watch::adjust_root))
        .route("/ignore", get(watch::ignore).post(watch::ignore))
        .route("/reinstate", get(watch::reinstate).post(watch::reinstate))
        .route("/execute", post(watch::execute))
        .route("/pause", post(watch::toggle_pause))
        .route("/status", get(status::status))
        .route("/longpoll", get(status::long_poll))
        .route("/results", get(status::results))
        .route("/notify", post(notify::send_push))
        .route("/config-status", get(notify::config_status))
        .route("/sound", get(notify::generic_sound))
        .route("/sound/success", get(notify::success_sound))
        .route("/sound/failure", get(notify::failure_sound))
        .with_state(state)
}

/// Boundary errors, rendered as plain text.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Unavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };
        (status, message).into_response()
    }
}

impl From<ControlError> for ApiError {
    fn from(err: ControlError) -> Self {
        match err {
            ControlError::RootNotFound { .. } => ApiError::NotFound(err.to_string()),
            ControlError::Bus(_) | ControlError::Interrupted => {
                ApiError::Unavailable(err.to_string())
            }
        }
    }
}
