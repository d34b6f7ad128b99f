pub mod events;
pub mod series;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use repeatcal_core::CalError;
use repeatcal_core::protocol::ErrorResponse;

/// Converts handler errors to HTTP responses. Store errors keep their kind
/// in the status code.
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl AppError {
    fn status(&self) -> StatusCode {
        match self.0.downcast_ref::<CalError>() {
            Some(CalError::NotFound(_)) => StatusCode::NOT_FOUND,
            Some(CalError::InvalidEvent(_)) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }

        // NotFound carries the bare subject ("Event 42") for the client
        let error = match self.0.downcast_ref::<CalError>() {
            Some(CalError::NotFound(subject)) => subject.clone(),
            _ => self.0.to_string(),
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
