use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use skyfare_core::FlightError;

#[derive(Debug)]
pub enum AppError {
    Flight(FlightError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // superseded by a newer request from the same consumer
            AppError::Flight(FlightError::Cancelled) => {
                return StatusCode::NO_CONTENT.into_response();
            }
            AppError::Flight(FlightError::Validation(msg)) => (StatusCode::BAD_REQUEST, msg),
            AppError::Flight(FlightError::Provider(msg)) => {
                tracing::warn!("Provider error: {}", msg);
                (StatusCode::BAD_GATEWAY, msg)
            }
            AppError::Flight(FlightError::Transport(msg)) => {
                tracing::warn!("Provider unreachable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, msg)
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<FlightError> for AppError {
    fn from(err: FlightError) -> Self {
        Self::Flight(err)
    }
}
