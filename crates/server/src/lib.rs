use api_types::Envelope;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use engine::EngineError;

pub use server::{ServerConfig, router, run, run_with_listener, spawn_with_listener};

mod auth;
mod banners;
mod categories;
mod extract;
mod ingredients;
mod recipes;
mod search;
mod server;
mod sub_categories;
mod users;
mod views;

/// Error of any handler. Rendered as the failure envelope.
#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    /// Malformed request (bad JSON, non-numeric query value, ...).
    Generic(String),
    Unauthorized(String),
    Forbidden(String),
    /// Failure outside the engine; logged, never echoed.
    Internal(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Validation(_) | EngineError::InvalidInput(_) | EngineError::Image(_) => {
            StatusCode::BAD_REQUEST
        }
        EngineError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::PasswordHash(_) | EngineError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn envelope_for_engine_error(err: EngineError) -> Envelope<()> {
    match err {
        EngineError::Validation(errors) => Envelope::failure(
            "Validation failed",
            errors
                .into_iter()
                .map(|e| api_types::FieldError {
                    field: e.field,
                    message: e.message,
                })
                .collect(),
        ),
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            Envelope::failure("Internal server error", Vec::new())
        }
        EngineError::PasswordHash(err) => {
            tracing::error!("password hashing failed: {err}");
            Envelope::failure("Internal server error", Vec::new())
        }
        other => Envelope::failure(other.to_string(), Vec::new()),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), envelope_for_engine_error(err)),
            ServerError::Generic(message) => {
                (StatusCode::BAD_REQUEST, Envelope::failure(message, Vec::new()))
            }
            ServerError::Unauthorized(message) => {
                (StatusCode::UNAUTHORIZED, Envelope::failure(message, Vec::new()))
            }
            ServerError::Forbidden(message) => {
                (StatusCode::FORBIDDEN, Envelope::failure(message, Vec::new()))
            }
            ServerError::Internal(err) => {
                tracing::error!("internal error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Envelope::failure("Internal server error", Vec::new()),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(value: JsonRejection) -> Self {
        Self::Generic(value.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(value: QueryRejection) -> Self {
        Self::Generic(value.body_text())
    }
}

impl From<PathRejection> for ServerError {
    fn from(value: PathRejection) -> Self {
        Self::Generic(value.body_text())
    }
}
