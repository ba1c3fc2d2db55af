use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use engine::{EngineError, FieldErrors};

use api_types::{ErrorDetail, ScalarInput};
pub use server::{ServerState, router, run, run_with_listener};

mod expenditure;
mod income;
mod server;
mod user;

const INTERNAL_ERROR: &str = "Internal server error";
const NOT_A_STRING: &str = "Not a valid string.";
const NOT_A_NUMBER: &str = "A valid number is required.";
const BEARER_CHALLENGE: &str = "Bearer realm=\"api\"";

pub enum ServerError {
    Engine(EngineError),
    /// Request body that could not be parsed at all.
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Validation(_)
        | EngineError::AuthenticationFailed
        | EngineError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        EngineError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Internal(_) | EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn detail(status: StatusCode, detail: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorDetail {
            detail: detail.into(),
        }),
    )
        .into_response()
}

/// Generic 500; the cause is only logged.
pub(crate) fn internal_error_response() -> Response {
    detail(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let err = match self {
            ServerError::Generic(message) => return detail(StatusCode::BAD_REQUEST, message),
            ServerError::Engine(err) => err,
        };

        let status = status_for_engine_error(&err);
        match err {
            EngineError::Validation(errors) => (status, Json(errors)).into_response(),
            EngineError::Unauthenticated(message) => {
                let mut res = detail(status, message);
                res.headers_mut().insert(
                    header::WWW_AUTHENTICATE,
                    header::HeaderValue::from_static(BEARER_CHALLENGE),
                );
                res
            }
            EngineError::Database(db_err) => {
                tracing::error!("database error: {db_err}");
                internal_error_response()
            }
            EngineError::Internal(message) => {
                tracing::error!("internal error: {message}");
                internal_error_response()
            }
            other => detail(status, other.to_string()),
        }
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Generic(rejection.body_text())
    }
}

/// `Json` extractor whose rejection speaks the API error format.
pub struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Payload(value))
    }
}

/// Unpacks scalar request fields, collecting a type error per field that
/// held neither a string nor a number.
#[derive(Default)]
pub(crate) struct Scalars {
    errors: FieldErrors,
}

impl Scalars {
    pub(crate) fn text(&mut self, field: &str, value: Option<ScalarInput>) -> Option<String> {
        self.read(field, value, NOT_A_STRING)
    }

    pub(crate) fn number(&mut self, field: &str, value: Option<ScalarInput>) -> Option<String> {
        self.read(field, value, NOT_A_NUMBER)
    }

    fn read(&mut self, field: &str, value: Option<ScalarInput>, message: &str) -> Option<String> {
        let value = value?;
        let text = value.into_text();
        if text.is_none() {
            self.errors.add(field, message);
        }
        text
    }

    /// `value` when every field had a usable type, the collected field
    /// errors otherwise.
    pub(crate) fn finish<T>(self, value: T) -> Result<T, ServerError> {
        self.errors.into_result()?;
        Ok(value)
    }
}
