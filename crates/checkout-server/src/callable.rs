//! Callable endpoint envelope
//!
//! Requests arrive as `{"data": {...}}` and succeed with `{"result": {...}}`.
//! Failures are `{"error": {"code": "...", "message": "..."}}` with a status
//! derived from the code.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use checkout_payments::{ErrorCode, PaymentError};

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct CallableRequest<T> {
    #[serde(default)]
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct CallableResponse<T> {
    pub result: T,
}

impl<T> CallableResponse<T> {
    pub const fn new(result: T) -> Self {
        Self { result }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

impl ErrorBody {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.as_str(),
                message: message.into(),
            },
        }
    }
}

/// Unwrap the `data` field; an unreadable body counts as empty so the
/// service still checks authentication before arguments.
pub fn callable_data<T: Default>(payload: Result<Json<CallableRequest<T>>, JsonRejection>) -> T {
    match payload {
        Ok(Json(request)) => request.data,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable callable body, treating as empty");
            T::default()
        }
    }
}

pub const fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
        ErrorCode::InvalidArgument => StatusCode::BAD_REQUEST,
        ErrorCode::PermissionDenied => StatusCode::FORBIDDEN,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Error returned from callable handlers
#[derive(Debug)]
pub struct CallableError(pub PaymentError);

impl From<PaymentError> for CallableError {
    fn from(err: PaymentError) -> Self {
        Self(err)
    }
}

impl IntoResponse for CallableError {
    fn into_response(self) -> Response {
        let err = self.0.or_internal("An unexpected error occurred.");
        let code = err.code().unwrap_or(ErrorCode::Internal);

        (status_for(code), Json(ErrorBody::new(code, err.message()))).into_response()
    }
}
