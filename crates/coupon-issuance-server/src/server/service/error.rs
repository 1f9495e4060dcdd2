//! Error types for the RPC surface.
//!
//! [`ApiError`] wraps every failure a handler can return and renders it as a
//! Connect error body, `{"code": ..., "message": ...}`, with the HTTP status
//! the Connect protocol pairs with that code.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Unified error type for the RPC handlers.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ApiError {
    /// The issuance core refused the request.
    #[error(transparent)]
    Issuance(#[from] coupon_issuance::Error),

    /// The request body could not be decoded.
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// The service is in the process of shutting down.
    #[error("Service is shutting down")]
    ServiceShutdown,
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest {
            reason: rejection.body_text(),
        }
    }
}

/// Connect error codes used by this service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Code {
    InvalidArgument,
    NotFound,
    FailedPrecondition,
    ResourceExhausted,
    Internal,
    Unavailable,
}

impl Code {
    pub const fn status(self) -> StatusCode {
        match self {
            Self::InvalidArgument | Self::FailedPrecondition => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::ResourceExhausted => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Body of a Connect unary error response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: Code,
    pub message: String,
}

impl ApiError {
    pub const fn code(&self) -> Code {
        use coupon_issuance::Error as Core;

        match self {
            Self::Issuance(err) => match err {
                Core::NotFound { .. } => Code::NotFound,
                Core::PeriodNotStarted | Core::PeriodExpired => Code::FailedPrecondition,
                Core::CapacityExhausted => Code::ResourceExhausted,
                Core::InvalidWindow { .. } => Code::InvalidArgument,
                Core::CodeGeneration { .. } | Core::IdSpaceExhausted => Code::Internal,
            },
            Self::InvalidRequest { .. } => Code::InvalidArgument,
            Self::ServiceShutdown => Code::Unavailable,
        }
    }

    /// Short label for the rejection counter.
    pub const fn reason(&self) -> &'static str {
        use coupon_issuance::Error as Core;

        match self {
            Self::Issuance(Core::NotFound { .. }) => "not_found",
            Self::Issuance(Core::PeriodNotStarted) => "not_started",
            Self::Issuance(Core::PeriodExpired) => "expired",
            Self::Issuance(Core::CapacityExhausted) => "exhausted",
            Self::Issuance(_) => "internal",
            Self::InvalidRequest { .. } => "invalid_request",
            Self::ServiceShutdown => "shutdown",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.code();
        let body = ErrorBody {
            code,
            message: self.to_string(),
        };
        (code.status(), Json(body)).into_response()
    }
}
