use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::constants::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE};
use crate::core::errors::{CareLinkError, FieldError};
use crate::core::pagination::PageRequest;

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        MessageResponse { message: message.into() }
    }
}

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based, defaults to 1
    pub page_number: Option<i64>,
    /// defaults to 10
    pub page_size: Option<i64>,
}

impl PageQuery {
    pub fn into_page(self) -> Result<PageRequest, CareLinkError> {
        PageRequest::new(
            self.page_number.unwrap_or(DEFAULT_PAGE_NUMBER),
            self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }
}

// Error response struct
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}

// Newtype wrapper for CareLinkError to implement IntoResponse
pub struct ApiError(pub CareLinkError);

impl From<CareLinkError> for ApiError {
    fn from(err: CareLinkError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let error = match rejection {
            // Well-formed JSON that does not fit the payload type
            JsonRejection::JsonDataError(e) => {
                CareLinkError::InvalidRegistration(vec![FieldError::new("body", e.body_text())])
            }
            other => CareLinkError::invalid_argument("body", other.body_text()),
        };
        ApiError(error)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError(CareLinkError::invalid_argument("query", rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError(CareLinkError::invalid_argument("path", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            CareLinkError::EntityNotFound { .. } => StatusCode::NOT_FOUND,
            CareLinkError::EntityAlreadyExists { .. }
            | CareLinkError::InvalidArgument { .. }
            | CareLinkError::InvalidRegistration(_) => StatusCode::BAD_REQUEST,
            CareLinkError::NotAuthorized(_) => StatusCode::UNAUTHORIZED,
            CareLinkError::Forbidden(_) => StatusCode::FORBIDDEN,
            CareLinkError::DatabaseError(_) | CareLinkError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let message = if status.is_server_error() {
            error!("Request failed: {}", self.0);
            "An internal error occurred".to_string()
        } else {
            self.0.to_string()
        };
        (status, Json(ErrorResponse { message })).into_response()
    }
}
