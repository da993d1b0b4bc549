use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::device::models::device::{
    Device, DeviceError, DeviceIdError, DeviceStateError,
};

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<T>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1.0 == other.1.0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(data))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

/// Error kinds the HTTP boundary knows how to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    InternalServerError(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(message)
            | ApiError::NotFound(message)
            | ApiError::InternalServerError(message) => message,
        }
    }

    /// Binds the error to the request path it is reported for.
    pub fn at(self, path: &str) -> ApiErrorResponse {
        ApiErrorResponse {
            error: self,
            path: path.to_string(),
        }
    }
}

impl From<DeviceError> for ApiError {
    fn from(e: DeviceError) -> Self {
        match e {
            DeviceError::NotFound { id } => Self::NotFound(format!("device not found: {}", id)),
            DeviceError::InvalidOperation(message) => Self::BadRequest(message),
            DeviceError::Unexpected(cause) => Self::InternalServerError(format!("{:#}", cause)),
        }
    }
}

impl From<DeviceIdError> for ApiError {
    fn from(e: DeviceIdError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl From<DeviceStateError> for ApiError {
    fn from(e: DeviceStateError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiErrorResponse {
    error: ApiError,
    path: String,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        let status = self.error.status();
        if status.is_server_error() {
            tracing::error!(path = %self.path, "{}", self.error.message());
        }

        let body = ApiErrorBody {
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or_default().to_string(),
            message: self.error.message().to_string(),
            path: self.path,
        };

        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub status: u16,
    pub error: String,
    pub message: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceResponseData {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub state: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Device> for DeviceResponseData {
    fn from(device: &Device) -> Self {
        Self {
            id: device.id().to_string(),
            name: device.name().to_string(),
            brand: device.brand().to_string(),
            state: device.state().to_string(),
            created_at: *device.created_at(),
        }
    }
}
