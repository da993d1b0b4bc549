use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{OriginalUri, State};
use axum::http::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::device::models::device::{
    CreateDeviceRequest, DeviceBrand, DeviceBrandBlankError, DeviceName, DeviceNameBlankError,
    DeviceState, DeviceStateError,
};
use crate::domain::device::ports::DeviceService;
use crate::inbound::http::AppState;
use crate::inbound::http::responses::{
    ApiError, ApiErrorResponse, ApiSuccess, DeviceResponseData,
};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateDeviceHttpRequestBody {
    name: String,
    brand: String,
    state: String,
}

#[derive(Debug, Clone, Error)]
pub enum ParseCreateDeviceHttpRequestError {
    #[error(transparent)]
    Name(#[from] DeviceNameBlankError),
    #[error(transparent)]
    Brand(#[from] DeviceBrandBlankError),
    #[error(transparent)]
    State(#[from] DeviceStateError),
}

impl From<ParseCreateDeviceHttpRequestError> for ApiError {
    fn from(e: ParseCreateDeviceHttpRequestError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl CreateDeviceHttpRequestBody {
    fn try_into_domain(self) -> Result<CreateDeviceRequest, ParseCreateDeviceHttpRequestError> {
        let name = DeviceName::new(&self.name)?;
        let brand = DeviceBrand::new(&self.brand)?;
        let state = self.state.parse::<DeviceState>()?;

        Ok(CreateDeviceRequest::new(name, brand, state))
    }
}

pub async fn create_device<DS: DeviceService>(
    State(state): State<AppState<DS>>,
    OriginalUri(uri): OriginalUri,
    body: Result<Json<CreateDeviceHttpRequestBody>, JsonRejection>,
) -> Result<ApiSuccess<DeviceResponseData>, ApiErrorResponse> {
    let reject = |e: ApiError| e.at(uri.path());

    let Json(body) = body.map_err(ApiError::from).map_err(reject)?;
    let domain_req = body
        .try_into_domain()
        .map_err(ApiError::from)
        .map_err(reject)?;

    state
        .device_service
        .create_device(&domain_req)
        .await
        .map_err(ApiError::from)
        .map_err(reject)
        .map(|ref device| ApiSuccess::new(StatusCode::CREATED, device.into()))
}
