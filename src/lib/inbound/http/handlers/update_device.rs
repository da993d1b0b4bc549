use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{OriginalUri, Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::device::models::device::{
    DeviceBrand, DeviceBrandBlankError, DeviceId, DeviceName, DeviceNameBlankError, DeviceState,
    DeviceStateError, UpdateDeviceRequest,
};
use crate::domain::device::ports::DeviceService;
use crate::inbound::http::AppState;
use crate::inbound::http::responses::{
    ApiError, ApiErrorResponse, ApiSuccess, DeviceResponseData,
};

/// Every field is optional. A missing field and an explicit `null` both leave the
/// stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateDeviceHttpRequestBody {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    state: Option<String>,
}

#[derive(Debug, Clone, Error)]
pub enum ParseUpdateDeviceHttpRequestError {
    #[error(transparent)]
    Name(#[from] DeviceNameBlankError),
    #[error(transparent)]
    Brand(#[from] DeviceBrandBlankError),
    #[error(transparent)]
    State(#[from] DeviceStateError),
}

impl From<ParseUpdateDeviceHttpRequestError> for ApiError {
    fn from(e: ParseUpdateDeviceHttpRequestError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl UpdateDeviceHttpRequestBody {
    fn try_into_domain(self) -> Result<UpdateDeviceRequest, ParseUpdateDeviceHttpRequestError> {
        let name = self.name.as_deref().map(DeviceName::new).transpose()?;
        let brand = self.brand.as_deref().map(DeviceBrand::new).transpose()?;
        let state = self
            .state
            .as_deref()
            .map(str::parse::<DeviceState>)
            .transpose()?;

        Ok(UpdateDeviceRequest::new(name, brand, state))
    }
}

pub async fn update_device<DS: DeviceService>(
    State(state): State<AppState<DS>>,
    OriginalUri(uri): OriginalUri,
    id: Result<Path<String>, PathRejection>,
    body: Result<Json<UpdateDeviceHttpRequestBody>, JsonRejection>,
) -> Result<ApiSuccess<DeviceResponseData>, ApiErrorResponse> {
    let reject = |e: ApiError| e.at(uri.path());

    let Path(raw_id) = id.map_err(ApiError::from).map_err(reject)?;
    let id = DeviceId::new(&raw_id)
        .map_err(ApiError::from)
        .map_err(reject)?;
    let Json(body) = body.map_err(ApiError::from).map_err(reject)?;
    let domain_req = body
        .try_into_domain()
        .map_err(ApiError::from)
        .map_err(reject)?;

    state
        .device_service
        .update_device(&id, &domain_req)
        .await
        .map_err(ApiError::from)
        .map_err(reject)
        .map(|ref device| ApiSuccess::new(StatusCode::OK, device.into()))
}
