use axum::extract::rejection::PathRejection;
use axum::extract::{OriginalUri, Path, State};
use axum::http::StatusCode;

use crate::domain::device::models::device::{Device, DeviceState};
use crate::domain::device::ports::DeviceService;
use crate::inbound::http::AppState;
use crate::inbound::http::responses::{
    ApiError, ApiErrorResponse, ApiSuccess, DeviceResponseData,
};

fn to_response_data(devices: &[Device]) -> Vec<DeviceResponseData> {
    devices.iter().map(|device| device.into()).collect()
}

pub async fn get_all_devices<DS: DeviceService>(
    State(state): State<AppState<DS>>,
    OriginalUri(uri): OriginalUri,
) -> Result<ApiSuccess<Vec<DeviceResponseData>>, ApiErrorResponse> {
    state
        .device_service
        .get_all_devices()
        .await
        .map_err(|e| ApiError::from(e).at(uri.path()))
        .map(|ref devices| ApiSuccess::new(StatusCode::OK, to_response_data(devices)))
}

pub async fn get_devices_by_brand<DS: DeviceService>(
    State(state): State<AppState<DS>>,
    OriginalUri(uri): OriginalUri,
    brand: Result<Path<String>, PathRejection>,
) -> Result<ApiSuccess<Vec<DeviceResponseData>>, ApiErrorResponse> {
    let reject = |e: ApiError| e.at(uri.path());

    let Path(brand) = brand.map_err(ApiError::from).map_err(reject)?;

    state
        .device_service
        .find_devices_by_brand(&brand)
        .await
        .map_err(ApiError::from)
        .map_err(reject)
        .map(|ref devices| ApiSuccess::new(StatusCode::OK, to_response_data(devices)))
}

pub async fn get_devices_by_state<DS: DeviceService>(
    State(state): State<AppState<DS>>,
    OriginalUri(uri): OriginalUri,
    device_state: Result<Path<String>, PathRejection>,
) -> Result<ApiSuccess<Vec<DeviceResponseData>>, ApiErrorResponse> {
    let reject = |e: ApiError| e.at(uri.path());

    let Path(raw_state) = device_state.map_err(ApiError::from).map_err(reject)?;
    let device_state = raw_state
        .parse::<DeviceState>()
        .map_err(ApiError::from)
        .map_err(reject)?;

    state
        .device_service
        .find_devices_by_state(device_state)
        .await
        .map_err(ApiError::from)
        .map_err(reject)
        .map(|ref devices| ApiSuccess::new(StatusCode::OK, to_response_data(devices)))
}
