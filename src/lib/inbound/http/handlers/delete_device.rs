use axum::extract::rejection::PathRejection;
use axum::extract::{OriginalUri, Path, State};
use axum::http::StatusCode;

use crate::domain::device::models::device::DeviceId;
use crate::domain::device::ports::DeviceService;
use crate::inbound::http::AppState;
use crate::inbound::http::responses::{ApiError, ApiErrorResponse};

pub async fn delete_device<DS: DeviceService>(
    State(state): State<AppState<DS>>,
    OriginalUri(uri): OriginalUri,
    id: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, ApiErrorResponse> {
    let reject = |e: ApiError| e.at(uri.path());

    let Path(raw_id) = id.map_err(ApiError::from).map_err(reject)?;
    let id = DeviceId::new(&raw_id)
        .map_err(ApiError::from)
        .map_err(reject)?;

    state
        .device_service
        .delete_device(&id)
        .await
        .map_err(ApiError::from)
        .map_err(reject)
        .map(|()| StatusCode::NO_CONTENT)
}
