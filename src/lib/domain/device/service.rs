use anyhow::anyhow;
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::domain::device::models::device::{
    CreateDeviceRequest, Device, DeviceError, DeviceId, DeviceState, NewDevice, SwapOutcome,
    UpdateDeviceRequest,
};
use crate::domain::device::ports::{DeviceRepository, DeviceService};

/// Upper bound on read-guard-write rounds when the stored row keeps changing
/// underneath an update or delete.
const MAX_SWAP_ATTEMPTS: usize = 5;

const UPDATE_IN_USE_MESSAGE: &str = "cannot update name or brand of a device in use";
const DELETE_IN_USE_MESSAGE: &str = "cannot delete a device that is in use";

/// Canonical implementation of the [DeviceService] port, through which the device domain API is
/// consumed.
///
/// Holds no state of its own. Update and delete read the stored device, check the in-use guard
/// against it and then write conditionally on the row being unchanged, so a concurrent writer
/// can never slip a stale read past the guard.
#[derive(Debug, Clone)]
pub struct Service<R: DeviceRepository> {
    repo: R,
}

impl<R: DeviceRepository> Service<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    async fn load_device(&self, id: &DeviceId) -> Result<Device, DeviceError> {
        self.repo
            .find_device_by_id(id)
            .await?
            .ok_or(DeviceError::NotFound { id: *id })
    }
}

impl<R: DeviceRepository> DeviceService for Service<R> {
    async fn create_device(&self, req: &CreateDeviceRequest) -> Result<Device, DeviceError> {
        let new_device = NewDevice::from_request(req, Utc::now());
        let device = self.repo.create_device(&new_device).await?;

        info!(device_id = %device.id(), state = %device.state(), "device created");
        Ok(device)
    }

    async fn get_device(&self, id: &DeviceId) -> Result<Device, DeviceError> {
        debug!(device_id = %id, "getting device");
        self.load_device(id).await
    }

    async fn get_all_devices(&self) -> Result<Vec<Device>, DeviceError> {
        Ok(self.repo.find_all_devices().await?)
    }

    async fn find_devices_by_brand(&self, brand: &str) -> Result<Vec<Device>, DeviceError> {
        let devices = self.repo.find_devices_by_brand(brand).await?;

        debug!(brand, count = devices.len(), "found devices by brand");
        Ok(devices)
    }

    async fn find_devices_by_state(&self, state: DeviceState) -> Result<Vec<Device>, DeviceError> {
        let devices = self.repo.find_devices_by_state(state).await?;

        debug!(%state, count = devices.len(), "found devices by state");
        Ok(devices)
    }

    async fn update_device(
        &self,
        id: &DeviceId,
        req: &UpdateDeviceRequest,
    ) -> Result<Device, DeviceError> {
        for attempt in 1..=MAX_SWAP_ATTEMPTS {
            let current = self.load_device(id).await?;

            if current.is_in_use() && req.touches_identity() {
                return Err(DeviceError::InvalidOperation(
                    UPDATE_IN_USE_MESSAGE.to_string(),
                ));
            }

            let updated = current.merged(req);
            match self.repo.replace_device(&current, &updated).await? {
                SwapOutcome::Swapped(device) => {
                    info!(device_id = %id, state = %device.state(), "device updated");
                    return Ok(device);
                }
                SwapOutcome::Stale => {
                    warn!(
                        device_id = %id,
                        attempt,
                        "device changed concurrently, re-checking update"
                    );
                }
            }
        }

        Err(anyhow!(
            "device {} kept changing concurrently, gave up after {} attempts",
            id,
            MAX_SWAP_ATTEMPTS
        )
        .into())
    }

    async fn delete_device(&self, id: &DeviceId) -> Result<(), DeviceError> {
        for attempt in 1..=MAX_SWAP_ATTEMPTS {
            let current = self.load_device(id).await?;

            if current.is_in_use() {
                return Err(DeviceError::InvalidOperation(
                    DELETE_IN_USE_MESSAGE.to_string(),
                ));
            }

            match self.repo.delete_device(&current).await? {
                SwapOutcome::Swapped(()) => {
                    info!(device_id = %id, "device deleted");
                    return Ok(());
                }
                SwapOutcome::Stale => {
                    warn!(
                        device_id = %id,
                        attempt,
                        "device changed concurrently, re-checking delete"
                    );
                }
            }
        }

        Err(anyhow!(
            "device {} kept changing concurrently, gave up after {} attempts",
            id,
            MAX_SWAP_ATTEMPTS
        )
        .into())
    }
}
