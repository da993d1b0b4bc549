use std::future::Future;

use crate::domain::device::models::device::{
    CreateDeviceRequest, Device, DeviceError, DeviceId, DeviceState, NewDevice, SwapOutcome,
    UpdateDeviceRequest,
};

/// `DeviceService` is the public API for the device domain.
pub trait DeviceService: Clone + Send + Sync + 'static {
    fn create_device(
        &self,
        req: &CreateDeviceRequest,
    ) -> impl Future<Output = Result<Device, DeviceError>> + Send;

    fn get_device(&self, id: &DeviceId) -> impl Future<Output = Result<Device, DeviceError>> + Send;

    fn get_all_devices(&self) -> impl Future<Output = Result<Vec<Device>, DeviceError>> + Send;

    /// Devices whose brand contains `brand`, ignoring case. An empty `brand`
    /// matches every device.
    fn find_devices_by_brand(
        &self,
        brand: &str,
    ) -> impl Future<Output = Result<Vec<Device>, DeviceError>> + Send;

    fn find_devices_by_state(
        &self,
        state: DeviceState,
    ) -> impl Future<Output = Result<Vec<Device>, DeviceError>> + Send;

    fn update_device(
        &self,
        id: &DeviceId,
        req: &UpdateDeviceRequest,
    ) -> impl Future<Output = Result<Device, DeviceError>> + Send;

    fn delete_device(&self, id: &DeviceId) -> impl Future<Output = Result<(), DeviceError>> + Send;
}

/// `DeviceRepository` represents a store of device data.
///
/// Writes to existing rows are compare-and-swap: they only apply when the stored
/// row still equals `current`, and report [SwapOutcome::Stale] otherwise.
pub trait DeviceRepository: Send + Sync + Clone + 'static {
    /// Inserts `device`, assigning it a fresh id.
    fn create_device(
        &self,
        device: &NewDevice,
    ) -> impl Future<Output = Result<Device, anyhow::Error>> + Send;

    fn find_device_by_id(
        &self,
        id: &DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, anyhow::Error>> + Send;

    fn find_all_devices(&self) -> impl Future<Output = Result<Vec<Device>, anyhow::Error>> + Send;

    fn find_devices_by_brand(
        &self,
        brand: &str,
    ) -> impl Future<Output = Result<Vec<Device>, anyhow::Error>> + Send;

    fn find_devices_by_state(
        &self,
        state: DeviceState,
    ) -> impl Future<Output = Result<Vec<Device>, anyhow::Error>> + Send;

    fn replace_device(
        &self,
        current: &Device,
        updated: &Device,
    ) -> impl Future<Output = Result<SwapOutcome<Device>, anyhow::Error>> + Send;

    fn delete_device(
        &self,
        current: &Device,
    ) -> impl Future<Output = Result<SwapOutcome<()>, anyhow::Error>> + Send;
}
