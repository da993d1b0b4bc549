use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use derive_more::Display;
use thiserror::Error;
use uuid::Uuid;

/// Represents always valid device identifier.
#[derive(Display, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId(Uuid);

#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0} is not a valid device id")]
pub struct DeviceIdError(String);
impl DeviceId {
    pub fn new(raw_id: &str) -> Result<Self, DeviceIdError> {
        match Uuid::try_parse(raw_id) {
            Ok(uuid) => {
                if uuid.is_nil() {
                    Err(DeviceIdError(raw_id.to_string()))
                } else {
                    Ok(DeviceId(uuid))
                }
            }
            Err(_) => Err(DeviceIdError(raw_id.to_string())),
        }
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn into_inner(self) -> Uuid {
        self.0
    }
}

/// Represents always valid device name.
#[derive(Display, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DeviceName(String);

#[derive(Clone, Debug, Error, PartialEq)]
#[error("device name cannot be blank")]
pub struct DeviceNameBlankError;
impl DeviceName {
    pub fn new(raw_name: &str) -> Result<Self, DeviceNameBlankError> {
        if raw_name.trim().is_empty() {
            Err(DeviceNameBlankError)
        } else {
            Ok(Self(raw_name.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Represents always valid device brand.
#[derive(Display, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DeviceBrand(String);

#[derive(Clone, Debug, Error, PartialEq)]
#[error("device brand cannot be blank")]
pub struct DeviceBrandBlankError;
impl DeviceBrand {
    pub fn new(raw_brand: &str) -> Result<Self, DeviceBrandBlankError> {
        if raw_brand.trim().is_empty() {
            Err(DeviceBrandBlankError)
        } else {
            Ok(Self(raw_brand.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Lifecycle state of a device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeviceState {
    Available,
    InUse,
    Inactive,
}

#[derive(Clone, Debug, Error, PartialEq)]
#[error("{0} is not a valid device state, expected one of AVAILABLE, IN_USE, INACTIVE")]
pub struct DeviceStateError(String);

impl DeviceState {
    pub const ALL: [DeviceState; 3] = [
        DeviceState::Available,
        DeviceState::InUse,
        DeviceState::Inactive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceState::Available => "AVAILABLE",
            DeviceState::InUse => "IN_USE",
            DeviceState::Inactive => "INACTIVE",
        }
    }
}

impl FromStr for DeviceState {
    type Err = DeviceStateError;

    fn from_str(raw_state: &str) -> Result<Self, Self::Err> {
        DeviceState::ALL
            .into_iter()
            .find(|state| state.as_str() == raw_state)
            .ok_or_else(|| DeviceStateError(raw_state.to_string()))
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted inventory item.
///
/// Values are never mutated in place: an update produces a new [Device] through
/// [Device::merged], which always carries `id` and `created_at` over unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Device {
    id: DeviceId,
    name: DeviceName,
    brand: DeviceBrand,
    state: DeviceState,
    created_at: DateTime<Utc>,
}

impl Device {
    pub fn new(
        id: DeviceId,
        name: DeviceName,
        brand: DeviceBrand,
        state: DeviceState,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            brand,
            state,
            created_at,
        }
    }

    pub fn id(&self) -> &DeviceId {
        &self.id
    }

    pub fn name(&self) -> &DeviceName {
        &self.name
    }

    pub fn brand(&self) -> &DeviceBrand {
        &self.brand
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }

    pub fn is_in_use(&self) -> bool {
        self.state == DeviceState::InUse
    }

    /// Partial merge: every field present in `req` replaces the stored one,
    /// absent fields are kept.
    pub fn merged(&self, req: &UpdateDeviceRequest) -> Device {
        Device {
            id: self.id,
            name: req.name().cloned().unwrap_or_else(|| self.name.clone()),
            brand: req.brand().cloned().unwrap_or_else(|| self.brand.clone()),
            state: req.state().unwrap_or(self.state),
            created_at: self.created_at,
        }
    }
}

/// A device that has not been stored yet and therefore has no id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewDevice {
    name: DeviceName,
    brand: DeviceBrand,
    state: DeviceState,
    created_at: DateTime<Utc>,
}

impl NewDevice {
    pub fn from_request(req: &CreateDeviceRequest, created_at: DateTime<Utc>) -> Self {
        Self {
            name: req.name().clone(),
            brand: req.brand().clone(),
            state: req.state(),
            created_at,
        }
    }

    pub fn name(&self) -> &DeviceName {
        &self.name
    }

    pub fn brand(&self) -> &DeviceBrand {
        &self.brand
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }

    /// Attaches the id assigned by storage.
    pub fn into_device(self, id: DeviceId) -> Device {
        Device::new(id, self.name, self.brand, self.state, self.created_at)
    }
}

/// Data required by the domain to create a [Device].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateDeviceRequest {
    name: DeviceName,
    brand: DeviceBrand,
    state: DeviceState,
}

impl CreateDeviceRequest {
    pub fn new(name: DeviceName, brand: DeviceBrand, state: DeviceState) -> Self {
        Self { name, brand, state }
    }

    pub fn name(&self) -> &DeviceName {
        &self.name
    }

    pub fn brand(&self) -> &DeviceBrand {
        &self.brand
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }
}

/// Data required by the domain to update a [Device]. `None` means the field was
/// not supplied and keeps its stored value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateDeviceRequest {
    name: Option<DeviceName>,
    brand: Option<DeviceBrand>,
    state: Option<DeviceState>,
}

impl UpdateDeviceRequest {
    pub fn new(
        name: Option<DeviceName>,
        brand: Option<DeviceBrand>,
        state: Option<DeviceState>,
    ) -> Self {
        Self { name, brand, state }
    }

    pub fn name(&self) -> Option<&DeviceName> {
        self.name.as_ref()
    }

    pub fn brand(&self) -> Option<&DeviceBrand> {
        self.brand.as_ref()
    }

    pub fn state(&self) -> Option<DeviceState> {
        self.state
    }

    pub fn touches_identity(&self) -> bool {
        self.name.is_some() || self.brand.is_some()
    }
}

/// Result of a conditional write against storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SwapOutcome<T> {
    Swapped(T),
    /// The stored row no longer matched the value the write was based on.
    Stale,
}

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("device not found: {id}")]
    NotFound { id: DeviceId },
    #[error("{0}")]
    InvalidOperation(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}


#[cfg(test)]
mod device_field_tests {
    use super::*;

    #[test]
    fn test_name_kept_verbatim() {
        let result = DeviceName::new(" iPhone 15 ");
        let expected = Ok(DeviceName(" iPhone 15 ".to_string()));

        assert_eq!(result, expected);
    }

    #[test]
    fn test_blank_name_rejected() {
        assert_eq!(DeviceName::new(""), Err(DeviceNameBlankError));
        assert_eq!(DeviceName::new("   "), Err(DeviceNameBlankError));
    }

    #[test]
    fn test_blank_brand_rejected() {
        assert_eq!(DeviceBrand::new("\t"), Err(DeviceBrandBlankError));
    }

    #[test]
    fn test_state_tokens() {
        for state in DeviceState::ALL {
            assert_eq!(state.as_str().parse::<DeviceState>(), Ok(state));
        }
        assert_eq!(DeviceState::InUse.to_string(), "IN_USE");
    }

    #[test]
    fn test_state_tokens_are_case_sensitive() {
        let result = "in_use".parse::<DeviceState>();
        let expected = Err(DeviceStateError("in_use".to_string()));

        assert_eq!(result, expected);
    }
}
