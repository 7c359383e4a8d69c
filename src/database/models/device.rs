use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{nullable, FieldErrors, Validate};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Device {
    #[serde(rename = "device_id")]
    #[sqlx(rename = "device_id")]
    pub id: i32,
    pub office_id: i32,
    pub owner_id: Option<i32>,
    pub type_id: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDevice {
    pub office_id: i32,
    #[serde(default)]
    pub owner_id: Option<i32>,
    pub type_id: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DevicePatch {
    pub office_id: Option<i32>,
    #[serde(default, deserialize_with = "nullable")]
    pub owner_id: Option<Option<i32>>,
    pub type_id: Option<i32>,
}

impl DevicePatch {
    pub fn apply(self, mut device: Device) -> Device {
        if let Some(office_id) = self.office_id {
            device.office_id = office_id;
        }
        if let Some(owner_id) = self.owner_id {
            device.owner_id = owner_id;
        }
        if let Some(type_id) = self.type_id {
            device.type_id = type_id;
        }
        device
    }
}

// References are checked by the store; nothing else to validate.
impl Validate for NewDevice {
    fn validate(&self) -> Result<(), FieldErrors> {
        Ok(())
    }
}

impl Validate for DevicePatch {
    fn validate(&self) -> Result<(), FieldErrors> {
        Ok(())
    }
}
