use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{Checks, FieldErrors, Validate};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Office {
    #[serde(rename = "office_id")]
    #[sqlx(rename = "office_id")]
    pub id: i32,
    pub city: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewOffice {
    pub city: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OfficePatch {
    pub city: Option<String>,
}

impl OfficePatch {
    pub fn apply(self, mut office: Office) -> Office {
        if let Some(city) = self.city {
            office.city = city;
        }
        office
    }
}

impl Validate for NewOffice {
    fn validate(&self) -> Result<(), FieldErrors> {
        Checks::default().text("city", &self.city, 100).finish()
    }
}

impl Validate for OfficePatch {
    fn validate(&self) -> Result<(), FieldErrors> {
        Checks::default().optional_text("city", self.city.as_deref(), 100).finish()
    }
}
