// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) and Protected (bearer token). Role checks happen inside the
// protected handlers through `AccessControl`, so one router layer serves both
// ordinary users and administrators.

pub mod protected;
pub mod public;
pub mod reference;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// `Some(record)` or a 404 naming what was looked up.
pub(crate) fn found<T>(record: Option<T>, what: &str, id: i32) -> Result<T, ApiError> {
    record.ok_or_else(|| ApiError::not_found(format!("{} {} not found", what, id)))
}

/// 204 when a row was removed, 404 otherwise.
pub(crate) fn deleted(removed: bool, what: &str, id: i32) -> ApiResult<()> {
    if removed {
        Ok(ApiResponse::no_content())
    } else {
        Err(ApiError::not_found(format!("{} {} not found", what, id)))
    }
}
