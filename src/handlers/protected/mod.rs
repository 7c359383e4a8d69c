// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Every route here sits behind `require_user`, which puts `CurrentUser` in the
// request extensions. Administrator-only operations are checked per handler
// with `AccessControl::authorize`.

pub mod devices;
pub mod incidents;
pub mod me;
pub mod offices;
pub mod reference;
pub mod users;
