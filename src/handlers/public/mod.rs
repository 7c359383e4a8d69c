// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition, service status, and reads of the reference tables the
// login and incident forms are built from.

pub mod auth;
pub mod reference;
pub mod service;
