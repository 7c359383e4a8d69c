pub mod access;
pub mod password;
pub mod token;

pub use access::{AccessControl, AccessError, Operation, Scope};
pub use password::{CredentialHasher, PasswordError};
pub use token::{Claims, Clock, SystemClock, TokenError, TokenService};
