pub mod history_service;
pub mod user_service;

pub use history_service::HistoryRecorder;
pub use user_service::{UserError, UserService};
