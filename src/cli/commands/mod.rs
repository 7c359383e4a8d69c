pub mod admin;
pub mod database;
pub mod password;
pub mod serve;
