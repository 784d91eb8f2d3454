pub mod auth;
pub mod import;
