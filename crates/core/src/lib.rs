//! Domain logic for the academic backend.
//!
//! Everything here is transport-agnostic: the HTTP layer lives in
//! `academia-api` and the PostgreSQL document store in `academia-db`.

pub mod error;
pub mod import;
pub mod password;
pub mod roles;
pub mod store;
pub mod types;
pub mod validation;
