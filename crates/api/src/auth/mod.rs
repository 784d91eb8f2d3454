//! Authentication primitives.
//!
//! - [`jwt`] -- JWT access-token generation and validation.
//!
//! Password hashing lives in `academia_core::password` because the import
//! pipeline seeds account passwords too.

pub mod jwt;
