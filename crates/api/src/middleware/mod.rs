//! Request middleware and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated account from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`rbac::RequireAuth`] -- Requires any authenticated account.
//! - [`validate::with_checks`] -- Runs declared input checks before a handler.

pub mod auth;
pub mod rbac;
pub mod validate;
