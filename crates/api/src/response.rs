//! Shared response envelope types for API handlers.
//!
//! Successful responses use a `{ "status": "success", "data": ... }` envelope;
//! failures are rendered by [`AppError`](crate::error::AppError). Use
//! [`DataResponse`] instead of ad-hoc `serde_json::json!` bodies.

use serde::Serialize;

/// Standard `{ "status": "success", "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse::success(summary)))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub status: &'static str,
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success",
            data,
        }
    }
}
