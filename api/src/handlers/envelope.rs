//! Response envelope
//!
//! Every endpoint answers with `{ "Data": ..., "IsSuccess": bool, "StatusCode": u16 }`.
//! Failures carry the error message in `Data`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiResponse<T> {
    pub data: T,
    pub is_success: bool,
    pub status_code: u16,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self::with_status(StatusCode::OK, data)
    }

    pub fn created(data: T) -> Self {
        Self::with_status(StatusCode::CREATED, data)
    }

    fn with_status(status: StatusCode, data: T) -> Self {
        Self {
            data,
            is_success: status.is_success(),
            status_code: status.as_u16(),
        }
    }
}

impl ApiResponse<String> {
    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            data: message.into(),
            is_success: false,
            status_code: status.as_u16(),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}
