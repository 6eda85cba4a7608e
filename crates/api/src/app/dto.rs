use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use stockroom_core::ProductId;

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /api/products/` (set quantity) and `POST /api/orders/` (place order).
///
/// Both fields are required; a missing `qty` is a malformed request, never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct QuantityRequest {
    pub product_id: ProductId,
    pub qty: i32,
}

/// Unwrap a JSON body or turn the rejection into a 400 response.
pub fn decode_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_request",
            rejection.body_text(),
        )),
    }
}

// -------------------------
// Response helpers
// -------------------------

pub fn accepted() -> Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "accepted" })),
    )
        .into_response()
}
