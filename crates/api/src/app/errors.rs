use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stockroom_core::InventoryError;

/// Map an inventory error to its HTTP response.
///
/// Absent records are 404 and business-rule rejections get their own 4xx codes;
/// only storage failures are reported as 500.
pub fn inventory_error_to_response(err: InventoryError) -> axum::response::Response {
    let (status, code) = status_for(&err);
    if status.is_server_error() {
        tracing::error!(error = %err, "request failed on storage");
    }
    json_error(status, code, err.to_string())
}

pub fn status_for(err: &InventoryError) -> (StatusCode, &'static str) {
    match err {
        InventoryError::NotFound { .. } | InventoryError::ProductNotFound(_) => {
            (StatusCode::NOT_FOUND, "not_found")
        }
        InventoryError::InvalidQuantity(_) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_quantity"),
        InventoryError::InsufficientStock { .. } => (StatusCode::CONFLICT, "insufficient_stock"),
        InventoryError::InvalidId(_) => (StatusCode::BAD_REQUEST, "invalid_id"),
        InventoryError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_core::{Entity, ProductId};

    #[test]
    fn every_error_kind_has_a_status() {
        let cases = [
            (InventoryError::not_found(Entity::Order, 1), StatusCode::NOT_FOUND),
            (InventoryError::ProductNotFound(ProductId::new(1)), StatusCode::NOT_FOUND),
            (InventoryError::InvalidQuantity(0), StatusCode::UNPROCESSABLE_ENTITY),
            (
                InventoryError::InsufficientStock {
                    requested: 3,
                    available: 2,
                },
                StatusCode::CONFLICT,
            ),
            (InventoryError::invalid_id("x"), StatusCode::BAD_REQUEST),
            (InventoryError::storage("down"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(status_for(&err).0, expected, "{err}");
            assert_eq!(inventory_error_to_response(err).status(), expected);
        }
    }
}
