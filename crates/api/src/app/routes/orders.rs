use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use stockroom_core::OrderId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/api/orders/", get(list_orders).post(place_order))
        .route("/api/orders/:id", get(get_order))
}

pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.orders.list_orders().await {
        Ok(orders) => (StatusCode::OK, Json(orders)).into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let order_id: OrderId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::inventory_error_to_response(e),
    };

    match services.orders.get_order(order_id).await {
        Ok(order) => (StatusCode::OK, Json(order)).into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

pub async fn place_order(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::QuantityRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match dto::decode_body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    match services.orders.place_order(body.product_id, body.qty).await {
        Ok(_order_id) => dto::accepted(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}
