use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use stockroom_core::ProductId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route(
            "/api/products/",
            get(list_products).post(set_product_quantity),
        )
        .route("/api/products/:id", get(get_product))
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.catalog.list_products().await {
        Ok(products) => (StatusCode::OK, Json(products)).into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let product_id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::inventory_error_to_response(e),
    };

    match services.catalog.get_product(product_id).await {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

pub async fn set_product_quantity(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::QuantityRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match dto::decode_body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    match services.catalog.set_quantity(body.product_id, body.qty).await {
        Ok(()) => dto::accepted(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}
