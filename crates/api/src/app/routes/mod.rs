use axum::Router;

pub mod orders;
pub mod products;
pub mod system;

/// Router for all `/api` endpoints.
pub fn router() -> Router {
    Router::new()
        .merge(products::router())
        .merge(orders::router())
}
