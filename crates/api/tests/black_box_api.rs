use reqwest::StatusCode;
use serde_json::json;

use stockroom_api::app::services::AppServices;
use stockroom_catalog::NewProduct;
use stockroom_infra::InMemoryInventoryStore;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Serve the production router over an in-memory store holding `stock`
    /// (product ids `1..=n`), bound to an ephemeral port.
    async fn spawn(stock: &[i32]) -> Self {
        let store = InMemoryInventoryStore::with_products(stock.iter().enumerate().map(|(i, qty)| {
            NewProduct::new("Acme", format!("W-{}", 100 + i), "Widget", *qty, "2 weeks")
        }))
        .expect("seed stock must be non-negative");
        let app = stockroom_api::app::build_app(AppServices::in_memory(store));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn product_qty(client: &reqwest::Client, srv: &TestServer, id: i32) -> i64 {
    let res = client
        .get(srv.url(&format!("/api/products/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    body["qty_available__c"].as_i64().unwrap()
}

async fn post_json(
    client: &reqwest::Client,
    url: String,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let res = client.post(url).json(&body).send().await.unwrap();
    let status = res.status();
    let body = res.json().await.unwrap();
    (status, body)
}

#[tokio::test]
async fn health_is_ok() {
    let srv = TestServer::spawn(&[]).await;
    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn lists_products_with_catalog_fields() {
    let srv = TestServer::spawn(&[5, 0]).await;

    let res = reqwest::get(srv.url("/api/products/")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["id__c"], 1);
    assert_eq!(items[0]["manufacturer__c"], "Acme");
    assert_eq!(items[0]["model_number__c"], "W-100");
    assert_eq!(items[0]["description__c"], "Widget");
    assert_eq!(items[0]["qty_available__c"], 5);
    assert_eq!(items[0]["leadtime__c"], "2 weeks");
    assert_eq!(items[1]["qty_available__c"], 0);
}

#[tokio::test]
async fn product_lookup_errors() {
    let srv = TestServer::spawn(&[5]).await;

    let res = reqwest::get(srv.url("/api/products/999")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "not_found");

    let res = reqwest::get(srv.url("/api/products/abc")).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_id");
    assert!(
        body["message"].as_str().unwrap().contains("ProductId"),
        "{body}"
    );
}

#[tokio::test]
async fn set_quantity_then_read_back() {
    let srv = TestServer::spawn(&[5]).await;
    let client = reqwest::Client::new();

    let (status, body) = post_json(
        &client,
        srv.url("/api/products/"),
        json!({ "product_id": 1, "qty": 40 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "accepted" }));
    assert_eq!(product_qty(&client, &srv, 1).await, 40);

    let (status, _) = post_json(
        &client,
        srv.url("/api/products/"),
        json!({ "product_id": 999, "qty": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn place_order_then_oversell_is_rejected() {
    let srv = TestServer::spawn(&[5]).await;
    let client = reqwest::Client::new();

    let (status, body) = post_json(
        &client,
        srv.url("/api/orders/"),
        json!({ "product_id": 1, "qty": 3 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "accepted" }));
    assert_eq!(product_qty(&client, &srv, 1).await, 2);

    let res = client.get(srv.url("/api/orders/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let orders: serde_json::Value = res.json().await.unwrap();
    let orders = orders.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["qty"], 3);
    assert_eq!(orders[0]["status"], "pending");
    assert_eq!(orders[0]["product"]["id__c"], 1);

    let (status, body) = post_json(
        &client,
        srv.url("/api/orders/"),
        json!({ "product_id": 1, "qty": 3 }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "insufficient_stock");
    assert_eq!(product_qty(&client, &srv, 1).await, 2);
}

#[tokio::test]
async fn order_lookup_by_id() {
    let srv = TestServer::spawn(&[5]).await;
    let client = reqwest::Client::new();

    post_json(
        &client,
        srv.url("/api/orders/"),
        json!({ "product_id": 1, "qty": 1 }),
    )
    .await;

    let res = client.get(srv.url("/api/orders/1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let order: serde_json::Value = res.json().await.unwrap();
    assert_eq!(order["id"], 1);
    assert_eq!(order["product"]["qty_available__c"], 4);

    let res = client.get(srv.url("/api/orders/2")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client.get(srv.url("/api/orders/one")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_id");
    assert!(
        body["message"].as_str().unwrap().contains("OrderId"),
        "{body}"
    );
}

#[tokio::test]
async fn missing_qty_is_a_bad_request_not_zero() {
    let srv = TestServer::spawn(&[5]).await;
    let client = reqwest::Client::new();

    for path in ["/api/orders/", "/api/products/"] {
        let (status, body) = post_json(&client, srv.url(path), json!({ "product_id": 1 })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{path}");
        assert_eq!(body["error"], "invalid_request");
    }

    let (status, _) = post_json(
        &client,
        srv.url("/api/orders/"),
        json!({ "product_id": "one", "qty": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let res = client
        .post(srv.url("/api/orders/"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    assert_eq!(product_qty(&client, &srv, 1).await, 5);
}

#[tokio::test]
async fn business_rule_rejections() {
    let srv = TestServer::spawn(&[5]).await;
    let client = reqwest::Client::new();

    let (status, body) = post_json(
        &client,
        srv.url("/api/orders/"),
        json!({ "product_id": 1, "qty": 0 }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "invalid_quantity");

    let (status, body) = post_json(
        &client,
        srv.url("/api/orders/"),
        json!({ "product_id": 42, "qty": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, body) = post_json(
        &client,
        srv.url("/api/products/"),
        json!({ "product_id": 1, "qty": -3 }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "storage_error");

    assert_eq!(product_qty(&client, &srv, 1).await, 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_orders_over_http_never_oversell() {
    let srv = TestServer::spawn(&[7]).await;
    let client = reqwest::Client::new();

    let requests = (0..12).map(|_| {
        let client = client.clone();
        let url = srv.url("/api/orders/");
        tokio::spawn(async move {
            client
                .post(url)
                .json(&json!({ "product_id": 1, "qty": 2 }))
                .send()
                .await
                .unwrap()
                .status()
        })
    });

    let mut accepted = 0;
    for handle in requests.collect::<Vec<_>>() {
        match handle.await.unwrap() {
            StatusCode::OK => accepted += 1,
            StatusCode::CONFLICT => {}
            other => panic!("unexpected status {other}"),
        }
    }

    assert_eq!(accepted, 3);
    assert_eq!(product_qty(&client, &srv, 1).await, 1);
}
