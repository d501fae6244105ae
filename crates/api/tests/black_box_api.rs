use std::sync::Arc;

use catalog_api::app::{build_app, AppServices};
use reqwest::StatusCode;
use serde_json::{json, Value};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory store, ephemeral port.
        let app = build_app(Arc::new(AppServices::in_memory()));
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

async fn create(client: &reqwest::Client, srv: &TestServer, name: &str, price: f64) -> Value {
    let res = client
        .post(srv.url("/products"))
        .json(&json!({ "name": name, "price": price }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn product_lifecycle_create_read_update_delete() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let created = create(&client, &srv, "Pen", 1.5).await;
    assert_eq!(created["id"], 1);
    assert_eq!(created["name"], "Pen");
    assert_eq!(created["price"], 1.5);
    assert_eq!(created["available"], true);

    let res = client.get(srv.url("/products/1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let found: Value = res.json().await.unwrap();
    assert_eq!(found["name"], "Pen");

    // Body id is ignored; the path selects the row.
    let res = client
        .patch(srv.url("/products/1"))
        .json(&json!({ "id": 99, "price": 2.25 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["id"], 1);
    assert_eq!(updated["name"], "Pen");
    assert_eq!(updated["price"], 2.25);

    let res = client.delete(srv.url("/products/1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let removed: Value = res.json().await.unwrap();
    assert_eq!(removed["available"], false);

    let res = client.get(srv.url("/products/1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "not_found");
    assert_eq!(body["message"], "Product with ID: 1 was not found.");

    // A second delete of a soft-deleted row is also a 404.
    let res = client.delete(srv.url("/products/1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_pages_through_available_products() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    for i in 0..5 {
        create(&client, &srv, &format!("item-{i}"), i as f64).await;
    }
    client.delete(srv.url("/products/2")).send().await.unwrap();

    let res = client
        .get(srv.url("/products?page=2&limit=2"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let page: Value = res.json().await.unwrap();
    let ids: Vec<i64> = page["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![4, 5]);
    assert_eq!(page["meta"], json!({ "page": 2, "last_page": 2, "total_items": 4 }));

    // Default pagination.
    let page: Value = client
        .get(srv.url("/products"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page["data"].as_array().unwrap().len(), 4);
    assert_eq!(page["meta"]["page"], 1);

    // Past the last page: empty data, meta still filled in.
    let page: Value = client
        .get(srv.url("/products?page=9&limit=2"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page["data"], json!([]));
    assert_eq!(page["meta"], json!({ "page": 9, "last_page": 2, "total_items": 4 }));
}

#[tokio::test]
async fn validate_returns_rows_or_lists_missing_ids() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    create(&client, &srv, "A", 1.0).await;
    create(&client, &srv, "B", 2.0).await;
    client.delete(srv.url("/products/2")).send().await.unwrap();

    // Soft-deleted rows still validate; duplicates collapse.
    let res = client
        .post(srv.url("/products/validate"))
        .json(&json!({ "ids": [2, 1, 2] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let rows: Value = res.json().await.unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 2);

    let res = client
        .post(srv.url("/products/validate"))
        .json(&json!({ "ids": [7, 1, 3] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_ids");
    assert_eq!(body["message"], "Some products were not found: [7, 3]");
}

#[tokio::test]
async fn bad_input_is_rejected_with_400() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/products"))
        .json(&json!({ "name": "  ", "price": 1.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");

    let res = client
        .post(srv.url("/products"))
        .json(&json!({ "name": "Pen", "price": -1.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(srv.url("/products"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client.get(srv.url("/products/abc")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_id");

    let res = client.get(srv.url("/products?page=0")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client.get(srv.url("/products?limit=ten")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_of_missing_product_is_404() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .patch(srv.url("/products/42"))
        .json(&json!({ "name": "ghost" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
