use reqwest::StatusCode;
use serde_json::{Value, json};

use kidstock_api::app::{AppServices, router};

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory store, ephemeral port.
        let services = AppServices::in_memory().await.expect("failed to build services");
        let app = router(services);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let res = self.client.get(self.url(path)).send().await.unwrap();
        (res.status(), res.json().await.unwrap())
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self.client.post(self.url(path)).json(&body).send().await.unwrap();
        (res.status(), res.json().await.unwrap())
    }

    async fn put(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self.client.put(self.url(path)).json(&body).send().await.unwrap();
        (res.status(), res.json().await.unwrap())
    }

    async fn delete(&self, path: &str) -> (StatusCode, Value) {
        let res = self.client.delete(self.url(path)).send().await.unwrap();
        (res.status(), res.json().await.unwrap())
    }

    /// Create a group and one child in it; returns (share token, child id).
    async fn household(&self) -> (String, String) {
        let (status, group) = self.post("/groups", json!({ "name": "Smith Family" })).await;
        assert_eq!(status, StatusCode::CREATED);
        let token = group["data"]["share_token"].as_str().unwrap().to_string();

        let (status, child) = self
            .post(&format!("/groups/{token}/children"), json!({ "name": "Hana" }))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let child_id = child["data"]["id"].as_str().unwrap().to_string();
        (token, child_id)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[tokio::test]
async fn health_is_public_and_ok() {
    let srv = TestServer::spawn().await;
    let (status, body) = srv.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn create_group_returns_envelope_with_empty_children() {
    let srv = TestServer::spawn().await;

    let (status, body) = srv.post("/groups", json!({ "name": "  Smith Family " })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "Smith Family");
    assert_eq!(body["data"]["children"], json!([]));
    assert!(body.get("errors").is_none());

    let token = body["data"]["share_token"].as_str().unwrap();
    assert_eq!(token.len(), 64);

    let (status, other) = srv.post("/groups", json!({ "name": "Smith Family" })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(other["data"]["share_token"].as_str().unwrap(), token);
}

#[tokio::test]
async fn invalid_group_names_are_422_with_field_errors() {
    let srv = TestServer::spawn().await;

    for name in [json!(""), json!("A".repeat(101))] {
        let (status, body) = srv.post("/groups", json!({ "name": name })).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["success"], false);
        assert_eq!(body["data"], Value::Null);
        assert!(body["errors"]["name"].as_array().is_some_and(|m| !m.is_empty()));
    }
}

#[tokio::test]
async fn malformed_bodies_are_422_envelopes() {
    let srv = TestServer::spawn().await;

    let (status, body) = srv.post("/groups", json!({ "title": "x" })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);

    let res = srv
        .client
        .post(srv.url("/groups"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn unknown_token_is_404() {
    let srv = TestServer::spawn().await;

    let (status, body) = srv.get("/groups/does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, _) = srv.get("/groups/does-not-exist/children").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = srv
        .post("/groups/does-not-exist/children", json!({ "name": "Ken" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn child_lifecycle_create_rename_delete() {
    let srv = TestServer::spawn().await;
    let (token, child_id) = srv.household().await;

    let (status, group) = srv.get(&format!("/groups/{token}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(group["data"]["children"][0]["id"], child_id.as_str());

    let (status, body) = srv
        .put(&format!("/children/{child_id}"), json!({ "name": "Hanako" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Hanako");

    let (status, body) = srv.get(&format!("/children/{child_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Hanako");

    let (status, _) = srv
        .put(&format!("/children/{child_id}"), json!({ "name": "" }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = srv.delete(&format!("/children/{child_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], Value::Null);

    let (status, _) = srv.delete(&format!("/children/{child_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, children) = srv.get(&format!("/groups/{token}/children")).await;
    assert_eq!(children["data"], json!([]));
}

#[tokio::test]
async fn malformed_child_id_is_404() {
    let srv = TestServer::spawn().await;
    let (status, _) = srv.get("/children/not-a-uuid").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = srv
        .post(
            "/children/not-a-uuid/stock-increment",
            json!({ "clothing_category_id": 1, "increment": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn bad_amount_is_reported_before_a_malformed_child_id() {
    let srv = TestServer::spawn().await;
    let (status, body) = srv
        .post(
            "/children/not-a-uuid/stock-increment",
            json!({ "clothing_category_id": 1, "increment": 0 }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["increment"].is_array());

    let (status, body) = srv
        .post(
            "/children/not-a-uuid/stock-decrement",
            json!({ "clothing_category_id": 1, "decrement": -1 }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["decrement"].is_array());
}

#[tokio::test]
async fn stock_increment_decrement_round_trip() {
    let srv = TestServer::spawn().await;
    let (_, child_id) = srv.household().await;

    let (status, body) = srv
        .post(
            &format!("/children/{child_id}/stock-increment"),
            json!({ "clothing_category_id": 3, "increment": 4 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["current_count"], 4);
    assert_eq!(body["data"]["clothing_category_id"], 3);
    assert_eq!(body["data"]["clothing_category"]["name"], "Socks");

    let (status, body) = srv
        .post(
            &format!("/children/{child_id}/stock-decrement"),
            json!({ "clothing_category_id": 3, "decrement": 4 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["current_count"], 0);

    let (status, body) = srv
        .post(
            &format!("/children/{child_id}/stock-decrement"),
            json!({ "clothing_category_id": 3, "decrement": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);

    let (_, stock) = srv.get(&format!("/children/{child_id}/stock")).await;
    assert_eq!(stock["data"][0]["current_count"], 0);
}

#[tokio::test]
async fn stock_mutation_failures_map_to_statuses() {
    let srv = TestServer::spawn().await;
    let (_, child_id) = srv.household().await;
    let inc = format!("/children/{child_id}/stock-increment");

    let (status, _) = srv
        .post(&inc, json!({ "clothing_category_id": 999, "increment": 1 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = srv
        .post(&inc, json!({ "clothing_category_id": 1, "increment": 0 }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["increment"].is_array());

    let (status, _) = srv
        .post(
            "/children/0190a4b2-0000-7000-8000-000000000000/stock-increment",
            json!({ "clothing_category_id": 1, "increment": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, stock) = srv.get(&format!("/children/{child_id}/stock")).await;
    assert_eq!(stock["data"], json!([]));
}

#[tokio::test]
async fn stock_listing_follows_category_order() {
    let srv = TestServer::spawn().await;
    let (_, child_id) = srv.household().await;

    for category in [6, 1, 4] {
        let (status, _) = srv
            .post(
                &format!("/children/{child_id}/stock-increment"),
                json!({ "clothing_category_id": category, "increment": 1 }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = srv.get(&format!("/children/{child_id}/stock")).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["clothing_category_id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 4, 6]);
}

#[tokio::test]
async fn concurrent_decrements_over_http_admit_exactly_one() {
    let srv = TestServer::spawn().await;
    let (_, child_id) = srv.household().await;

    srv.post(
        &format!("/children/{child_id}/stock-increment"),
        json!({ "clothing_category_id": 2, "increment": 1 }),
    )
    .await;

    let path = format!("/children/{child_id}/stock-decrement");
    let body = json!({ "clothing_category_id": 2, "decrement": 1 });
    let (a, b) = tokio::join!(srv.post(&path, body.clone()), srv.post(&path, body.clone()));

    let mut statuses = [a.0, b.0];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::UNPROCESSABLE_ENTITY]);
}

#[tokio::test]
async fn categories_are_seeded_in_display_order() {
    let srv = TestServer::spawn().await;
    let (status, body) = srv.get("/clothing-categories").await;
    assert_eq!(status, StatusCode::OK);

    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 8);
    assert_eq!(names[0], "T-shirts");
    assert_eq!(names[7], "Plastic bags");
}
