use gift_products::CatalogPolicy;
use reqwest::StatusCode;
use serde_json::{json, Value};

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, over an in-memory store on an ephemeral port.
        let service = gift_api::app::services::in_memory_service(CatalogPolicy::default());
        let app = gift_api::app::build_app(service);
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

    async fn create(&self, body: Value) -> reqwest::Response {
        self.client
            .post(self.url("/products"))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mug() -> Value {
    json!({ "name": "Mug", "price": 1000, "imageUrl": "http://x/y.png" })
}

async fn error_code(res: reqwest::Response) -> String {
    let body: Value = res.json().await.unwrap();
    assert!(body["message"].is_string(), "{body}");
    body["error"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_ok() {
    let server = TestServer::spawn().await;

    let res = server.get("/health").await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({ "status": "ok" }));
}

#[tokio::test]
async fn create_then_get_round_trips_camel_case_fields() {
    let server = TestServer::spawn().await;

    let res = server.create(mug()).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    let id = created["id"].as_i64().unwrap();
    assert!(id > 0);

    let res = server.get(&format!("/products/{id}")).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({ "id": id, "name": "Mug", "price": 1000, "imageUrl": "http://x/y.png" })
    );
}

#[tokio::test]
async fn list_wraps_products_in_items() {
    let server = TestServer::spawn().await;

    let res = server.get("/products").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({ "items": [] }));

    server.create(mug()).await;
    server
        .create(json!({ "name": "Cup", "price": 500, "imageUrl": "https://cdn.example.com/cup.png" }))
        .await;

    let body: Value = server.get("/products").await.json().await.unwrap();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
}

#[tokio::test]
async fn unknown_id_is_404() {
    let server = TestServer::spawn().await;

    let res = server.get("/products/42").await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_code(res).await, "not_found");
}

#[tokio::test]
async fn unparsable_path_id_is_400_validation_error() {
    let server = TestServer::spawn().await;

    for path in ["/products/abc", "/products/0", "/products/-3"] {
        let res = server.get(path).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{path}");
        assert_eq!(error_code(res).await, "validation_error", "{path}");
    }
}

#[tokio::test]
async fn reserved_keyword_is_400_invalid_argument() {
    let server = TestServer::spawn().await;

    let res = server
        .create(json!({ "name": "카카오머그", "price": 1000, "imageUrl": "http://x/y.png" }))
        .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(res).await, "invalid_argument");

    let body: Value = server.get("/products").await.json().await.unwrap();
    assert_eq!(body["items"], json!([]));
}

#[tokio::test]
async fn duplicate_name_is_400_invalid_argument() {
    let server = TestServer::spawn().await;
    assert_eq!(server.create(mug()).await.status(), StatusCode::CREATED);

    let res = server.create(mug()).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(res).await, "invalid_argument");
}

#[tokio::test]
async fn malformed_bodies_are_400_validation_error() {
    let server = TestServer::spawn().await;

    for body in [
        json!({ "name": "Mug", "imageUrl": "http://x/y.png" }),
        json!({ "name": "Mug", "price": -1, "imageUrl": "http://x/y.png" }),
        json!({ "name": "", "price": 1, "imageUrl": "http://x/y.png" }),
        json!({ "name": "Mug", "price": 1, "imageUrl": "ftp://x/y.png" }),
        json!({ "name": "Mug", "price": "cheap", "imageUrl": "http://x/y.png" }),
    ] {
        let res = server.create(body.clone()).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(error_code(res).await, "validation_error", "{body}");
    }

    let res = server
        .client
        .post(server.url("/products"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(res).await, "validation_error");
}

#[tokio::test]
async fn update_replaces_fields_and_unknown_id_is_404() {
    let server = TestServer::spawn().await;
    let created: Value = server.create(mug()).await.json().await.unwrap();
    let id = created["id"].as_i64().unwrap();

    let res = server
        .client
        .put(server.url("/products"))
        .json(&json!({ "id": id, "name": "Big Mug", "price": 1500, "imageUrl": "http://x/big.png" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({ "id": id, "name": "Big Mug", "price": 1500, "imageUrl": "http://x/big.png" })
    );

    let res = server
        .client
        .put(server.url("/products"))
        .json(&json!({ "id": id + 1, "name": "Cup", "price": 1, "imageUrl": "http://x/cup.png" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_code(res).await, "not_found");
}

#[tokio::test]
async fn delete_is_204_then_404() {
    let server = TestServer::spawn().await;
    let created: Value = server.create(mug()).await.json().await.unwrap();
    let path = format!("/products/{}", created["id"]);

    let res = server.client.delete(server.url(&path)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    assert_eq!(server.get(&path).await.status(), StatusCode::NOT_FOUND);
    let res = server.client.delete(server.url(&path)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
