use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use kaleido_api::{app::build_router, config::Config, state::AppState};
use kaleido_llm::Message;
use kaleido_persist::InMemoryStore;
use kaleido_search::{
    Oracle, OutputSchema, Result, Retriever, SearchError, SearchOrchestrator, StructuredOutput,
};
use kaleido_types::{Product, RetrievedDocument, Shop};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

struct QueuedOracle(Mutex<VecDeque<Value>>);

impl QueuedOracle {
    fn new(replies: Vec<Value>) -> Self {
        Self(Mutex::new(replies.into()))
    }
}

#[async_trait]
impl Oracle for QueuedOracle {
    async fn invoke(&self, _transcript: &[Message]) -> Result<Message> {
        Ok(Message::ai("ok"))
    }

    async fn invoke_structured(
        &self,
        _transcript: &[Message],
        schema: OutputSchema,
    ) -> Result<StructuredOutput> {
        let next = self.0.lock().unwrap().pop_front();
        match next {
            Some(payload) => schema.parse(payload),
            None => Err(SearchError::Oracle(anyhow::anyhow!("no reply queued"))),
        }
    }
}

struct StaticRetriever;

#[async_trait]
impl Retriever for StaticRetriever {
    async fn search(&self, _query: &str) -> anyhow::Result<Vec<RetrievedDocument>> {
        Ok(vec![
            RetrievedDocument::new(1, "Nitro 5 with RTX 4050"),
            RetrievedDocument::new(2, "Office ultrabook"),
        ])
    }
}

fn laptop() -> Product {
    Product {
        id: 1,
        title: "Nitro 5".to_string(),
        price: 949.0,
        url: "https://shop.example/p/1".to_string(),
        thumbnail_url: None,
        shop: Shop {
            name: "Example".to_string(),
            url: "https://shop.example".to_string(),
        },
    }
}

fn app(replies: Vec<Value>) -> (Router, Arc<InMemoryStore>) {
    let config = Config::from_file(concat!(env!("CARGO_MANIFEST_DIR"), "/config/default.toml")).unwrap();
    let store = Arc::new(InMemoryStore::with_products(vec![laptop()]));
    let search = SearchOrchestrator::builder()
        .oracle(Arc::new(QueuedOracle::new(replies)))
        .thread_store(store.clone())
        .checkpoint_store(store.clone())
        .product_lookup(store.clone())
        .retriever(Arc::new(StaticRetriever))
        .build()
        .unwrap();
    let state = Arc::new(AppState::new(config, search, "memory"));
    (build_router(state), store)
}

fn request(method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn first_turn() -> Value {
    json!({
        "valid": false,
        "answered_questions": [],
        "follow_up_questions": [
            {"id": 0, "short": "Use", "long": "What will you use it for?"}
        ],
        "cleaned_query": "laptop"
    })
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app(vec![]);

    let response = app.oneshot(request("GET", "/health", None, None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["memory"], "connected");
}

#[tokio::test]
async fn test_missing_user_header_is_unauthorized() {
    let (app, _) = app(vec![]);

    let response = app.oneshot(request("GET", "/me/threads", None, None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(json_body(response).await["error"].is_string());
}

#[tokio::test]
async fn test_post_without_body_creates_empty_thread() {
    let (app, store) = app(vec![]);

    let response = app
        .oneshot(request("POST", "/me/threads", Some("u1"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["valid"], false);
    assert!(body["cleaned_query"].is_null());
    assert!(body["thread_id"].is_string());
    assert_eq!(store.thread_count().await, 1);
}

#[tokio::test]
async fn test_failed_first_turn_returns_error_and_no_thread() {
    let (app, store) = app(vec![json!({"valid": "nope"})]);

    let response = app
        .oneshot(request("POST", "/me/threads", Some("u1"), Some(json!({"query": "laptop"}))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(store.thread_count().await, 0);
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let (app, store) = app(vec![]);
    let req = Request::builder()
        .method("POST")
        .uri("/me/threads")
        .header("x-user-id", "u1")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(req).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(store.thread_count().await, 0);
}

#[tokio::test]
async fn test_conversation_to_recommendations() {
    let (app, _) = app(vec![
        first_turn(),
        json!({
            "valid": true,
            "answered_questions": [{"id": 0, "answer": "gaming"}],
            "follow_up_questions": [],
            "cleaned_query": "gaming laptop"
        }),
        json!({"verdicts": [{"id": 1, "relevant": true}, {"id": 2, "relevant": false}]}),
        json!({"summaries": [{"id": 1, "title": "Nitro 5", "description": "Budget gaming laptop"}]}),
    ]);

    let response = app
        .clone()
        .oneshot(request("POST", "/me/threads", Some("u1"), Some(json!({"query": "I need a laptop"}))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let thread_id = json_body(response).await["thread_id"].as_str().unwrap().to_string();

    let uri = format!("/me/threads/{}", thread_id);
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &uri,
            Some("u1"),
            Some(json!({"answers": [{"id": 0, "answer": "gaming"}]})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["cleaned_query"], "gaming laptop");

    let response = app
        .clone()
        .oneshot(request("GET", &uri, Some("u1"), None))
        .await
        .unwrap();
    assert_eq!(json_body(response).await["answered_questions"][0]["answer"], "gaming");

    let response = app
        .oneshot(request("GET", &format!("{}/recommendations", uri), Some("u1"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let products = body.as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["id"], 1);
    assert_eq!(products[0]["description"], "Budget gaming laptop");
    assert_eq!(products[0]["ai_title"], "Nitro 5");
    assert_eq!(products[0]["shop"]["name"], "Example");
}

#[tokio::test]
async fn test_error_statuses_for_thread_routes() {
    let (app, _) = app(vec![first_turn()]);

    let response = app
        .clone()
        .oneshot(request("POST", "/me/threads", Some("owner"), None))
        .await
        .unwrap();
    let thread_id = json_body(response).await["thread_id"].as_str().unwrap().to_string();
    let uri = format!("/me/threads/{}", thread_id);

    let response = app
        .clone()
        .oneshot(request("GET", &format!("{}/recommendations", uri), Some("owner"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .clone()
        .oneshot(request("GET", &uri, Some("intruder"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(request("POST", &uri, Some("owner"), Some(json!({"query": "  "}))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(request("POST", &uri, Some("owner"), Some(json!({"query": "laptop"}))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &uri,
            Some("owner"),
            Some(json!({"answers": [{"id": 9, "answer": "blue"}]})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(request("DELETE", &uri, Some("owner"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(request("GET", &uri, Some("owner"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_threads_only_shows_callers_threads() {
    let (app, _) = app(vec![]);
    for user in ["u1", "u1", "u2"] {
        app.clone()
            .oneshot(request("POST", "/me/threads", Some(user), None))
            .await
            .unwrap();
    }

    let response = app
        .oneshot(request("GET", "/me/threads", Some("u1"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["threads"].as_array().unwrap().len(), 2);
}
