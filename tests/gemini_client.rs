use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    body::{Body, to_bytes},
    extract::{Path, Query, State},
    http::{Request, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::{Duration, TimeZone, Utc};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower::ServiceExt;

use newsscript::AppState;
use newsscript::api::routes::create_router;
use newsscript::cache::{ManualClock, TtlCache};
use newsscript::config::{ApiKeySource, Config, SourceAttribution};
use newsscript::llm::GeminiClient;
use newsscript::service::NewsService;

const KEY: &str = "stub-key-0123456789";

const TWO_STORIES: &str = r#"[
  {"title":"Harvest festival","summary":"Farmers share surplus.","ideology":"Generosity","scripture_ref":"Prov 11:25","scripture_text":"The liberal soul shall be made fat","application":"Sharing enriches the giver"},
  {"title":"Port strike","summary":"Workers demand fair pay.","ideology":"Justice","scripture_ref":"Jas 5:4","scripture_text":"The hire of the labourers","application":"Wages withheld cry out"}
]"#;

/// Stands in for the Gemini API; the model name picks the canned answer.
#[derive(Default)]
struct Upstream {
    received: Mutex<Vec<(Option<String>, Value)>>,
}

impl Upstream {
    fn calls(&self) -> usize {
        self.received.lock().unwrap().len()
    }
}

async fn generate_content(
    State(upstream): State<Arc<Upstream>>,
    Path(model): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    upstream
        .received
        .lock()
        .unwrap()
        .push((query.get("key").cloned(), body));

    if model.starts_with("rate-limited") {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": { "code": 429, "status": "RESOURCE_EXHAUSTED" } })),
        )
            .into_response();
    }
    if model.starts_with("unavailable") {
        return (StatusCode::SERVICE_UNAVAILABLE, "upstream unavailable").into_response();
    }
    if model.starts_with("gateway") {
        return (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html")],
            "<html>upstream gateway page</html>",
        )
            .into_response();
    }

    Json(json!({
        "candidates": [{
            "content": { "parts": [{ "text": TWO_STORIES }] },
            "groundingMetadata": {
                "groundingChunks": [
                    { "web": { "uri": "https://news.example/harvest", "title": "Harvest" } }
                ]
            }
        }]
    }))
    .into_response()
}

async fn spawn_upstream() -> (String, Arc<Upstream>) {
    let upstream = Arc::new(Upstream::default());
    let app = Router::new()
        .route("/v1beta/models/:model", post(generate_content))
        .with_state(upstream.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), upstream)
}

struct Proxy {
    app: Router,
    cache: Arc<TtlCache>,
    upstream: Arc<Upstream>,
}

async fn proxy(model: &str, attribution: SourceAttribution) -> Proxy {
    let (base_url, upstream) = spawn_upstream().await;
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2026, 7, 1, 6, 0, 0).unwrap()));
    let cache = Arc::new(TtlCache::new(Duration::hours(4), clock));
    let config = Config {
        api_key: ApiKeySource::Static(Some(KEY.to_string())),
        gemini_base_url: base_url.clone(),
        gemini_model: model.to_string(),
        source_attribution: attribution,
        ..Config::default()
    };
    let news = NewsService::new(
        Arc::new(GeminiClient::new(base_url, model)),
        cache.clone(),
        config.api_key.clone(),
        config.source_attribution,
    );
    let app = create_router(AppState {
        config: Arc::new(config),
        news: Arc::new(news),
    });

    Proxy {
        app,
        cache,
        upstream,
    }
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn rate_limited_provider_status_is_mirrored() {
    let p = proxy("rate-limited", SourceAttribution::None).await;

    let (status, body) = get(&p.app, "/api/news?continent=Europe").await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "Gemini error");
    assert_eq!(body["details"]["error"]["code"], 429);
    assert!(p.cache.is_empty());

    let received = p.upstream.received.lock().unwrap();
    let (key, request) = &received[0];
    assert_eq!(key.as_deref(), Some(KEY));
    assert_eq!(request["tools"][0]["googleSearch"], json!({}));
    assert_eq!(request["contents"][0]["role"], "user");
    assert!(
        request["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("continent of Europe today")
    );
}

#[tokio::test]
async fn plain_text_error_body_is_passed_through() {
    let p = proxy("unavailable", SourceAttribution::None).await;

    let (status, body) = get(&p.app, "/api/news?continent=Asia").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["details"], "upstream unavailable");
    assert!(p.cache.is_empty());
}

#[tokio::test]
async fn non_json_success_body_is_an_error_and_not_cached() {
    let p = proxy("gateway", SourceAttribution::None).await;

    let (status, body) = get(&p.app, "/api/news?continent=Europe").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Server exception");
    assert!(body["message"].as_str().unwrap().contains("non-JSON"));
    assert!(p.cache.is_empty());

    get(&p.app, "/api/news?continent=Europe").await;
    assert_eq!(p.upstream.calls(), 2);
}

#[tokio::test]
async fn grounded_reply_links_sources_by_position() {
    let p = proxy("grounded", SourceAttribution::Index).await;

    let (status, body) = get(&p.app, "/api/news?continent=Africa").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sources"], json!([{ "title": "Harvest", "uri": "https://news.example/harvest" }]));
    assert_eq!(body["stories"][0]["id"], "Africa-0");
    assert_eq!(body["stories"][0]["sourceUrl"], "https://news.example/harvest");
    assert_eq!(body["stories"][1]["sourceUrl"], "https://news.example/harvest");
    assert!(p.cache.get("africa").is_some());

    let (status, _) = get(&p.app, "/api/news?continent=Africa").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(p.upstream.calls(), 1);
}
