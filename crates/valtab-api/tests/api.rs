//! HTTP surface against in-memory collaborators.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;
use valtab_api::state::{AppConfig, AppState, Collaborators};
use valtab_api::store::MemoryStore;
use valtab_client::Utf8Passthrough;
use valtab_core::RecordKind;
use valtab_update::memory::{MemoryDocuments, RecordingNotifier};
use valtab_update::{NotificationKind, PipelineConfig};

const SECRET: &str = "test-cron-secret";
const INDEX_URL: &str = "https://www.nta.go.jp/law/tsutatsu/kobetsu/hyoka/index.htm";
const ANNUAL_URL: &str = "https://www.nta.go.jp/law/tsutatsu/kobetsu/hyoka/r07/0601/pdf/01.pdf";
const BIMONTHLY_URL: &str = "https://www.nta.go.jp/law/tsutatsu/kobetsu/hyoka/200706/06_07.pdf";

const INDEX_HTML: &str = r#"<html><body>
<a href="/law/tsutatsu/kobetsu/hyoka/r07/0601/pdf/01.pdf">類似業種比準価額</a>
<a href="/law/tsutatsu/kobetsu/hyoka/200706/06_07.pdf">配当還元率</a>
</body></html>"#;

const ANNUAL_TEXT: &str = "01 製造業 1,500 2.5 8 1,200\n02 建設業 900 1.5 6 800\n";
const BIMONTHLY_TEXT: &str = "0万円～50万円 10.0%\n50万円～100万円 8.0%\n";

struct TestApp {
    router: Router,
    store: MemoryStore,
    notifier: Arc<RecordingNotifier>,
}

fn site() -> MemoryDocuments {
    MemoryDocuments::new()
        .with(INDEX_URL, INDEX_HTML)
        .with(ANNUAL_URL, ANNUAL_TEXT)
        .with(BIMONTHLY_URL, BIMONTHLY_TEXT)
}

fn test_app(documents: MemoryDocuments, secret: Option<&str>) -> TestApp {
    let store = MemoryStore::new();
    let notifier = Arc::new(RecordingNotifier::new());
    let config = AppConfig {
        cron_secret: secret.map(str::to_string),
        ..AppConfig::default()
    };
    let collaborators = Collaborators {
        documents: Arc::new(documents),
        text: Arc::new(Utf8Passthrough),
        notifier: notifier.clone(),
    };
    let state = AppState::assemble(
        config,
        Arc::new(PipelineConfig::default()),
        collaborators,
        Arc::new(store.clone()),
        None,
    )
    .unwrap();
    TestApp {
        router: valtab_api::app(state),
        store,
        notifier,
    }
}

fn request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(router: &Router, req: Request<Body>) -> (StatusCode, String) {
    let response = router.clone().oneshot(req).await.unwrap();
    let status = response.status();
    (status, body_string(response).await)
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn trigger(app: &TestApp) -> (StatusCode, serde_json::Value) {
    let (status, body) = send(
        &app.router,
        request("POST", "/api/cron/update-tax-data", Some(SECRET)),
    )
    .await;
    (status, serde_json::from_str(&body).unwrap())
}

// -- Health ------------------------------------------------------------------

#[tokio::test]
async fn health_probes_need_no_credentials() {
    let app = test_app(site(), Some(SECRET));
    let (status, body) = send(&app.router, request("GET", "/health/liveness", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");

    let (status, body) = send(&app.router, request("GET", "/health/readiness", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ready");
}

// -- Trigger -----------------------------------------------------------------

#[tokio::test]
async fn trigger_without_token_is_rejected_and_runs_nothing() {
    let app = test_app(site(), Some(SECRET));
    let (status, _) = send(
        &app.router,
        request("POST", "/api/cron/update-tax-data", None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(app.store.history().is_empty());
}

#[tokio::test]
async fn trigger_with_wrong_token_is_rejected() {
    let app = test_app(site(), Some(SECRET));
    let (status, _) = send(
        &app.router,
        request("POST", "/api/cron/update-tax-data", Some("guess")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn trigger_rejects_everything_when_secret_unset() {
    let app = test_app(site(), None);
    let (status, _) = send(
        &app.router,
        request("POST", "/api/cron/update-tax-data", Some("")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn trigger_with_get_is_method_not_allowed() {
    let app = test_app(site(), Some(SECRET));
    let (status, _) = send(
        &app.router,
        request("GET", "/api/cron/update-tax-data", None),
    )
    .await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn trigger_runs_cycle_and_reports_each_source() {
    let app = test_app(site(), Some(SECRET));
    let (status, json) = trigger(&app).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert!(json["duration"].is_u64());
    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["category"], "annual");
    assert_eq!(results[0]["status"], "completed");
    assert_eq!(results[0]["counts"]["persisted"], 2);
    assert_eq!(results[1]["category"], "bimonthly");

    assert_eq!(app.store.snapshot(RecordKind::ComparableIndustry).len(), 2);
    assert_eq!(app.store.snapshot(RecordKind::DividendReduction).len(), 2);
    assert_eq!(app.store.history().len(), 2);
}

#[tokio::test]
async fn repeated_trigger_replaces_rows_instead_of_duplicating() {
    let app = test_app(site(), Some(SECRET));
    trigger(&app).await;
    let (status, json) = trigger(&app).await;

    // The 2007 releases are older than every staleness threshold.
    assert_eq!(status, StatusCode::OK);
    for result in json["results"].as_array().unwrap() {
        assert_eq!(result["status"], "completed", "{result}");
        assert!(result["reason"].as_str().unwrap().contains("exceeds"));
    }
    assert_eq!(app.store.snapshot(RecordKind::ComparableIndustry).len(), 2);
    assert_eq!(app.store.snapshot(RecordKind::DividendReduction).len(), 2);
    assert_eq!(app.store.history().len(), 4);
}

#[tokio::test]
async fn missing_index_answers_failure_envelope() {
    let app = test_app(MemoryDocuments::new(), Some(SECRET));
    let (status, json) = trigger(&app).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("index retrieval failed"));
    assert!(json["duration"].is_u64());
    assert!(app.store.snapshot(RecordKind::ComparableIndustry).is_empty());

    let sent = app.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].kind, NotificationKind::Error);
}

// -- History and status ------------------------------------------------------

#[tokio::test]
async fn history_lists_newest_first_with_filters() {
    let app = test_app(site(), Some(SECRET));
    trigger(&app).await;

    let (status, body) = send(&app.router, request("GET", "/v1/history", Some(SECRET))).await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["entries"].as_array().unwrap().len(), 2);

    let (_, body) = send(
        &app.router,
        request("GET", "/v1/history?data_type=dividend_reduction", Some(SECRET)),
    )
    .await;
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    let entries = json["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["dataType"], "dividend_reduction");
    assert_eq!(entries[0]["status"], "completed");

    let (_, body) = send(
        &app.router,
        request("GET", "/v1/history?limit=1", Some(SECRET)),
    )
    .await;
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["entries"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn history_rejects_unknown_data_type() {
    let app = test_app(site(), Some(SECRET));
    let (status, body) = send(
        &app.router,
        request("GET", "/v1/history?data_type=stock_prices", Some(SECRET)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn history_requires_token() {
    let app = test_app(site(), Some(SECRET));
    let (status, _) = send(&app.router, request("GET", "/v1/history", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn status_reports_stored_rows_per_data_type() {
    let app = test_app(site(), Some(SECRET));
    trigger(&app).await;

    let (status, body) = send(&app.router, request("GET", "/v1/status", Some(SECRET))).await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"]["totalRecords"], 4);
    let data_types = json["status"]["dataTypes"].as_array().unwrap();
    assert_eq!(data_types.len(), 3);
    assert_eq!(data_types[0]["dataType"], "comparable_industry");
    assert_eq!(data_types[0]["storedRecords"], 2);
    assert_eq!(data_types[0]["latestPeriod"]["year"], 2007);
    assert_eq!(data_types[2]["storedRecords"], 0);
    assert!(data_types[2]["lastUpdate"].is_null());
}

#[tokio::test]
async fn openapi_spec_is_served_to_authenticated_callers() {
    let app = test_app(site(), Some(SECRET));
    let (status, body) = send(&app.router, request("GET", "/openapi.json", Some(SECRET))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("/api/cron/update-tax-data"));
}
