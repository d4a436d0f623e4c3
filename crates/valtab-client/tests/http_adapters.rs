//! # Integration Tests for HTTP Adapters
//!
//! Exercises [`NtaClient`] and [`WebhookNotifier`] against wiremock servers:
//! request headers, status handling, and body shapes.

use valtab_client::{ClientConfig, NtaClient, WebhookNotifier};
use valtab_update::{DocumentSource, Notification, NotificationKind, Notifier, PortError};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zeroize::Zeroizing;

fn client() -> NtaClient {
    let config = ClientConfig {
        timeout_secs: 5,
        max_retries: 0,
        user_agent: "valtab-test/1.0".into(),
    };
    NtaClient::new(&config).expect("client build")
}

#[tokio::test]
async fn fetch_index_sends_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/law/tsutatsu/kobetsu/hyoka/index.htm"))
        .and(header("User-Agent", "valtab-test/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<a href=\"/x.pdf\">x</a>"))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/law/tsutatsu/kobetsu/hyoka/index.htm", server.uri());
    let text = client().fetch_index(&url).await.expect("index");
    assert!(text.contains("/x.pdf"));
}

#[tokio::test]
async fn fetch_document_returns_raw_bytes() {
    let server = MockServer::start().await;
    let body = vec![0x25, 0x50, 0x44, 0x46, 0x00, 0xff];
    Mock::given(method("GET"))
        .and(path("/hyoka/202504/0405.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .mount(&server)
        .await;

    let url = format!("{}/hyoka/202504/0405.pdf", server.uri());
    assert_eq!(client().fetch_document(&url).await.unwrap(), body);
}

#[tokio::test]
async fn not_found_is_retrieval_error_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.pdf"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/missing.pdf", server.uri());
    let err = client().fetch_document(&url).await.unwrap_err();
    match err {
        PortError::Retrieval { url: failed, message } => {
            assert_eq!(failed, url);
            assert!(message.contains("404"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

fn notification() -> Notification {
    Notification {
        kind: NotificationKind::Error,
        title: "Valuation table update failed".into(),
        message: "discovery failed".into(),
        details: serde_json::json!({"durationMs": 12}),
    }
}

#[tokio::test]
async fn webhook_posts_slack_compatible_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/services/hook"))
        .and(body_partial_json(serde_json::json!({
            "username": "valtab",
            "type": "error",
            "title": "Valuation table update failed",
            "details": {"durationMs": 12}
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = WebhookNotifier::new(
        Zeroizing::new(format!("{}/services/hook", server.uri())),
        "valtab",
        5,
    )
    .unwrap();
    notifier.notify(&notification()).await.expect("delivered");
}

#[tokio::test]
async fn webhook_rejection_is_notification_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("down"))
        .mount(&server)
        .await;

    let notifier =
        WebhookNotifier::new(Zeroizing::new(server.uri()), "valtab", 5).unwrap();
    let err = notifier.notify(&notification()).await.unwrap_err();
    assert_eq!(err, PortError::Notification("webhook returned 500: down".into()));
}
