use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::json;
use vtrans_api::app::services::AppServices;
use vtrans_infra::ServerConfig;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const UNIT: Duration = Duration::from_millis(10);

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(config: ServerConfig) -> Self {
        // Same router as prod, bound to an ephemeral port.
        let services = Arc::new(AppServices::start(&config).expect("failed to start services"));
        let app = vtrans_api::app::build_app(services);
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

    async fn status(&self, client: &reqwest::Client) -> serde_json::Value {
        let res = client
            .get(format!("{}/status", self.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        res.json().await.unwrap()
    }

    async fn register(&self, client: &reqwest::Client, webhook_url: &str) -> reqwest::Response {
        client
            .post(format!("{}/register_webhook", self.base_url))
            .form(&[("webhook_url", webhook_url)])
            .send()
            .await
            .unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn fast_config(length: u64, error_probability: f64) -> ServerConfig {
    ServerConfig::default()
        .with_time_unit(UNIT)
        .with_length_of_translation(length)
        .with_error_probability(error_probability)
}

async fn status_eventually(srv: &TestServer, client: &reqwest::Client) -> String {
    // The job settles in the background; poll briefly until it does.
    for _ in 0..200 {
        let body = srv.status(client).await;
        let status = body["status"].as_str().unwrap().to_string();
        if status != "pending" {
            return status;
        }
        tokio::time::sleep(UNIT).await;
    }

    panic!("job did not settle within timeout");
}

async fn requests_eventually(mock_server: &MockServer, expected: usize) -> Vec<wiremock::Request> {
    for _ in 0..300 {
        let received = mock_server.received_requests().await.unwrap_or_default();
        if received.len() >= expected {
            return received;
        }
        tokio::time::sleep(UNIT).await;
    }

    panic!("expected {expected} webhook call(s)");
}

#[tokio::test]
async fn health_is_ok() {
    let srv = TestServer::spawn(fast_config(20, 0.1)).await;

    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn status_is_pending_right_after_startup() {
    let config = ServerConfig::default().with_length_of_translation(20);
    let srv = TestServer::spawn(config).await;

    let client = reqwest::Client::new();
    assert_eq!(srv.status(&client).await, json!({"status": "pending"}));
}

#[tokio::test]
async fn zero_length_job_without_errors_completes() {
    let srv = TestServer::spawn(fast_config(0, 0.0)).await;

    let client = reqwest::Client::new();
    assert_eq!(status_eventually(&srv, &client).await, "completed");
}

#[tokio::test]
async fn certain_failure_reports_error_and_stays_there() {
    let srv = TestServer::spawn(fast_config(0, 1.0)).await;

    let client = reqwest::Client::new();
    assert_eq!(status_eventually(&srv, &client).await, "error");

    tokio::time::sleep(UNIT * 5).await;
    assert_eq!(srv.status(&client).await, json!({"status": "error"}));
}

#[tokio::test]
async fn register_webhook_requires_url() {
    let srv = TestServer::spawn(fast_config(20, 0.1)).await;
    let client = reqwest::Client::new();

    let missing = client
        .post(format!("{}/register_webhook", srv.base_url))
        .form(&[("other", "x")])
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = missing.json().await.unwrap();
    assert_eq!(body["error"], "missing_webhook_url");

    let empty = srv.register(&client, "").await;
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

    let not_a_url = srv.register(&client, "localhost webhook").await;
    assert_eq!(not_a_url.status(), StatusCode::BAD_REQUEST);

    let json_body = client
        .post(format!("{}/register_webhook", srv.base_url))
        .json(&json!({"webhook_url": "http://localhost:1/webhook"}))
        .send()
        .await
        .unwrap();
    assert_eq!(json_body.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_webhook_acknowledges_immediately() {
    let srv = TestServer::spawn(fast_config(20, 0.1)).await;
    let client = reqwest::Client::new();

    let res = srv.register(&client, "http://127.0.0.1:1/webhook").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body, json!({"message": "Webhook registered"}));
}

#[tokio::test]
async fn early_registration_gets_one_callback_after_completion() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Update received"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let srv = TestServer::spawn(fast_config(10, 0.0)).await;
    let client = reqwest::Client::new();

    let res = srv.register(&client, &format!("{}/webhook", mock_server.uri())).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(mock_server.received_requests().await.unwrap().is_empty());

    let received = requests_eventually(&mock_server, 1).await;
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(body, json!({"status": "completed"}));
    assert_eq!(srv.status(&client).await, json!({"status": "completed"}));

    tokio::time::sleep(UNIT * 10).await;
    mock_server.verify().await;
}

#[tokio::test]
async fn late_registration_still_gets_exactly_one_callback() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let srv = TestServer::spawn(fast_config(0, 1.0)).await;
    let client = reqwest::Client::new();
    assert_eq!(status_eventually(&srv, &client).await, "error");

    let res = srv.register(&client, &format!("{}/webhook", mock_server.uri())).await;
    assert_eq!(res.status(), StatusCode::OK);

    let received = requests_eventually(&mock_server, 1).await;
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(body, json!({"status": "error"}));

    tokio::time::sleep(UNIT * 10).await;
    mock_server.verify().await;
}

#[tokio::test]
async fn failed_callbacks_are_retried_until_acknowledged() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/webhook"))
        .respond_with(ResponseTemplate::new(200))
        .with_priority(2)
        .mount(&mock_server)
        .await;

    let srv = TestServer::spawn(fast_config(0, 0.0)).await;
    let client = reqwest::Client::new();
    srv.register(&client, &format!("{}/webhook", mock_server.uri())).await;

    requests_eventually(&mock_server, 3).await;

    // Acknowledged on the third attempt: nothing more is sent.
    tokio::time::sleep(UNIT * 20).await;
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn exhausted_callbacks_leave_status_untouched() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let srv = TestServer::spawn(fast_config(0, 0.0).with_retry_attempts(3)).await;
    let client = reqwest::Client::new();
    assert_eq!(status_eventually(&srv, &client).await, "completed");

    let res = srv.register(&client, &format!("{}/webhook", mock_server.uri())).await;
    assert_eq!(res.status(), StatusCode::OK);

    requests_eventually(&mock_server, 3).await;

    // Gave up after three attempts; the job itself is still reported as completed.
    tokio::time::sleep(UNIT * 20).await;
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);
    assert_eq!(srv.status(&client).await, json!({"status": "completed"}));

    // A fresh registration does not restart a given-up delivery.
    srv.register(&client, &format!("{}/webhook", mock_server.uri())).await;
    tokio::time::sleep(UNIT * 10).await;
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);
}
