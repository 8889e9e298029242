//! Outbound webhook transport.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use vtrans_core::JobStatus;

/// Body of a status callback: `{"status": "completed"|"error"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub status: JobStatus,
}

/// What the receiver answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acknowledgement {
    pub status_code: u16,
}

impl Acknowledgement {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Failure to get any answer from the receiver.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("request timed out")]
    Timeout,
    #[error("could not reach webhook target: {0}")]
    Transport(String),
}

/// Pushes a status to a callback target.
#[async_trait]
pub trait WebhookSender: Send + Sync + 'static {
    async fn send(&self, target: &Url, status: JobStatus) -> Result<Acknowledgement, SendError>;
}

/// reqwest-backed sender.
#[derive(Debug, Clone)]
pub struct HttpWebhookSender {
    client: reqwest::Client,
}

impl HttpWebhookSender {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("vtrans/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl WebhookSender for HttpWebhookSender {
    async fn send(&self, target: &Url, status: JobStatus) -> Result<Acknowledgement, SendError> {
        let resp = self
            .client
            .post(target.clone())
            .json(&WebhookPayload { status })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SendError::Timeout
                } else {
                    SendError::Transport(e.to_string())
                }
            })?;

        Ok(Acknowledgement {
            status_code: resp.status().as_u16(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn posts_status_as_json() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhook"))
            .and(body_json(serde_json::json!({"status": "completed"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"message": "Update received"})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let sender = HttpWebhookSender::new(Duration::from_secs(5)).unwrap();
        let target = Url::parse(&format!("{}/webhook", mock_server.uri())).unwrap();
        let ack = sender.send(&target, JobStatus::Completed).await.unwrap();

        assert!(ack.is_success());
        mock_server.verify().await;
    }

    #[tokio::test]
    async fn non_success_status_is_reported_not_raised() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let sender = HttpWebhookSender::new(Duration::from_secs(5)).unwrap();
        let target = Url::parse(&mock_server.uri()).unwrap();
        let ack = sender.send(&target, JobStatus::Error).await.unwrap();

        assert_eq!(ack.status_code, 503);
        assert!(!ack.is_success());
    }

    #[tokio::test]
    async fn unreachable_target_is_a_transport_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let sender = HttpWebhookSender::new(Duration::from_secs(2)).unwrap();
        let target = Url::parse(&format!("http://127.0.0.1:{port}/webhook")).unwrap();

        let err = sender.send(&target, JobStatus::Completed).await.unwrap_err();
        assert!(matches!(err, SendError::Transport(_) | SendError::Timeout));
    }
}
