//! Status polling with bounded retries.

use std::time::Duration;

use tracing::{debug, info, warn};

use vtrans_core::{JobStatus, StatusReport};
use vtrans_infra::RetryPolicy;

use crate::config::ClientConfig;
use crate::error::ClientError;

/// Polls `GET /status` on the server.
#[derive(Debug, Clone)]
pub struct PollingClient {
    http: reqwest::Client,
    status_url: String,
    policy: RetryPolicy,
    polling_interval: Duration,
}

impl PollingClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_http(http, config))
    }

    pub fn with_http(http: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            http,
            status_url: format!("{}/status", config.server_url.trim_end_matches('/')),
            policy: config.retry_policy(),
            polling_interval: config.polling_interval(),
        }
    }

    /// Fetch the current status.
    ///
    /// Transport failures and 5xx answers are retried up to
    /// `policy.max_attempts` attempts in total, waiting
    /// `policy.delay_for_attempt(i)` after failed attempt `i`. Any answer
    /// that does not carry a recognizable status reads as
    /// [`JobStatus::Error`].
    pub async fn fetch_status(&self) -> Result<JobStatus, ClientError> {
        let mut last_error = String::from("no attempt made");
        let mut attempts = 0;

        for attempt in 1..=self.policy.max_attempts {
            attempts = attempt;
            match self.try_fetch().await {
                Ok(status) => {
                    debug!(attempt, status = %status, "status fetched");
                    return Ok(status);
                }
                Err(e) => {
                    warn!(attempt, url = %self.status_url, error = %e, "failed to retrieve status");
                    last_error = e;
                }
            }

            if self.policy.should_retry(attempt) {
                tokio::time::sleep(self.policy.delay_for_attempt(attempt)).await;
            }
        }

        Err(ClientError::Connectivity {
            attempts,
            last_error,
        })
    }

    async fn try_fetch(&self) -> Result<JobStatus, String> {
        let resp = self
            .http
            .get(&self.status_url)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if resp.status().is_server_error() {
            return Err(format!("server answered {}", resp.status()));
        }

        let body = resp.bytes().await.map_err(|e| e.to_string())?;
        let report = StatusReport::from_slice(&body);
        if report.known().is_none() {
            warn!(report = ?report, "unrecognized status payload; treating as error");
        }
        Ok(report.or_error())
    }

    /// Poll until the job settles, sleeping the polling interval while it is
    /// pending. Dropping the future stops polling.
    pub async fn poll_until_terminal(&self) -> Result<JobStatus, ClientError> {
        loop {
            let status = self.fetch_status().await?;
            if status.is_terminal() {
                info!(status = %status, "job settled");
                return Ok(status);
            }

            info!(
                interval_ms = self.polling_interval.as_millis() as u64,
                "translation still pending; checking again later"
            );
            tokio::time::sleep(self.polling_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use std::time::Instant;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const UNIT: Duration = Duration::from_millis(10);

    fn client_for(uri: &str, retries: u32) -> PollingClient {
        let config = ClientConfig::new(uri)
            .with_max_retries(retries)
            .with_polling_interval(1)
            .with_time_unit(UNIT);
        PollingClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn parses_status_field() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "completed"})))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server.uri(), 5);
        assert_eq!(client.fetch_status().await.unwrap(), JobStatus::Completed);
    }

    #[tokio::test]
    async fn unrecognized_payload_fails_closed() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"state": "done"})))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server.uri(), 5);
        assert_eq!(client.fetch_status().await.unwrap(), JobStatus::Error);
    }

    #[tokio::test]
    async fn recovers_from_transient_unavailability() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .with_priority(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "error"})))
            .with_priority(2)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server.uri(), 5);
        assert_eq!(client.fetch_status().await.unwrap(), JobStatus::Error);
        assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn persistent_server_errors_exhaust_retries() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server.uri(), 3);
        let err = client.fetch_status().await.unwrap_err();
        assert!(matches!(err, ClientError::Connectivity { attempts: 3, .. }));
        mock_server.verify().await;
    }

    #[tokio::test]
    async fn poll_until_terminal_waits_out_pending() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "pending"})))
            .up_to_n_times(3)
            .with_priority(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "completed"})))
            .with_priority(2)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server.uri(), 5);
        assert_eq!(client.poll_until_terminal().await.unwrap(), JobStatus::Completed);
        assert_eq!(mock_server.received_requests().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn dropped_connections_are_retried_with_growing_waits() {
        // Accept every connection and close it before answering.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let acceptor = tokio::spawn({
            let seen = seen.clone();
            async move {
                loop {
                    let (socket, _) = listener.accept().await.unwrap();
                    seen.lock().unwrap().push(Instant::now());
                    drop(socket);
                }
            }
        });

        let client = client_for(&format!("http://{addr}"), 4);
        let err = client.fetch_status().await.unwrap_err();
        acceptor.abort();

        match err {
            ClientError::Connectivity { attempts, .. } => assert_eq!(attempts, 4),
            other => panic!("unexpected error: {other}"),
        }

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 4, "one connection per attempt");
        let gaps: Vec<Duration> = seen.windows(2).map(|w| w[1] - w[0]).collect();
        for (i, gap) in gaps.iter().enumerate() {
            assert!(*gap >= UNIT * (i as u32 + 1), "wait {} was {gap:?}", i + 1);
        }
        assert!(gaps.windows(2).all(|w| w[1] > w[0]), "waits not increasing: {gaps:?}");
    }

    #[tokio::test]
    async fn zero_attempt_budget_reports_no_attempts() {
        let client = client_for("http://127.0.0.1:9", 0);
        match client.fetch_status().await.unwrap_err() {
            ClientError::Connectivity { attempts, .. } => assert_eq!(attempts, 0),
            other => panic!("unexpected error: {other}"),
        }
    }
}
