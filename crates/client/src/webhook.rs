//! Webhook mode: register a callback URL and receive status pushes.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};

use vtrans_core::{JobStatus, StatusReport};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::polling::PollingClient;

/// Tracks the job status as last reported by the server.
///
/// Clones share the same status cell, so the receiver router and the
/// registering code observe the same value.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    config: Arc<ClientConfig>,
    http: reqwest::Client,
    latest: Arc<watch::Sender<JobStatus>>,
    poller: PollingClient,
}

impl WebhookClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        let poller = PollingClient::with_http(http.clone(), &config);
        let (latest, _) = watch::channel(JobStatus::Pending);

        Ok(Self {
            config: Arc::new(config),
            http,
            latest: Arc::new(latest),
            poller,
        })
    }

    pub fn webhook_url(&self) -> String {
        self.config.webhook_url()
    }

    /// Receiver routes: `POST /webhook`.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/webhook", post(receive_update))
            .with_state(self.clone())
    }

    /// Serve the receiver on an already bound listener until the task is dropped.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), ClientError> {
        info!(addr = %listener.local_addr()?, "webhook receiver listening");
        axum::serve(listener, self.router()).await?;
        Ok(())
    }

    /// Bind `webhook_host:webhook_port`.
    pub async fn bind_receiver(&self) -> Result<TcpListener, ClientError> {
        let listener =
            TcpListener::bind((self.config.webhook_host.as_str(), self.config.webhook_port)).await?;
        Ok(listener)
    }

    /// Bind `webhook_host:webhook_port` and serve the receiver.
    pub async fn run_webhook_server(&self) -> Result<(), ClientError> {
        let listener = self.bind_receiver().await?;
        self.serve(listener).await
    }

    /// Register the callback URL, then fetch the status once so a job that
    /// settled before registration is not missed.
    ///
    /// The fetched status only lands if no push arrived in the meantime.
    pub async fn register_webhook(&self) -> Result<JobStatus, ClientError> {
        let webhook_url = self.webhook_url();
        let resp = self
            .http
            .post(format!("{}/register_webhook", self.config.server_url.trim_end_matches('/')))
            .form(&[("webhook_url", webhook_url.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Registration {
                status: status.as_u16(),
                body,
            });
        }
        info!(webhook_url = %webhook_url, "webhook registered");

        let fetched = self.poller.fetch_status().await?;
        self.latest.send_if_modified(|current| {
            if *current == JobStatus::Pending && fetched != JobStatus::Pending {
                *current = fetched;
                true
            } else {
                false
            }
        });

        Ok(self.get_job_status())
    }

    pub fn get_job_status(&self) -> JobStatus {
        *self.latest.borrow()
    }

    /// Resolves once a terminal status has been recorded.
    pub async fn wait_for_terminal(&self) -> JobStatus {
        let mut rx = self.latest.subscribe();
        let settled = match rx.wait_for(JobStatus::is_terminal).await {
            Ok(status) => *status,
            // The sender lives in `self`, so the channel cannot close here.
            Err(_) => self.get_job_status(),
        };
        settled
    }

    fn record_update(&self, status: JobStatus) {
        let previous = self.latest.send_replace(status);
        info!(previous = %previous, status = %status, "status update received");
    }
}

async fn receive_update(State(client): State<WebhookClient>, body: Bytes) -> Response {
    match StatusReport::from_slice(&body) {
        StatusReport::Known(status) => {
            client.record_update(status);
            (StatusCode::OK, Json(json!({ "message": "Update received" }))).into_response()
        }
        report => {
            warn!(report = ?report, "ignoring webhook without a recognizable status");
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "error": "invalid_status",
                    "message": "body must carry a status of pending, completed or error",
                })),
            )
                .into_response()
        }
    }
}
