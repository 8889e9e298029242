use anyhow::Context;
use tracing::{error, info};

use vtrans_client::{ClientConfig, ClientMode, PollingClient, WebhookClient};
use vtrans_core::JobStatus;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    vtrans_observability::init();

    let config = ClientConfig::from_env().context("invalid client configuration")?;
    info!(server_url = %config.server_url, mode = ?config.mode, "starting client");

    let status = match config.mode {
        ClientMode::Poll => {
            let client = PollingClient::new(&config)?;
            client
                .poll_until_terminal()
                .await
                .context("failed to retrieve translation status")?
        }
        ClientMode::Webhook => run_webhook_mode(config).await?,
    };

    match status {
        JobStatus::Completed => info!("Video translation is completed"),
        _ => error!("An error occurred during video translation"),
    }

    Ok(())
}

async fn run_webhook_mode(config: ClientConfig) -> anyhow::Result<JobStatus> {
    let client = WebhookClient::new(config)?;

    // Bind before registering so an early callback finds the receiver up.
    let listener = client.bind_receiver().await?;
    let receiver = client.clone();
    let server = tokio::spawn(async move {
        if let Err(e) = receiver.serve(listener).await {
            error!(error = %e, "webhook receiver stopped");
        }
    });

    client
        .register_webhook()
        .await
        .context("failed to register webhook")?;

    let status = client.wait_for_terminal().await;
    server.abort();
    Ok(status)
}
