//! HTTP publish client for nsqd.
//!
//! nsqd exposes `POST /pub?topic=<topic>` on its HTTP port; a 200 means the
//! message is accepted into the topic (delivery to consumers is
//! at-least-once from there). Publishing is synchronous within the admission
//! request -- the caller decides how to compensate when it fails.

use std::time::Duration;

use crate::descriptor::JobDescriptor;

/// Default nsqd host.
const DEFAULT_HOST: &str = "127.0.0.1";

/// Default nsqd HTTP port.
const DEFAULT_HTTP_PORT: u16 = 4151;

/// Default topic admitted jobs are published to.
const DEFAULT_TOPIC: &str = "fuze_jobs";

/// Publish request timeout.
const PUBLISH_TIMEOUT: Duration = Duration::from_secs(10);

/// A publish attempt failed; the message is NOT in the queue.
#[derive(Debug, thiserror::Error)]
pub enum NsqError {
    #[error("nsqd request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("nsqd rejected publish with status {0}")]
    Rejected(reqwest::StatusCode),
}

/// Queue endpoint configuration.
#[derive(Debug, Clone)]
pub struct NsqConfig {
    /// nsqd host (default: `127.0.0.1`).
    pub host: String,
    /// nsqd HTTP port (default: `4151`).
    pub http_port: u16,
    /// Topic admitted jobs are published to (default: `fuze_jobs`).
    pub topic: String,
}

impl NsqConfig {
    /// Load queue configuration from environment variables with defaults.
    ///
    /// | Env Var         | Default       |
    /// |-----------------|---------------|
    /// | `NSQ_HOST`      | `127.0.0.1`   |
    /// | `NSQ_HTTP_PORT` | `4151`        |
    /// | `NSQ_TOPIC`     | `fuze_jobs`   |
    pub fn from_env() -> Self {
        let host = std::env::var("NSQ_HOST").unwrap_or_else(|_| DEFAULT_HOST.into());

        let http_port: u16 = std::env::var("NSQ_HTTP_PORT")
            .unwrap_or_else(|_| DEFAULT_HTTP_PORT.to_string())
            .parse()
            .expect("NSQ_HTTP_PORT must be a valid u16");

        let topic = std::env::var("NSQ_TOPIC").unwrap_or_else(|_| DEFAULT_TOPIC.into());

        Self {
            host,
            http_port,
            topic,
        }
    }
}

/// Publishes job descriptors to the configured nsqd topic.
pub struct NsqClient {
    http: reqwest::Client,
    publish_url: String,
}

impl NsqClient {
    /// Build a client for the given endpoint configuration.
    pub fn new(config: &NsqConfig) -> Self {
        let publish_url = format!(
            "http://{}:{}/pub?topic={}",
            config.host, config.http_port, config.topic
        );
        let http = reqwest::Client::builder()
            .timeout(PUBLISH_TIMEOUT)
            .build()
            .expect("failed to build nsqd HTTP client");

        Self { http, publish_url }
    }

    /// Publish one job descriptor. Returns only once nsqd has accepted (or
    /// refused) the message.
    pub async fn publish(&self, descriptor: &JobDescriptor) -> Result<(), NsqError> {
        let response = self
            .http
            .post(&self.publish_url)
            .json(descriptor)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(
                job_id = %descriptor.job_id,
                %status,
                "nsqd refused job publish",
            );
            return Err(NsqError::Rejected(status));
        }

        tracing::debug!(job_id = %descriptor.job_id, "Job descriptor published");
        Ok(())
    }
}
