//! ECP over HTTP: one empty `POST` per command.
//!
//! The player answers every ECP request with a short (usually empty) body.
//! The executor reads that body to the end, chunk by chunk, before reporting
//! the action complete; the sequencer waits on this before moving to the next
//! step, which keeps keypresses from overlapping on the wire.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use tracing::{debug, warn};

use crate::application::{ActionError, ActionExecutor};

/// [`ActionExecutor`] backed by a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpActionExecutor {
    http: Client,
}

impl HttpActionExecutor {
    /// Builds an executor.  With `timeout` unset, a request waits as long as
    /// the connection stays open.
    pub fn new(timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
        })
    }

    /// Wraps an existing client.
    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ActionExecutor for HttpActionExecutor {
    async fn execute(&self, url: &str) -> Result<(), ActionError> {
        let response = self
            .http
            .post(url)
            .body("")
            .send()
            .await
            .map_err(|e| ActionError::Request {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("device answered {status} for {url}");
        }

        let mut body = response.bytes_stream();
        let mut drained = 0usize;
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| ActionError::Drain {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
            drained += chunk.len();
        }

        debug!(%status, bytes = drained, "ECP {url}");
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
