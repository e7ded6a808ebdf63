//! HTTP client for a VictoriaMetrics-compatible ingestion endpoint.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Request, Response, StatusCode};
use tokio::time::{Instant, timeout_at};
use tracing::{Instrument, Span, debug, info, info_span};

use crate::config::Endpoint;
use crate::ingest::MetricsSink;
use crate::ingest::error::IngestError;
use crate::ingest::format::encode_lines;
use crate::metrics::MetricSet;

pub const HEALTH_PATH: &str = "/health";
pub const IMPORT_PATH: &str = "/api/v1/import/prometheus";

/// Longest response body kept in a status error.
const MAX_ERROR_BODY: usize = 512;

/// Health-checks the store and pushes metric sets to it.
///
/// Every call takes the caller's deadline on top of the per-request timeout
/// the client was built with; whichever is reached first ends the request.
#[derive(Debug, Clone)]
pub struct IngestClient {
    endpoint: Endpoint,
    http: Client,
    span: Span,
}

impl IngestClient {
    pub fn new(endpoint: Endpoint, request_timeout: Duration) -> Result<Self, IngestError> {
        let http = Client::builder()
            .timeout(request_timeout)
            .user_agent(concat!("hostmon/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(IngestError::Client)?;

        Ok(Self {
            span: info_span!("ingest", endpoint = %endpoint),
            endpoint,
            http,
        })
    }

    /// Emits this client's events inside `span` instead of the default one.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Checks that the store answers `200 OK` on its health path.
    pub async fn ping(&self, deadline: Instant) -> Result<(), IngestError> {
        async {
            let request = self
                .http
                .get(self.endpoint.join(HEALTH_PATH))
                .build()
                .map_err(|source| IngestError::Request {
                    stage: "ping",
                    source,
                })?;

            let response = self.execute("ping", request, deadline).await?;
            if response.status() != StatusCode::OK {
                return Err(status_error("ping", response, deadline).await);
            }

            info!("ingestion endpoint is healthy");
            Ok(())
        }
        .instrument(self.span.clone())
        .await
    }

    /// Pushes every metric as one `name value` line.
    ///
    /// An empty set is a successful no-op that never touches the network.
    /// Returns the number of lines sent.
    pub async fn push(&self, metrics: &MetricSet, deadline: Instant) -> Result<usize, IngestError> {
        async {
            if metrics.is_empty() {
                debug!("no metrics to send");
                return Ok(0);
            }

            let body = encode_lines(metrics);
            let url = self.endpoint.join(IMPORT_PATH);
            debug!(count = metrics.len(), data = %body, url = %url, "sending metrics");

            let request = self
                .http
                .post(url)
                .header(CONTENT_TYPE, "text/plain")
                .body(body)
                .build()
                .map_err(|source| IngestError::Request {
                    stage: "push",
                    source,
                })?;

            let response = self.execute("push", request, deadline).await?;
            if !response.status().is_success() {
                return Err(status_error("push", response, deadline).await);
            }

            debug!(status = %response.status(), "successfully sent metrics");
            Ok(metrics.len())
        }
        .instrument(self.span.clone())
        .await
    }

    async fn execute(
        &self,
        stage: &'static str,
        request: Request,
        deadline: Instant,
    ) -> Result<Response, IngestError> {
        match timeout_at(deadline, self.http.execute(request)).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(source)) if source.is_builder() => Err(IngestError::Request { stage, source }),
            Ok(Err(source)) => Err(IngestError::Transport { stage, source }),
            Err(_) => Err(IngestError::DeadlineExceeded { stage }),
        }
    }
}

async fn status_error(stage: &'static str, response: Response, deadline: Instant) -> IngestError {
    let status = response.status();
    let mut body = match timeout_at(deadline, response.text()).await {
        Ok(Ok(text)) => text.trim().to_string(),
        _ => String::new(),
    };
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    IngestError::Status {
        stage,
        status,
        body,
    }
}

impl MetricsSink for IngestClient {
    async fn ping(&self, deadline: Instant) -> Result<(), IngestError> {
        IngestClient::ping(self, deadline).await
    }

    async fn push(&self, metrics: &MetricSet, deadline: Instant) -> Result<usize, IngestError> {
        IngestClient::push(self, metrics, deadline).await
    }
}
