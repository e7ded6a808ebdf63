use reqwest::StatusCode;

/// Error type for ingestion failures.
///
/// Construction, in-flight and response failures are kept apart so the
/// caller can tell a misconfigured endpoint from an unreachable one.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The HTTP client itself could not be built.
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request could not be constructed (malformed URL, bad header).
    #[error("creating {stage} request: {source}")]
    Request {
        stage: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The request failed on the wire.
    #[error("{stage} request failed: {source}")]
    Transport {
        stage: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The caller's deadline passed before the exchange completed.
    #[error("{stage} request exceeded the cycle deadline")]
    DeadlineExceeded { stage: &'static str },

    /// The endpoint answered with a status other than success.
    #[error("{stage} returned status {status}: {body}")]
    Status {
        stage: &'static str,
        status: StatusCode,
        body: String,
    },
}

impl IngestError {
    /// Whether the failure happened in flight rather than at construction or
    /// in the response.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            IngestError::Transport { .. } | IngestError::DeadlineExceeded { .. }
        )
    }

    /// Status observed from the endpoint, if it answered.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            IngestError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
