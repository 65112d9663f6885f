use thiserror::Error;

/// Anything that keeps a backend call from producing a usable reply.
///
/// The gateway turns every variant into the in-character fallback, so these
/// never reach the session controller.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("no API key configured for provider '{0}'")]
    MissingApiKey(String),

    #[error("model returned no text")]
    EmptyResponse,

    #[error("malformed model payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("reply text is empty")]
    EmptyText,

    #[error("unknown emotion tag {0:?}")]
    UnknownEmotion(String),

    #[error("user text is empty")]
    EmptyInput,
}

impl GatewayError {
    pub fn status(status: reqwest::StatusCode, body: impl Into<String>) -> Self {
        Self::Status {
            status: status.as_u16(),
            body: body.into(),
        }
    }
}
