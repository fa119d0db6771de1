//! Webhook error types.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors raised while receiving and verifying a webhook delivery.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Signature verification failed.
    #[error("invalid signature")]
    InvalidSignature,

    /// Signature header is missing from the request.
    #[error("missing signature header")]
    MissingSignature,

    /// Signature timestamp is outside the acceptable window.
    #[error("signature timestamp out of range")]
    TimestampOutOfRange,

    /// Failed to parse the signature header or the event payload.
    #[error("parse error: {0}")]
    ParseError(String),
}

impl WebhookError {
    /// HTTP status for the delivery response.
    ///
    /// All of these occur before any processing, so none of them is
    /// acknowledged; 4xx tells the provider the delivery itself was bad.
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::InvalidSignature | WebhookError::TimestampOutOfRange => {
                StatusCode::UNAUTHORIZED
            }
            WebhookError::MissingSignature | WebhookError::ParseError(_) => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}
