//! EmailNotifier port - transactional email dispatch.
//!
//! Dispatch is infallible by contract: a failed send is reported in the
//! result, never raised as an error. The checkout pipeline treats
//! notification failure as a logged caveat — an order must never fail
//! because its confirmation email did.

use async_trait::async_trait;

/// An email ready to send.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Outcome of a dispatch attempt.
#[derive(Debug, Clone)]
pub struct EmailDispatchResult {
    pub success: bool,
    pub message_id: Option<String>,
    pub error: Option<String>,
}

impl EmailDispatchResult {
    pub fn sent(message_id: Option<String>) -> Self {
        Self {
            success: true,
            message_id,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message_id: None,
            error: Some(error.into()),
        }
    }
}

/// Port for sending transactional email.
#[async_trait]
pub trait EmailNotifier: Send + Sync {
    /// Send a message. Failures are reported in the result; this call never
    /// errors.
    async fn send(&self, message: EmailMessage) -> EmailDispatchResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_notifier_is_object_safe() {
        fn _accepts_dyn(_notifier: &dyn EmailNotifier) {}
    }

    #[test]
    fn sent_result_is_success() {
        let result = EmailDispatchResult::sent(Some("msg_1".to_string()));
        assert!(result.success);
        assert_eq!(result.message_id.as_deref(), Some("msg_1"));
        assert!(result.error.is_none());
    }

    #[test]
    fn failed_result_carries_error() {
        let result = EmailDispatchResult::failed("api unreachable");
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("api unreachable"));
    }
}
