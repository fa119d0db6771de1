//! Resend email adapter.
//!
//! Implements [`EmailNotifier`] against the Resend HTTP API. Per the port
//! contract the adapter never errors: network trouble, API rejections, and
//! a missing API key all surface as failed dispatch results. Running
//! without an API key disables email entirely, which keeps development
//! environments quiet.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::warn;

use crate::config::EmailConfig;
use crate::ports::{EmailDispatchResult, EmailMessage, EmailNotifier};

/// Reqwest-backed Resend client.
pub struct ResendClient {
    api_key: Option<SecretString>,
    from: String,
    api_base_url: String,
    http_client: reqwest::Client,
}

/// Resend send-email response body.
#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

impl ResendClient {
    pub fn new(api_key: Option<String>, from: impl Into<String>) -> Self {
        Self {
            api_key: api_key.map(SecretString::new),
            from: from.into(),
            api_base_url: "https://api.resend.com".to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &EmailConfig) -> Self {
        Self::new(config.resend_api_key.clone(), config.from_header())
    }

    /// Point the client at a different base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

#[async_trait]
impl EmailNotifier for ResendClient {
    async fn send(&self, message: EmailMessage) -> EmailDispatchResult {
        let Some(api_key) = &self.api_key else {
            warn!(to = %message.to, "email service not configured, skipping send");
            return EmailDispatchResult::failed("email service not configured");
        };

        let url = format!("{}/emails", self.api_base_url);
        let body = serde_json::json!({
            "from": self.from,
            "to": [message.to],
            "subject": message.subject,
            "html": message.html,
        });

        let response = match self
            .http_client
            .post(&url)
            .bearer_auth(api_key.expose_secret())
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return EmailDispatchResult::failed(e.to_string()),
        };

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return EmailDispatchResult::failed(format!("Resend API {status}: {error_text}"));
        }

        match response.json::<SendResponse>().await {
            Ok(sent) => EmailDispatchResult::sent(Some(sent.id)),
            // The mail was accepted; a garbled body only loses the id.
            Err(_) => EmailDispatchResult::sent(None),
        }
    }
}
