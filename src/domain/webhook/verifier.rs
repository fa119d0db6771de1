//! Stripe webhook signature verification.
//!
//! Verifies the `Stripe-Signature` header (HMAC-SHA256 over
//! `"{timestamp}.{payload}"`) with constant-time comparison, and bounds the
//! signature timestamp to reject replayed deliveries.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::errors::WebhookError;
use super::stripe_event::StripeEvent;

type HmacSha256 = Hmac<Sha256>;

/// Maximum accepted age of a delivery (5 minutes).
const MAX_SIGNATURE_AGE_SECS: i64 = 300;

/// Tolerated clock skew for timestamps from the future (1 minute).
const MAX_CLOCK_SKEW_SECS: i64 = 60;

/// Verifier for Stripe webhook deliveries.
pub struct WebhookVerifier {
    secret: String,
}

impl WebhookVerifier {
    /// Create a verifier with the endpoint's signing secret (`whsec_...`).
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Verify the signature header against the raw payload and parse the
    /// event.
    ///
    /// # Errors
    ///
    /// - [`WebhookError::ParseError`] for a malformed header or payload
    /// - [`WebhookError::TimestampOutOfRange`] for stale or future-dated
    ///   signatures
    /// - [`WebhookError::InvalidSignature`] when the HMAC does not match
    pub fn verify_and_parse(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<StripeEvent, WebhookError> {
        let (timestamp, signatures) = parse_signature_header(signature_header)?;

        self.check_timestamp(timestamp)?;

        let expected = self.sign(timestamp, payload);
        let matched = signatures
            .iter()
            .any(|candidate| bool::from(expected.ct_eq(candidate.as_slice())));
        if !matched {
            return Err(WebhookError::InvalidSignature);
        }

        serde_json::from_slice(payload).map_err(|e| WebhookError::ParseError(e.to_string()))
    }

    fn check_timestamp(&self, timestamp: i64) -> Result<(), WebhookError> {
        let age = chrono::Utc::now().timestamp() - timestamp;
        if age > MAX_SIGNATURE_AGE_SECS || age < -MAX_CLOCK_SKEW_SECS {
            return Err(WebhookError::TimestampOutOfRange);
        }
        Ok(())
    }

    fn sign(&self, timestamp: i64, payload: &[u8]) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}

/// Parse `t=<timestamp>,v1=<hex>[,v1=<hex>...]`, ignoring unknown schemes.
///
/// Stripe may send several `v1` entries while a secret is being rolled; a
/// match against any of them passes.
fn parse_signature_header(header: &str) -> Result<(i64, Vec<Vec<u8>>), WebhookError> {
    let mut timestamp: Option<i64> = None;
    let mut signatures: Vec<Vec<u8>> = Vec::new();

    for part in header.split(',') {
        let (key, value) = part
            .trim()
            .split_once('=')
            .ok_or_else(|| WebhookError::ParseError("malformed signature header".to_string()))?;

        match key {
            "t" => {
                timestamp = Some(value.parse().map_err(|_| {
                    WebhookError::ParseError("invalid signature timestamp".to_string())
                })?);
            }
            "v1" => {
                let bytes = hex::decode(value).map_err(|_| {
                    WebhookError::ParseError("signature is not valid hex".to_string())
                })?;
                signatures.push(bytes);
            }
            // Unknown schemes (v0, future versions) are skipped.
            _ => {}
        }
    }

    let timestamp = timestamp
        .ok_or_else(|| WebhookError::ParseError("signature header missing timestamp".to_string()))?;
    if signatures.is_empty() {
        return Err(WebhookError::ParseError(
            "signature header missing v1 signature".to_string(),
        ));
    }

    Ok((timestamp, signatures))
}

/// Sign a payload the way Stripe does, for building test deliveries.
pub fn sign_payload(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
}
