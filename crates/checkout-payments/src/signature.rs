//! Stripe webhook signature verification.
//!
//! Stripe signs `"{timestamp}.{raw body}"` with HMAC-SHA256 using the
//! endpoint's signing secret and sends the result in the `Stripe-Signature`
//! header as `t=<timestamp>,v1=<hex>`. Several `v1` entries may be present
//! while a secret is being rolled; any one of them matching is enough.

use std::time::Duration;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{PaymentError, Result};

type HmacSha256 = Hmac<Sha256>;

const HEADER_FORMAT_ERROR: &str = "Unable to extract timestamp and signatures from header";
const NO_MATCH_ERROR: &str = "No signatures found matching the expected signature for payload";
const TOLERANCE_ERROR: &str = "Timestamp outside the tolerance zone";

/// Parsed `Stripe-Signature` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: i64,

    /// Hex-encoded `v1` signatures
    pub signatures: Vec<String>,
}

impl SignatureHeader {
    /// Parse `t=<timestamp>,v1=<sig>[,v1=<sig>][,v0=<legacy>]`.
    ///
    /// Unknown schemes are ignored.
    pub fn parse(header: &str) -> Result<Self> {
        let mut timestamp = None;
        let mut signatures = Vec::new();

        for part in header.split(',') {
            let Some((key, value)) = part.trim().split_once('=') else {
                continue;
            };
            match key {
                "t" => timestamp = value.parse::<i64>().ok(),
                "v1" => signatures.push(value.to_string()),
                _ => {}
            }
        }

        match timestamp {
            Some(timestamp) if !signatures.is_empty() => Ok(Self {
                timestamp,
                signatures,
            }),
            _ => Err(PaymentError::SignatureVerification(HEADER_FORMAT_ERROR.into())),
        }
    }
}

/// Verifier for Stripe webhook signatures
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: String,
    tolerance: Duration,
}

impl WebhookVerifier {
    pub fn new(secret: impl Into<String>, tolerance: Duration) -> Self {
        Self {
            secret: secret.into(),
            tolerance,
        }
    }

    /// Verify `payload` against the header, using the current time.
    pub fn verify(&self, payload: &[u8], header: Option<&str>) -> Result<()> {
        self.verify_at(payload, header, chrono::Utc::now().timestamp())
    }

    /// Verify `payload` against the header as of `now` (unix seconds).
    ///
    /// Only stale signatures are rejected; a timestamp ahead of `now` is
    /// accepted, matching Stripe's own libraries.
    pub fn verify_at(&self, payload: &[u8], header: Option<&str>, now: i64) -> Result<()> {
        let header = header.filter(|h| !h.is_empty()).ok_or_else(|| {
            PaymentError::SignatureVerification("No stripe-signature header value was provided.".into())
        })?;
        let header = SignatureHeader::parse(header)?;

        let mac = self.mac(header.timestamp, payload);
        let matched = header
            .signatures
            .iter()
            .filter_map(|sig| hex::decode(sig).ok())
            .any(|sig| mac.clone().verify_slice(&sig).is_ok());

        if !matched {
            return Err(PaymentError::SignatureVerification(NO_MATCH_ERROR.into()));
        }

        let tolerance = i64::try_from(self.tolerance.as_secs()).unwrap_or(i64::MAX);
        if tolerance > 0 && now.saturating_sub(header.timestamp) > tolerance {
            return Err(PaymentError::SignatureVerification(TOLERANCE_ERROR.into()));
        }

        Ok(())
    }

    /// Hex HMAC of `payload` at `timestamp`
    pub fn sign(&self, timestamp: i64, payload: &[u8]) -> String {
        hex::encode(self.mac(timestamp, payload).finalize().into_bytes())
    }

    /// Full `Stripe-Signature` header value for `payload` at `timestamp`
    pub fn signature_header(&self, timestamp: i64, payload: &[u8]) -> String {
        format!("t={timestamp},v1={}", self.sign(timestamp, payload))
    }

    fn mac(&self, timestamp: i64, payload: &[u8]) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        mac
    }
}
