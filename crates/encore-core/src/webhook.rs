//! Payment-provider webhook verification and ingestion
//!
//! Signature header format: `t=<unix seconds>,v1=<hex HMAC-SHA256>` where the
//! MAC covers `"{t}.{body}"`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::{debug, info, instrument, warn};

use encore_db::NotificationStore;
use encore_types::NotificationEvent;

use crate::error::{CoreError, CoreResult};

/// Maximum age (either direction) of a signature timestamp, in seconds
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

type HmacSha256 = Hmac<Sha256>;

/// Verifies signed notification payloads
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: String,
}

impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookVerifier").finish_non_exhaustive()
    }
}

impl WebhookVerifier {
    /// Create a verifier for a shared secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn mac_hex(&self, timestamp: &str, payload: &[u8]) -> CoreResult<String> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|_| CoreError::Webhook("invalid webhook secret".to_string()))?;
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Build the signature header for `payload` at `timestamp`
    pub fn sign(&self, payload: &[u8], timestamp: i64) -> CoreResult<String> {
        let t = timestamp.to_string();
        Ok(format!("t={t},v1={}", self.mac_hex(&t, payload)?))
    }

    /// Check the signature header against `payload` at `now`
    pub fn verify(&self, payload: &[u8], signature: &str, now: DateTime<Utc>) -> CoreResult<()> {
        let mut timestamp = None;
        let mut sig_v1 = None;
        for part in signature.split(',') {
            match part.trim().split_once('=') {
                Some(("t", value)) => timestamp = Some(value),
                Some(("v1", value)) => sig_v1 = Some(value),
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or_else(|| {
            warn!("Missing timestamp in webhook signature");
            CoreError::Webhook("missing timestamp".to_string())
        })?;
        let sig_v1 = sig_v1.ok_or_else(|| {
            warn!("Missing v1 signature in webhook signature");
            CoreError::Webhook("missing signature".to_string())
        })?;

        let expected = self.mac_hex(timestamp, payload)?;
        if !bool::from(sig_v1.as_bytes().ct_eq(expected.as_bytes())) {
            warn!("Webhook signature verification failed");
            return Err(CoreError::Webhook(
                "signature verification failed".to_string(),
            ));
        }

        let ts: i64 = timestamp
            .parse()
            .map_err(|_| CoreError::Webhook("invalid timestamp format".to_string()))?;
        let age = now.timestamp().saturating_sub(ts);
        if age.abs() > SIGNATURE_TOLERANCE_SECS {
            warn!(timestamp = ts, now = now.timestamp(), "Webhook timestamp outside tolerance");
            return Err(CoreError::Webhook("timestamp outside tolerance".to_string()));
        }

        Ok(())
    }

    /// Verify the signature, then parse the payload as a notification
    #[instrument(skip(self, payload, signature))]
    pub fn verify_and_parse(
        &self,
        payload: &[u8],
        signature: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<NotificationEvent> {
        self.verify(payload, signature, now)?;

        let event: NotificationEvent = serde_json::from_slice(payload)
            .map_err(|e| CoreError::Webhook(format!("invalid notification payload: {e}")))?;
        debug!(
            notification_uuid = %event.notification_uuid,
            notification_type = %event.notification_type,
            "Parsed notification"
        );
        Ok(event)
    }
}

/// Outcome of ingesting one notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// First delivery, now stored
    Stored,
    /// Already stored; nothing changed
    Duplicate,
}

impl IngestOutcome {
    /// Label used in logs and metrics
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Stored => "stored",
            Self::Duplicate => "duplicate",
        }
    }
}

/// Verifies and stores provider notifications
pub struct NotificationIngestor<N: ?Sized> {
    store: Arc<N>,
    verifier: WebhookVerifier,
}

impl<N: NotificationStore + ?Sized> NotificationIngestor<N> {
    /// Create a new ingestor
    pub fn new(store: Arc<N>, verifier: WebhookVerifier) -> Self {
        Self { store, verifier }
    }

    /// Verify, parse and idempotently store a delivery
    #[instrument(skip(self, payload, signature))]
    pub async fn ingest(
        &self,
        payload: &[u8],
        signature: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<(NotificationEvent, IngestOutcome)> {
        let event = self.verifier.verify_and_parse(payload, signature, now)?;
        let outcome = if self.store.insert(&event).await? {
            IngestOutcome::Stored
        } else {
            IngestOutcome::Duplicate
        };
        info!(
            notification_uuid = %event.notification_uuid,
            notification_type = %event.notification_type,
            outcome = outcome.as_str(),
            "Notification ingested"
        );
        Ok((event, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 2, 12, 0, 0).unwrap()
    }

    const PAYLOAD: &[u8] = br#"{"notificationUuid":"n-1","createdAt":"2026-02-02T11:59:00Z","notificationType":"DID_RENEW","productId":"premium.monthly","price":9990,"currency":"TRY"}"#;

    #[test]
    fn test_valid_signature_parses() {
        let verifier = WebhookVerifier::new("whsec_test");
        let header = verifier.sign(PAYLOAD, now().timestamp()).unwrap();
        let event = verifier.verify_and_parse(PAYLOAD, &header, now()).unwrap();
        assert_eq!(event.notification_uuid, "n-1");
        assert_eq!(event.price, Some(9990));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let header = WebhookVerifier::new("other").sign(PAYLOAD, now().timestamp()).unwrap();
        let err = WebhookVerifier::new("whsec_test")
            .verify(PAYLOAD, &header, now())
            .unwrap_err();
        assert!(matches!(err, CoreError::Webhook(_)));
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let verifier = WebhookVerifier::new("whsec_test");
        let header = verifier
            .sign(PAYLOAD, now().timestamp() - SIGNATURE_TOLERANCE_SECS - 1)
            .unwrap();
        assert!(verifier.verify(PAYLOAD, &header, now()).is_err());
    }

    #[test]
    fn test_missing_parts_rejected() {
        let verifier = WebhookVerifier::new("whsec_test");
        assert!(verifier.verify(PAYLOAD, "v1=abc", now()).is_err());
        assert!(verifier.verify(PAYLOAD, "t=1", now()).is_err());
        assert!(verifier.verify(PAYLOAD, "", now()).is_err());
    }
}
