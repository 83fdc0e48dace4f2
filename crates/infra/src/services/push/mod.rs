use crate::system::ISys;
use jotpush_domain::{endpoint_audience, PushSubscription, SigningError, VapidClaims, VapidSigner};
use reqwest::Client;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// How long the push service may hold an undelivered wakeup.
const PUSH_TTL_SECS: u64 = 86_400;

#[derive(Debug, Error)]
pub enum PushError {
    #[error("Push endpoint rejected delivery with status {status}: `{body}`")]
    DeliveryFailed { status: u16, body: String },
    #[error("Invalid push endpoint: `{0}`")]
    InvalidEndpoint(String),
    #[error(transparent)]
    Signing(#[from] SigningError),
    #[error("Failed to reach push endpoint: {0}")]
    Network(#[from] reqwest::Error),
}

/// Seam between the dispatch engine and the outbound push request.
#[async_trait::async_trait]
pub trait IPushSender: Send + Sync {
    async fn send_wakeup(&self, subscription: &PushSubscription) -> Result<(), PushError>;
}

/// Delivers the wakeup signal over HTTP, authenticated with a VAPID token.
/// The body is always empty, payload encryption is out of scope.
pub struct WebPushSender {
    client: Client,
    signer: VapidSigner,
    subject: String,
    sys: Arc<dyn ISys>,
}

impl WebPushSender {
    pub fn new(signer: VapidSigner, subject: String, sys: Arc<dyn ISys>) -> Self {
        Self {
            client: Client::new(),
            signer,
            subject,
            sys,
        }
    }
}

#[async_trait::async_trait]
impl IPushSender for WebPushSender {
    async fn send_wakeup(&self, subscription: &PushSubscription) -> Result<(), PushError> {
        let audience = endpoint_audience(&subscription.endpoint)
            .ok_or_else(|| PushError::InvalidEndpoint(subscription.endpoint.clone()))?;
        let claims = VapidClaims::new(
            audience,
            self.subject.clone(),
            self.sys.get_timestamp_millis(),
        );
        let token = self.signer.sign(&claims)?;

        let res = self
            .client
            .post(&subscription.endpoint)
            .header(
                "authorization",
                format!("vapid t={}, k={}", token, self.signer.public_key()),
            )
            .header("ttl", PUSH_TTL_SECS.to_string())
            .header("content-length", "0")
            .body(Vec::new())
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(PushError::DeliveryFailed {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

/// Records deliveries instead of performing them. Wired into the in-memory
/// context and used by the engine tests.
#[derive(Default)]
pub struct StubPushSender {
    sent: Mutex<Vec<String>>,
    failing_endpoints: Mutex<HashSet<String>>,
}

impl StubPushSender {
    pub fn new() -> Self {
        Default::default()
    }

    /// Endpoints registered here answer every delivery with a 410.
    pub fn fail_endpoint(&self, endpoint: &str) {
        self.failing_endpoints
            .lock()
            .unwrap()
            .insert(endpoint.into());
    }

    pub fn sent_endpoints(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl IPushSender for StubPushSender {
    async fn send_wakeup(&self, subscription: &PushSubscription) -> Result<(), PushError> {
        if self
            .failing_endpoints
            .lock()
            .unwrap()
            .contains(&subscription.endpoint)
        {
            return Err(PushError::DeliveryFailed {
                status: 410,
                body: "subscription gone".into(),
            });
        }
        self.sent.lock().unwrap().push(subscription.endpoint.clone());
        Ok(())
    }
}
