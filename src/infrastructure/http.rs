use crate::domain::payment::TransactionRef;
use crate::domain::ports::{GatewayStatus, InitiateRequest, PaymentGateway};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Connection settings for the payment backend.
#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    pub api_key: Option<String>,
}

impl HttpGatewayConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: Duration::from_secs(10),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Reads `PAYMENT_API_URL` (required) and `PAYMENT_API_KEY` (optional).
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("PAYMENT_API_URL")
            .map_err(|_| PaymentError::Config("PAYMENT_API_URL not set".to_string()))?;
        let mut config = Self::new(base_url);
        if let Ok(api_key) = std::env::var("PAYMENT_API_KEY") {
            config.api_key = Some(api_key);
        }
        Ok(config)
    }
}

/// HTTP adapter for the backend's mobile money endpoints.
pub struct HttpPaymentGateway {
    config: HttpGatewayConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InitiateBody<'a> {
    invoice_id: &'a str,
    amount: Decimal,
    phone: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitiateReply {
    transaction_ref: String,
}

#[derive(Debug, Deserialize)]
struct ErrorReply {
    message: Option<String>,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
enum WireStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Deserialize)]
struct StatusReply {
    status: WireStatus,
    reason: Option<String>,
}

impl HttpPaymentGateway {
    pub fn new(config: HttpGatewayConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(api_key) => builder.bearer_auth(api_key),
            None => builder,
        }
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn initiate(&self, request: &InitiateRequest) -> Result<TransactionRef> {
        let body = InitiateBody {
            invoice_id: request.invoice_id.as_str(),
            amount: request.amount.value(),
            phone: request.phone.as_str(),
        };
        let response = self
            .authorized(self.client.post(self.url("payments/momo/initiate")))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            // Prefer the backend's message when the error body parses.
            let message = response
                .json::<ErrorReply>()
                .await
                .ok()
                .and_then(|reply| reply.message)
                .unwrap_or_else(|| "The payment service rejected the request".to_string());
            return Err(PaymentError::Initiation(message));
        }

        let reply: InitiateReply = response.json().await?;
        debug!(transaction_ref = %reply.transaction_ref, "payment initiated");
        Ok(TransactionRef::new(reply.transaction_ref))
    }

    async fn status(&self, transaction_ref: &TransactionRef) -> Result<GatewayStatus> {
        let url = self.url(&format!("payments/momo/status/{transaction_ref}"));
        let response = self
            .authorized(self.client.get(url))
            .send()
            .await?
            .error_for_status()?;
        let reply: StatusReply = response.json().await?;

        Ok(match reply.status {
            WireStatus::Pending => GatewayStatus::Pending,
            WireStatus::Completed => GatewayStatus::Completed,
            WireStatus::Failed => GatewayStatus::Failed {
                reason: reply
                    .reason
                    .unwrap_or_else(|| "Payment was declined".to_string()),
            },
        })
    }
}
