use crate::domain::payment::TransactionRef;
use crate::domain::ports::{GatewayStatus, InitiateRequest, PaymentGateway};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

/// One scripted answer of the fake backend.
#[derive(Debug, Clone)]
pub enum ScriptedCheck {
    Pending,
    Completed,
    Failed(String),
    TransportError(String),
}

/// In-memory [`PaymentGateway`] that replays a fixed script of status
/// answers, then keeps answering `Pending`. Records call counts so tests can
/// assert exactly how many checks were issued.
pub struct ScriptedGateway {
    transaction_ref: String,
    fail_initiate: Option<String>,
    latency: Option<Duration>,
    script: Mutex<VecDeque<ScriptedCheck>>,
    initiate_calls: AtomicUsize,
    status_calls: AtomicUsize,
}

impl ScriptedGateway {
    pub fn with_script(transaction_ref: &str, script: Vec<ScriptedCheck>) -> Self {
        Self {
            transaction_ref: transaction_ref.to_string(),
            fail_initiate: None,
            latency: None,
            script: Mutex::new(script.into()),
            initiate_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
        }
    }

    /// Gateway whose initiate call is rejected with `message`.
    pub fn failing_initiate(message: &str) -> Self {
        let mut gateway = Self::with_script("unused", vec![]);
        gateway.fail_initiate = Some(message.to_string());
        gateway
    }

    /// Adds artificial latency to every status check, for tests that cancel
    /// while a check is in flight.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn initiate_calls(&self) -> usize {
        self.initiate_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn initiate(&self, _request: &InitiateRequest) -> Result<TransactionRef> {
        self.initiate_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.fail_initiate {
            return Err(PaymentError::Initiation(message.clone()));
        }
        Ok(TransactionRef::new(self.transaction_ref.clone()))
    }

    async fn status(&self, _transaction_ref: &TransactionRef) -> Result<GatewayStatus> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let next = self
            .script
            .lock()
            .await
            .pop_front()
            .unwrap_or(ScriptedCheck::Pending);
        match next {
            ScriptedCheck::Pending => Ok(GatewayStatus::Pending),
            ScriptedCheck::Completed => Ok(GatewayStatus::Completed),
            ScriptedCheck::Failed(reason) => Ok(GatewayStatus::Failed { reason }),
            ScriptedCheck::TransportError(message) => Err(PaymentError::Check(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::{Amount, InvoiceId, PhoneNumber};
    use rust_decimal_macros::dec;

    fn request() -> InitiateRequest {
        InitiateRequest {
            invoice_id: InvoiceId::new("inv-1").unwrap(),
            amount: Amount::new(dec!(1000)).unwrap(),
            phone: PhoneNumber::parse("+250788123456").unwrap(),
        }
    }

    #[tokio::test]
    async fn test_initiate_returns_scripted_ref() {
        let gateway = ScriptedGateway::with_script("tx-001", vec![]);
        let r = gateway.initiate(&request()).await.unwrap();
        assert_eq!(r, TransactionRef::new("tx-001"));
        assert_eq!(gateway.initiate_calls(), 1);
    }

    #[tokio::test]
    async fn test_script_replays_then_holds_pending() {
        let gateway = ScriptedGateway::with_script(
            "tx-001",
            vec![ScriptedCheck::Completed, ScriptedCheck::Failed("no".into())],
        );
        let r = TransactionRef::new("tx-001");

        assert_eq!(gateway.status(&r).await.unwrap(), GatewayStatus::Completed);
        assert_eq!(
            gateway.status(&r).await.unwrap(),
            GatewayStatus::Failed { reason: "no".into() }
        );
        assert_eq!(gateway.status(&r).await.unwrap(), GatewayStatus::Pending);
        assert_eq!(gateway.status_calls(), 3);
    }

    #[tokio::test]
    async fn test_failing_initiate() {
        let gateway = ScriptedGateway::failing_initiate("MoMo is down");
        let err = gateway.initiate(&request()).await.unwrap_err();
        assert!(matches!(err, PaymentError::Initiation(m) if m == "MoMo is down"));
    }
}
