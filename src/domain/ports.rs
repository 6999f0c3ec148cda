use super::payment::{Amount, InvoiceId, PhoneNumber, TransactionRef};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Everything the backend needs to create a payment transaction.
#[derive(Debug, Clone)]
pub struct InitiateRequest {
    pub invoice_id: InvoiceId,
    pub amount: Amount,
    pub phone: PhoneNumber,
}

/// Normalized answer of a single status query.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayStatus {
    Pending,
    Completed,
    Failed { reason: String },
}

/// Port to the payment backend.
///
/// `initiate` creates a transaction and returns its reference; `status`
/// queries one existing transaction. Adapters live in `infrastructure`.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn initiate(&self, request: &InitiateRequest) -> Result<TransactionRef>;
    async fn status(&self, transaction_ref: &TransactionRef) -> Result<GatewayStatus>;
}

pub type PaymentGatewayArc = Arc<dyn PaymentGateway>;
