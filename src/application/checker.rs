use crate::domain::payment::TransactionRef;
use crate::domain::ports::{GatewayStatus, PaymentGatewayArc};
use tracing::warn;

/// Result of one poll attempt, as seen by the scheduler.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Pending,
    Completed,
    Failed(String),
}

/// Issues a single status query and normalizes the answer.
///
/// Transport and parse errors are deliberately mapped to `Pending`: during a
/// money-movement confirmation a transient blip must not be reported as a
/// payment failure. The error is logged and polling continues.
#[derive(Clone)]
pub struct StatusChecker {
    gateway: PaymentGatewayArc,
}

impl StatusChecker {
    pub fn new(gateway: PaymentGatewayArc) -> Self {
        Self { gateway }
    }

    pub async fn check(&self, transaction_ref: &TransactionRef) -> PollOutcome {
        match self.gateway.status(transaction_ref).await {
            Ok(GatewayStatus::Completed) => PollOutcome::Completed,
            Ok(GatewayStatus::Failed { reason }) => {
                let reason = if reason.is_empty() {
                    "Payment was declined".to_string()
                } else {
                    reason
                };
                PollOutcome::Failed(reason)
            }
            Ok(GatewayStatus::Pending) => PollOutcome::Pending,
            Err(err) => {
                warn!(%transaction_ref, error = %err, "status check failed, still treating as pending");
                PollOutcome::Pending
            }
        }
    }
}
