use crate::application::checker::{PollOutcome, StatusChecker};
use crate::application::events::{
    NOTICE_PAYMENT_CONFIRMED, NOTICE_REQUEST_SENT, NOTICE_VERIFICATION_TIMEOUT, Notice, NoticeHub,
};
use crate::domain::payment::{
    Amount, InvoiceId, PaymentSession, PaymentStatus, PhoneNumber, TransactionRef,
};
use crate::domain::ports::{InitiateRequest, PaymentGatewayArc};
use crate::error::Result;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, watch};
use tracing::{debug, info, warn};

/// Poll timing. Defaults match the production flow: one check every 5
/// seconds, at most 60 checks (5 minutes wall clock) before the attempt is
/// declared a verification timeout.
#[derive(Debug, Clone)]
pub struct ConfirmerConfig {
    pub poll_interval: Duration,
    pub max_attempts: u32,
}

impl Default for ConfirmerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            max_attempts: 60,
        }
    }
}

/// Read-only projection of the session, re-published on every transition.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentView {
    pub status: PaymentStatus,
    pub transaction_ref: Option<TransactionRef>,
    pub error: Option<String>,
    pub attempt_count: u32,
    pub is_polling: bool,
}

impl PaymentView {
    fn from_session(session: &PaymentSession) -> Self {
        Self {
            status: session.status,
            transaction_ref: session.transaction_ref.clone(),
            error: session.error.clone(),
            attempt_count: session.attempt_count,
            is_polling: session.polling,
        }
    }
}

struct Shared {
    session: RwLock<PaymentSession>,
    // Monotonic poll token. A task only mutates the session while its own
    // generation is still current; `reset` and a superseding `initialize`
    // bump it under the session write lock.
    generation: AtomicU64,
    views: watch::Sender<PaymentView>,
}

impl Shared {
    /// Applies `mutate` only if `generation` is still the live one, then
    /// publishes the new view. Returns whether the mutation happened.
    async fn mutate(&self, generation: u64, mutate: impl FnOnce(&mut PaymentSession)) -> bool {
        let mut session = self.session.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            return false;
        }
        mutate(&mut session);
        self.views.send_replace(PaymentView::from_session(&session));
        true
    }

    /// Invalidates any outstanding poll token, applies `mutate`, publishes,
    /// and returns the new live generation.
    async fn supersede(&self, mutate: impl FnOnce(&mut PaymentSession)) -> u64 {
        let mut session = self.session.write().await;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        mutate(&mut session);
        self.views.send_replace(PaymentView::from_session(&session));
        generation
    }
}

/// Drives one mobile money payment from initiation to a terminal state.
///
/// Each instance owns a single [`PaymentSession`]. `initialize` submits the
/// payment and starts a background poll task; the task checks the backend
/// sequentially (never overlapping) until the payment completes, fails, or
/// the attempt ceiling is reached. `reset` or a new `initialize` cancels the
/// task cooperatively: a check that is already in flight can no longer touch
/// the session once its generation is stale.
pub struct PaymentConfirmer {
    gateway: PaymentGatewayArc,
    checker: StatusChecker,
    notices: Arc<NoticeHub>,
    config: ConfirmerConfig,
    shared: Arc<Shared>,
}

impl PaymentConfirmer {
    pub fn new(gateway: PaymentGatewayArc, config: ConfirmerConfig) -> Self {
        let session = PaymentSession::idle();
        let (views, _) = watch::channel(PaymentView::from_session(&session));
        Self {
            checker: StatusChecker::new(Arc::clone(&gateway)),
            gateway,
            notices: Arc::new(NoticeHub::default()),
            config,
            shared: Arc::new(Shared {
                session: RwLock::new(session),
                generation: AtomicU64::new(0),
                views,
            }),
        }
    }

    /// Submits a new payment and starts polling for its confirmation.
    ///
    /// Validation failures are rejected before any network call; the session
    /// then ends up `Failed` with the validation message (deterministic, so
    /// the UI shows the same banner as for any other failure). Any prior
    /// in-flight poll is cancelled first.
    pub async fn initialize(&self, invoice_id: &str, amount: Decimal, phone: &str) -> Result<()> {
        let request = match Self::validate(invoice_id, amount, phone) {
            Ok(request) => request,
            Err(err) => {
                let message = err.user_message();
                self.shared.supersede(|s| s.fail(message.as_str())).await;
                self.notices.publish(Notice::error(message));
                return Err(err);
            }
        };

        let generation = self.shared.supersede(|s| s.begin()).await;
        info!(invoice_id, phone = %request.phone, "initiating mobile money payment");

        match self.gateway.initiate(&request).await {
            Ok(transaction_ref) => {
                let live = self
                    .shared
                    .mutate(generation, |s| {
                        s.transaction_ref = Some(transaction_ref.clone());
                        s.polling = true;
                    })
                    .await;
                // Superseded while the initiate call was outstanding; the
                // new attempt owns the session now.
                if !live {
                    return Ok(());
                }
                self.notices.publish(Notice::info(NOTICE_REQUEST_SENT));
                self.spawn_poller(generation, transaction_ref);
                Ok(())
            }
            Err(err) => {
                let message = err.user_message();
                warn!(invoice_id, error = %err, "payment initiation failed");
                if self
                    .shared
                    .mutate(generation, |s| s.fail(message.as_str()))
                    .await
                {
                    self.notices
                        .publish(Notice::error(format!("Payment could not be started: {message}")));
                }
                Err(err)
            }
        }
    }

    /// Returns the session to idle and cancels any scheduled check. A check
    /// already in flight resolves into the void.
    pub async fn reset(&self) {
        self.shared.supersede(|s| s.reset()).await;
    }

    /// Current state of the session.
    pub async fn snapshot(&self) -> PaymentView {
        PaymentView::from_session(&*self.shared.session.read().await)
    }

    /// Watch channel carrying the view; updated on every transition.
    pub fn views(&self) -> watch::Receiver<PaymentView> {
        self.shared.views.subscribe()
    }

    /// Subscribes to user-visible notices; drop the receiver to unsubscribe.
    pub fn notices(&self) -> tokio::sync::broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    fn validate(invoice_id: &str, amount: Decimal, phone: &str) -> Result<InitiateRequest> {
        Ok(InitiateRequest {
            invoice_id: InvoiceId::new(invoice_id)?,
            amount: Amount::try_from(amount)?,
            phone: PhoneNumber::parse(phone)?,
        })
    }

    fn spawn_poller(&self, generation: u64, transaction_ref: TransactionRef) {
        let shared = Arc::clone(&self.shared);
        let checker = self.checker.clone();
        let notices = Arc::clone(&self.notices);
        let config = self.config.clone();

        tokio::spawn(async move {
            loop {
                tokio::time::sleep(config.poll_interval).await;
                if shared.generation.load(Ordering::SeqCst) != generation {
                    return;
                }

                // Ceiling check happens before another query is issued, so a
                // ceiling of 60 never produces a 61st check.
                let attempts = shared.session.read().await.attempt_count;
                if attempts >= config.max_attempts {
                    if shared
                        .mutate(generation, |s| s.fail(NOTICE_VERIFICATION_TIMEOUT))
                        .await
                    {
                        warn!(%transaction_ref, attempts, "payment verification timed out");
                        notices.publish(Notice::error(NOTICE_VERIFICATION_TIMEOUT));
                    }
                    return;
                }

                if !shared.mutate(generation, |s| s.attempt_count += 1).await {
                    return;
                }
                debug!(%transaction_ref, attempt = attempts + 1, "checking payment status");

                match checker.check(&transaction_ref).await {
                    PollOutcome::Pending => continue,
                    PollOutcome::Completed => {
                        if shared.mutate(generation, |s| s.complete()).await {
                            info!(%transaction_ref, "payment confirmed");
                            notices.publish(Notice::success(NOTICE_PAYMENT_CONFIRMED));
                        }
                        return;
                    }
                    PollOutcome::Failed(reason) => {
                        if shared.mutate(generation, |s| s.fail(reason.as_str())).await {
                            warn!(%transaction_ref, reason = %reason, "payment failed");
                            notices.publish(Notice::error(format!("Payment failed: {reason}")));
                        }
                        return;
                    }
                }
            }
        });
    }
}
