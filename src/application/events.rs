use tokio::sync::broadcast;

/// Fixed user-facing copy for the confirmation flow.
pub const NOTICE_REQUEST_SENT: &str =
    "Payment request sent. Check your phone and approve the transaction.";
pub const NOTICE_PAYMENT_CONFIRMED: &str = "Payment confirmed. Thank you!";
/// Timeout copy is deliberately distinct from a payment failure: the money
/// may already have been deducted even though confirmation never arrived.
pub const NOTICE_VERIFICATION_TIMEOUT: &str = "We could not confirm your payment in time. \
     If you approved it, the amount may still have been deducted. \
     Please contact support before retrying.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

/// One user-visible notification (toast) emitted by the confirmation flow.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// Explicit observable for notices.
///
/// Subscribers get at-most-once delivery per notice; dropping the receiver
/// unsubscribes. No ordering is guaranteed across independent subscribers.
/// Publishing with no subscribers is fine and simply drops the notice.
pub struct NoticeHub {
    sender: broadcast::Sender<Notice>,
}

impl NoticeHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.sender.subscribe()
    }

    pub fn publish(&self, notice: Notice) {
        let _ = self.sender.send(notice);
    }
}

impl Default for NoticeHub {
    fn default() -> Self {
        Self::new(16)
    }
}
