use crate::error::PaymentError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a single mobile money payment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Idle,
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    /// Terminal states are sticky: leaving them requires a fresh `initialize`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Completed | PaymentStatus::Failed)
    }
}

/// Opaque identifier the payment backend assigns to one payment attempt.
/// All status checks are keyed by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionRef(String);

impl TransactionRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the invoice being paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceId(String);

impl InvoiceId {
    pub fn new(value: impl Into<String>) -> Result<Self, PaymentError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(PaymentError::Validation(
                "Invoice id must not be empty".to_string(),
            ));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A positive monetary amount submitted for payment.
///
/// Wrapper around `rust_decimal::Decimal` so a non-positive amount can never
/// reach the gateway.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, PaymentError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(PaymentError::Validation(
                "Amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = PaymentError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A Rwandan mobile money number, normalized to the `+2507XXXXXXXX` form.
///
/// Accepts international (`+2507...`, `2507...`) and local (`07...`) input.
/// Anything else is rejected before any network call is made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn parse(input: &str) -> Result<Self, PaymentError> {
        let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
        let digits = compact.strip_prefix('+').unwrap_or(&compact);

        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(PaymentError::Validation(
                "Phone number may only contain digits".to_string(),
            ));
        }

        let normalized = if digits.len() == 12 && digits.starts_with("2507") {
            format!("+{digits}")
        } else if digits.len() == 10 && digits.starts_with("07") {
            format!("+250{}", &digits[1..])
        } else {
            return Err(PaymentError::Validation(
                "Phone number must be a valid Rwandan mobile number".to_string(),
            ));
        };

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mutable state of one payment confirmation flow.
///
/// Owned by a single `PaymentConfirmer`; mutated only by the initiator and
/// the poll scheduler. `attempt_count` grows monotonically while the session
/// is `Pending` and resets to 0 on every new `initialize` or `reset`.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentSession {
    pub status: PaymentStatus,
    pub transaction_ref: Option<TransactionRef>,
    pub error: Option<String>,
    pub attempt_count: u32,
    pub polling: bool,
}

impl PaymentSession {
    pub fn idle() -> Self {
        Self {
            status: PaymentStatus::Idle,
            transaction_ref: None,
            error: None,
            attempt_count: 0,
            polling: false,
        }
    }

    /// Starts a fresh attempt: pending, nothing known yet.
    pub fn begin(&mut self) {
        self.status = PaymentStatus::Pending;
        self.transaction_ref = None;
        self.error = None;
        self.attempt_count = 0;
        self.polling = false;
    }

    pub fn complete(&mut self) {
        self.status = PaymentStatus::Completed;
        self.error = None;
        self.polling = false;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = PaymentStatus::Failed;
        self.error = Some(message.into());
        self.polling = false;
    }

    pub fn reset(&mut self) {
        *self = Self::idle();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_validation() {
        assert!(Amount::new(dec!(1.0)).is_ok());
        assert!(matches!(
            Amount::new(dec!(0.0)),
            Err(PaymentError::Validation(_))
        ));
        assert!(matches!(
            Amount::new(dec!(-100.0)),
            Err(PaymentError::Validation(_))
        ));
    }

    #[test]
    fn test_phone_accepts_international_format() {
        let phone = PhoneNumber::parse("+250788123456").unwrap();
        assert_eq!(phone.as_str(), "+250788123456");
    }

    #[test]
    fn test_phone_normalizes_local_format() {
        let phone = PhoneNumber::parse("0788123456").unwrap();
        assert_eq!(phone.as_str(), "+250788123456");
    }

    #[test]
    fn test_phone_normalizes_bare_country_code() {
        let phone = PhoneNumber::parse("250788123456").unwrap();
        assert_eq!(phone.as_str(), "+250788123456");
    }

    #[test]
    fn test_phone_tolerates_whitespace() {
        let phone = PhoneNumber::parse("+250 788 123 456").unwrap();
        assert_eq!(phone.as_str(), "+250788123456");
    }

    #[test]
    fn test_phone_rejects_garbage() {
        for input in ["", "12345", "078812345", "+15551234567", "07abc12345"] {
            assert!(
                matches!(PhoneNumber::parse(input), Err(PaymentError::Validation(_))),
                "expected {input:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_invoice_id_rejects_blank() {
        assert!(InvoiceId::new("inv-1").is_ok());
        assert!(matches!(
            InvoiceId::new("  "),
            Err(PaymentError::Validation(_))
        ));
    }

    #[test]
    fn test_session_begin_clears_previous_attempt() {
        let mut session = PaymentSession::idle();
        session.fail("declined");
        session.attempt_count = 12;

        session.begin();
        assert_eq!(session.status, PaymentStatus::Pending);
        assert_eq!(session.transaction_ref, None);
        assert_eq!(session.error, None);
        assert_eq!(session.attempt_count, 0);
        assert!(!session.polling);
    }

    #[test]
    fn test_session_fail_records_message() {
        let mut session = PaymentSession::idle();
        session.begin();
        session.polling = true;
        session.fail("Insufficient funds");

        assert_eq!(session.status, PaymentStatus::Failed);
        assert_eq!(session.error.as_deref(), Some("Insufficient funds"));
        assert!(!session.polling);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!PaymentStatus::Idle.is_terminal());
        assert!(!PaymentStatus::Pending.is_terminal());
        assert!(PaymentStatus::Completed.is_terminal());
        assert!(PaymentStatus::Failed.is_terminal());
    }
}
