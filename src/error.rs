use thiserror::Error;

pub type Result<T> = std::result::Result<T, PaymentError>;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Payment initiation failed: {0}")]
    Initiation(String),
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Status check failed: {0}")]
    Check(String),
}

impl PaymentError {
    /// Message suitable for showing to the end user. Transport details are
    /// collapsed into a generic line.
    pub fn user_message(&self) -> String {
        match self {
            PaymentError::Validation(message)
            | PaymentError::Initiation(message)
            | PaymentError::Check(message) => message.clone(),
            PaymentError::Transport(_) => {
                "Could not reach the payment service. Please try again.".to_string()
            }
            PaymentError::Config(message) => message.clone(),
        }
    }
}
