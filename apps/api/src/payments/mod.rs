/// Payment gateway seam. Export handlers only ever see `PaymentGateway`; the
/// Paystack client is the production implementation.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod paystack;

pub use paystack::PaystackClient;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gateway error (status {status}): {message}")]
    Gateway { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Gateway response had no data")]
    MissingData,

    #[error("Invalid payment reference '{0}'")]
    InvalidReference(String),
}

/// Checkout session returned by `initialize`. The browser is sent to `authorization_url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSession {
    pub authorization_url: String,
    pub access_code: String,
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentVerification {
    pub verified: bool,
    /// Major currency units.
    pub amount: f64,
    /// ISO 4217 code the transaction was charged in.
    pub currency: String,
    pub reference: String,
    /// Gateway transaction status, e.g. `success`, `abandoned`.
    pub status: String,
}

impl PaymentVerification {
    /// True when the payment went through and paid at least `fee` in `currency`.
    pub fn covers(&self, fee: f64, currency: &str) -> bool {
        self.verified
            && self.currency.eq_ignore_ascii_case(currency)
            && to_minor_units(self.amount) >= to_minor_units(fee)
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn initialize(
        &self,
        email: &str,
        full_name: &str,
        amount: f64,
    ) -> Result<PaymentSession, PaymentError>;

    async fn verify(&self, reference: &str) -> Result<PaymentVerification, PaymentError>;
}

/// Major → minor units (pesewas, kobo, cents), rounded to the nearest unit.
pub fn to_minor_units(amount: f64) -> u64 {
    (amount * 100.0).round().max(0.0) as u64
}

pub fn from_minor_units(amount: u64) -> f64 {
    amount as f64 / 100.0
}

/// References go into a URL path; only the characters gateways actually issue are allowed.
pub fn validate_reference(reference: &str) -> Result<&str, PaymentError> {
    let valid = !reference.is_empty()
        && reference.len() <= 100
        && reference
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '='));
    if valid {
        Ok(reference)
    } else {
        Err(PaymentError::InvalidReference(reference.to_string()))
    }
}
