use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub enum PaymentError {
    /// The gateway answered and the transaction is not usable.
    Declined(String),
    /// The gateway could not be reached or answered garbage; the caller may
    /// retry.
    Unreachable(String),
}

/// Gateway's verdict on a transaction reference, amounts in major currency
/// units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentVerification {
    pub reference: String,
    pub amount: f64,
    pub currency: String,
    pub paid: bool,
    pub customer_email: Option<String>,
}

impl PaymentVerification {
    /// The recorded charge must cover what we quoted. A small epsilon
    /// absorbs minor-unit rounding.
    pub fn covers(&self, expected: f64) -> bool {
        self.paid && self.amount + 0.01 >= expected
    }
}

pub trait PaymentOperations {
    async fn verify_transaction(&self, reference: &str)
        -> Result<PaymentVerification, PaymentError>;
}
