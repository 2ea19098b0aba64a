use rand::{distributions::Alphanumeric, Rng};
use serde::Deserialize;

use crate::services::payment::interface::{PaymentError, PaymentOperations, PaymentVerification};

const DEFAULT_BASE_URL: &str = "https://api.paystack.co";

/// Thin client over Paystack's transaction API. The SPA's payment popup
/// charges the card; we only ever verify the resulting reference.
#[derive(Clone)]
pub struct PaystackClient {
    secret_key: String,
    base_url: String,
    http: reqwest::Client,
}

// Paystack's verify envelope. Amounts come back in kobo.
#[derive(Debug, Deserialize)]
struct VerifyResponse {
    status: bool,
    message: Option<String>,
    data: Option<VerifyData>,
}

#[derive(Debug, Deserialize)]
struct VerifyData {
    reference: String,
    status: String,
    amount: i64,
    currency: Option<String>,
    customer: Option<VerifyCustomer>,
}

#[derive(Debug, Deserialize)]
struct VerifyCustomer {
    email: Option<String>,
}

impl PaystackClient {
    pub fn new(secret_key: impl Into<String>) -> Self {
        PaystackClient {
            secret_key: secret_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Self {
        let secret_key = std::env::var("PAYSTACK_SECRET_KEY").unwrap_or_else(|_| {
            log::warn!("PAYSTACK_SECRET_KEY not set; payment verification will fail");
            String::new()
        });
        Self::new(secret_key)
    }

    #[cfg(test)]
    pub fn with_base_url(secret_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        PaystackClient {
            secret_key: secret_key.into(),
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Server-generated reference handed to the payment popup, so the value
    /// we later verify was never chosen by the client.
    pub fn generate_reference() -> String {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(12)
            .map(char::from)
            .collect::<String>()
            .to_uppercase();
        format!("UR-{}", suffix)
    }
}

impl PaymentOperations for PaystackClient {
    async fn verify_transaction(
        &self,
        reference: &str,
    ) -> Result<PaymentVerification, PaymentError> {
        let url = format!("{}/transaction/verify/{}", self.base_url, reference);

        let response = self
            .http
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.secret_key))
            .send()
            .await
            .map_err(|e| PaymentError::Unreachable(format!("Paystack request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            // 404 means the reference does not exist; anything else is the
            // gateway misbehaving.
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(PaymentError::Declined("Unknown transaction reference".into()));
            }
            return Err(PaymentError::Unreachable(format!(
                "Paystack answered {}",
                status
            )));
        }

        let body: VerifyResponse = response
            .json()
            .await
            .map_err(|e| PaymentError::Unreachable(format!("Unparseable verify response: {}", e)))?;

        if !body.status {
            return Err(PaymentError::Declined(
                body.message.unwrap_or_else(|| "Verification failed".into()),
            ));
        }

        let data = body
            .data
            .ok_or_else(|| PaymentError::Unreachable("Verify response missing data".into()))?;

        Ok(PaymentVerification {
            reference: data.reference,
            // Kobo to naira.
            amount: data.amount as f64 / 100.0,
            currency: data.currency.unwrap_or_else(|| "NGN".to_string()),
            paid: data.status == "success",
            customer_email: data.customer.and_then(|c| c.email),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_references_are_prefixed_and_unique() {
        let a = PaystackClient::generate_reference();
        let b = PaystackClient::generate_reference();
        assert!(a.starts_with("UR-"));
        assert_eq!(a.len(), 15);
        assert_ne!(a, b);
    }

    #[actix_rt::test]
    async fn unreachable_gateway_is_retryable() {
        // Nothing listens on this port.
        let client = PaystackClient::with_base_url("sk_test", "http://127.0.0.1:1");
        match client.verify_transaction("UR-MISSING").await {
            Err(PaymentError::Unreachable(_)) => {}
            other => panic!("expected Unreachable, got {:?}", other.map(|_| ())),
        }
    }
}
