use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use crate::middleware::auth::Claims;
use crate::services::payment::paystack::PaystackClient;

#[derive(Debug, Deserialize)]
pub struct InitPaymentInput {
    pub amount: f64,
}

/// Hands the SPA a server-generated transaction reference for the payment
/// popup. The reference is what we later verify, so the client never gets
/// to choose it.
pub async fn init_payment(claims: Claims, input: web::Json<InitPaymentInput>) -> impl Responder {
    if input.amount <= 0.0 {
        return HttpResponse::BadRequest()
            .json(json!({ "error": "Amount must be positive", "field": "amount" }));
    }

    let reference = PaystackClient::generate_reference();
    log::info!(
        "Initialized payment {} for {} ({})",
        reference,
        claims.sub,
        input.amount
    );

    HttpResponse::Ok().json(json!({
        "reference": reference,
        "amount": input.amount,
        "email": claims.sub,
    }))
}
