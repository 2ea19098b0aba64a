use actix_web::{web, HttpResponse, Responder};
use mongodb::{bson::doc, Client};
use serde::Serialize;
use std::collections::HashMap;
use std::env;
use std::sync::Arc;

use crate::db::mongo;

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    services: HashMap<String, ServiceStatus>,
    environment: String,
    version: String,
}

#[derive(Serialize, Clone)]
struct ServiceStatus {
    status: String,
    details: Option<String>,
}

pub async fn health_check(client: web::Data<Arc<Client>>) -> impl Responder {
    let mut health = HealthStatus {
        status: "ok".to_string(),
        services: HashMap::new(),
        environment: env::var("RUST_ENV").unwrap_or("development".to_string()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let mongo_result = check_mongodb(&client).await;
    health
        .services
        .insert("mongodb".to_string(), mongo_result.clone());

    let paystack_result = check_paystack();
    health
        .services
        .insert("paystack".to_string(), paystack_result.clone());

    let google_auth_result = check_google_auth();
    health
        .services
        .insert("google_auth".to_string(), google_auth_result.clone());

    // If any service is not ok, the overall status is degraded
    if mongo_result.status != "ok"
        || paystack_result.status != "ok"
        || google_auth_result.status != "ok"
    {
        health.status = "degraded".to_string();
    }

    HttpResponse::Ok().json(health)
}

async fn check_mongodb(client: &web::Data<Arc<Client>>) -> ServiceStatus {
    match client
        .database(mongo::DB_NAME)
        .run_command(doc! {"ping": 1})
        .await
    {
        Ok(_) => ServiceStatus {
            status: "ok".to_string(),
            details: Some("Connected successfully to MongoDB".to_string()),
        },
        Err(e) => {
            eprintln!("MongoDB health check failed: {}", e);

            ServiceStatus {
                status: "error".to_string(),
                details: Some(format!("Failed to connect: {}", e)),
            }
        }
    }
}

fn check_paystack() -> ServiceStatus {
    // Key existence only; verification calls happen per booking anyway
    match env::var("PAYSTACK_SECRET_KEY") {
        Ok(key) => {
            let masked_key = if key.len() > 8 {
                format!("{}***{}", &key[0..4], &key[key.len() - 4..])
            } else {
                "***".to_string()
            };

            ServiceStatus {
                status: "ok".to_string(),
                details: Some(format!("Paystack API key configured ({})", masked_key)),
            }
        }
        Err(_) => ServiceStatus {
            status: "error".to_string(),
            details: Some("PAYSTACK_SECRET_KEY not configured".to_string()),
        },
    }
}

fn check_google_auth() -> ServiceStatus {
    let client_id = env::var("GOOGLE_CLIENT_ID").ok();
    let client_secret = env::var("GOOGLE_CLIENT_SECRET").ok();
    let redirect_uri = env::var("GOOGLE_REDIRECT_URI").ok();

    if client_id.is_some() && client_secret.is_some() && redirect_uri.is_some() {
        let id = client_id.unwrap();
        let masked_id = if id.len() > 8 {
            format!("{}...{}", &id[0..6], &id[id.len() - 4..])
        } else {
            "***".to_string()
        };

        ServiceStatus {
            status: "ok".to_string(),
            details: Some(format!(
                "Google Auth configured, Client ID: {}, Redirect: {}",
                masked_id,
                redirect_uri.unwrap()
            )),
        }
    } else {
        let mut missing = Vec::new();

        if client_id.is_none() {
            missing.push("GOOGLE_CLIENT_ID");
        }
        if client_secret.is_none() {
            missing.push("GOOGLE_CLIENT_SECRET");
        }
        if redirect_uri.is_none() {
            missing.push("GOOGLE_REDIRECT_URI");
        }

        ServiceStatus {
            status: "error".to_string(),
            details: Some(format!("Missing configuration: {}", missing.join(", "))),
        }
    }
}
