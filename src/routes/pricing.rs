use actix_web::{web, HttpResponse, Responder};
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::Client;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::db::mongo;
use crate::models::location::LocationKind;
use crate::models::pricing::{BookingMode, RouteQuery};
use crate::models::vehicle::Vehicle;
use crate::services::pricing_service::PricingService;
use crate::services::ride_service::RideService;

#[derive(Debug, Deserialize)]
pub struct QuoteInput {
    pub from_type: LocationKind,
    pub from_location: String,
    pub to_type: LocationKind,
    pub to_location: String,
    pub vehicle_id: String,
    pub mode: BookingMode,
    pub seats: Option<u32>,
}

/// Fare quote for a route + vehicle + mode, exactly what the booking
/// screens show before payment.
pub async fn quote(data: web::Data<Arc<Client>>, input: web::Json<QuoteInput>) -> impl Responder {
    let client = data.into_inner();
    let input = input.into_inner();

    let route = RouteQuery {
        from_type: input.from_type,
        from_location: input.from_location,
        to_type: input.to_type,
        to_location: input.to_location,
    };
    if !route.kinds_differ() {
        return HttpResponse::BadRequest().json(json!({
            "error": "A route must pair one state with one university",
            "field": "to_type"
        }));
    }

    let seats = input.seats.unwrap_or(1);
    if seats == 0 {
        return HttpResponse::BadRequest()
            .json(json!({ "error": "At least one seat is required", "field": "seats" }));
    }

    let vehicle_id = match ObjectId::parse_str(&input.vehicle_id) {
        Ok(id) => id,
        Err(_) => {
            return HttpResponse::BadRequest()
                .json(json!({ "error": "Invalid vehicle ID", "field": "vehicle_id" }))
        }
    };

    let vehicle = match mongo::collection::<Vehicle>(&client, mongo::VEHICLES)
        .find_one(doc! { "_id": vehicle_id, "is_active": { "$ne": false } })
        .await
    {
        Ok(Some(vehicle)) => vehicle,
        Ok(None) => return HttpResponse::NotFound().body("Vehicle not found"),
        Err(err) => {
            eprintln!("Failed to fetch vehicle: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to fetch vehicle");
        }
    };

    let (route_rules, vehicle_rules) = match RideService::load_pricing_tables(&client).await {
        Ok(tables) => tables,
        Err(err) => {
            eprintln!("Failed to load pricing tables: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to load pricing");
        }
    };

    let quote = PricingService::quote(
        &route_rules,
        &vehicle_rules,
        &route,
        &vehicle,
        input.mode,
        seats,
    );
    HttpResponse::Ok().json(quote)
}
