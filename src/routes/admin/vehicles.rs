use actix_web::{web, HttpResponse, Responder};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime};
use mongodb::Client;
use serde_json::json;
use std::sync::Arc;

use crate::db::mongo;
use crate::models::vehicle::{Vehicle, VehicleInput};
use crate::services::events::{ChangeOp, EventBus};

/// Every vehicle, inactive ones included, for the console table.
pub async fn list_vehicles(data: web::Data<Arc<Client>>) -> impl Responder {
    let client = data.into_inner();

    match mongo::collection::<Vehicle>(&client, mongo::VEHICLES)
        .find(doc! {})
        .sort(doc! { "name": 1 })
        .await
    {
        Ok(cursor) => match cursor.try_collect::<Vec<Vehicle>>().await {
            Ok(vehicles) => HttpResponse::Ok().json(vehicles),
            Err(err) => {
                eprintln!("Failed to collect vehicles: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to fetch vehicles")
            }
        },
        Err(err) => {
            eprintln!("Failed to find vehicles: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch vehicles")
        }
    }
}

fn validate(input: &VehicleInput) -> Option<HttpResponse> {
    if input.name.trim().is_empty() {
        return Some(
            HttpResponse::BadRequest()
                .json(json!({ "error": "Vehicle name is required", "field": "name" })),
        );
    }
    if input.capacity == 0 {
        return Some(
            HttpResponse::BadRequest()
                .json(json!({ "error": "Capacity must be at least 1", "field": "capacity" })),
        );
    }
    if input.base_price < 0.0 {
        return Some(
            HttpResponse::BadRequest()
                .json(json!({ "error": "Base price cannot be negative", "field": "base_price" })),
        );
    }
    None
}

pub async fn create_vehicle(
    data: web::Data<Arc<Client>>,
    bus: web::Data<EventBus>,
    input: web::Json<VehicleInput>,
) -> impl Responder {
    let client = data.into_inner();
    let input = input.into_inner();

    if let Some(response) = validate(&input) {
        return response;
    }

    let now = DateTime::now();
    let vehicle = Vehicle {
        id: None,
        name: input.name.trim().to_string(),
        capacity: input.capacity,
        base_price: input.base_price,
        is_active: input.is_active.unwrap_or(true),
        created_at: Some(now),
        updated_at: Some(now),
    };

    match mongo::collection::<Vehicle>(&client, mongo::VEHICLES)
        .insert_one(&vehicle)
        .await
    {
        Ok(result) => {
            let id = result.inserted_id.as_object_id().map(|id| id.to_hex());
            bus.publish(mongo::VEHICLES, ChangeOp::Insert, id.clone());
            HttpResponse::Ok().json(json!({ "vehicle_id": id }))
        }
        Err(err) => {
            eprintln!("Failed to create vehicle: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to create vehicle")
        }
    }
}

pub async fn update_vehicle(
    data: web::Data<Arc<Client>>,
    bus: web::Data<EventBus>,
    path: web::Path<(String,)>,
    input: web::Json<VehicleInput>,
) -> impl Responder {
    let client = data.into_inner();
    let input = input.into_inner();

    let vehicle_id = match ObjectId::parse_str(&path.into_inner().0) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid vehicle ID"),
    };
    if let Some(response) = validate(&input) {
        return response;
    }

    let update = doc! { "$set": {
        "name": input.name.trim(),
        "capacity": input.capacity,
        "base_price": input.base_price,
        "is_active": input.is_active.unwrap_or(true),
        "updated_at": DateTime::now(),
    }};

    match mongo::collection::<Vehicle>(&client, mongo::VEHICLES)
        .update_one(doc! { "_id": vehicle_id }, update)
        .await
    {
        Ok(result) if result.matched_count == 0 => {
            HttpResponse::NotFound().body("Vehicle not found")
        }
        Ok(_) => {
            bus.publish(mongo::VEHICLES, ChangeOp::Update, Some(vehicle_id.to_hex()));
            HttpResponse::Ok().json(json!({ "updated": true }))
        }
        Err(err) => {
            eprintln!("Failed to update vehicle: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to update vehicle")
        }
    }
}

/// Delete a vehicle type. If rides or pricing rules still reference it the
/// vehicle is deactivated instead, so history keeps resolving.
pub async fn delete_vehicle(
    data: web::Data<Arc<Client>>,
    bus: web::Data<EventBus>,
    path: web::Path<(String,)>,
) -> impl Responder {
    let client = data.into_inner();

    let vehicle_id = match ObjectId::parse_str(&path.into_inner().0) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid vehicle ID"),
    };

    let vehicles = mongo::collection::<Vehicle>(&client, mongo::VEHICLES);
    let vehicle = match vehicles.find_one(doc! { "_id": vehicle_id }).await {
        Ok(Some(vehicle)) => vehicle,
        Ok(None) => return HttpResponse::NotFound().body("Vehicle not found"),
        Err(err) => {
            eprintln!("Failed to fetch vehicle: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to fetch vehicle");
        }
    };

    let referenced = async {
        let rides = client
            .database(mongo::DB_NAME)
            .collection::<mongodb::bson::Document>(mongo::RIDES)
            .count_documents(doc! { "vehicle_type": &vehicle.name })
            .await?;
        if rides > 0 {
            return Ok::<bool, mongodb::error::Error>(true);
        }
        let rules = client
            .database(mongo::DB_NAME)
            .collection::<mongodb::bson::Document>(mongo::ROUTE_VEHICLE_PRICING)
            .count_documents(doc! { "vehicle_type": &vehicle.name })
            .await?;
        Ok(rules > 0)
    }
    .await;

    match referenced {
        Ok(true) => {
            if let Err(err) = vehicles
                .update_one(
                    doc! { "_id": vehicle_id },
                    doc! { "$set": { "is_active": false, "updated_at": DateTime::now() } },
                )
                .await
            {
                eprintln!("Failed to deactivate vehicle: {:?}", err);
                return HttpResponse::InternalServerError().body("Failed to delete vehicle");
            }
            bus.publish(mongo::VEHICLES, ChangeOp::Update, Some(vehicle_id.to_hex()));
            HttpResponse::Ok().json(json!({
                "deleted": false,
                "deactivated": true,
                "message": "Vehicle is referenced by rides or pricing and was deactivated instead",
            }))
        }
        Ok(false) => match vehicles.delete_one(doc! { "_id": vehicle_id }).await {
            Ok(_) => {
                bus.publish(mongo::VEHICLES, ChangeOp::Delete, Some(vehicle_id.to_hex()));
                HttpResponse::Ok().json(json!({ "deleted": true }))
            }
            Err(err) => {
                eprintln!("Failed to delete vehicle: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to delete vehicle")
            }
        },
        Err(err) => {
            eprintln!("Failed to check vehicle references: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to delete vehicle")
        }
    }
}
