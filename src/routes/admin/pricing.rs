use actix_web::{web, HttpResponse, Responder};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime};
use mongodb::{Client, Collection};
use serde_json::json;
use std::sync::Arc;

use crate::db::mongo;
use crate::models::pricing::{
    RoutePricing, RoutePricingInput, RouteQuery, RouteVehiclePricing, RouteVehiclePricingInput,
};
use crate::services::events::{ChangeOp, EventBus};
use crate::services::pricing_service::PricingService;

fn route_rules(client: &Client) -> Collection<RoutePricing> {
    mongo::collection::<RoutePricing>(client, mongo::ROUTE_PRICING)
}

fn vehicle_rules(client: &Client) -> Collection<RouteVehiclePricing> {
    mongo::collection::<RouteVehiclePricing>(client, mongo::ROUTE_VEHICLE_PRICING)
}

fn invalid_route() -> HttpResponse {
    HttpResponse::BadRequest().json(json!({
        "error": "A route must pair one state with one university",
        "field": "to_type",
    }))
}

fn duplicate_rule() -> HttpResponse {
    HttpResponse::Conflict().json(json!({
        "error": "duplicate_rule",
        "message": "An active rule already covers this route",
    }))
}

pub async fn list_route_pricing(data: web::Data<Arc<Client>>) -> impl Responder {
    let client = data.into_inner();
    match route_rules(&client).find(doc! {}).await {
        Ok(cursor) => match cursor.try_collect::<Vec<RoutePricing>>().await {
            Ok(rules) => HttpResponse::Ok().json(rules),
            Err(err) => {
                eprintln!("Failed to collect route pricing: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to fetch pricing")
            }
        },
        Err(err) => {
            eprintln!("Failed to find route pricing: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch pricing")
        }
    }
}

/// Create a route-level rule. Routes are matched in either direction, so a
/// rule for the reversed pair counts as a duplicate too.
pub async fn create_route_pricing(
    data: web::Data<Arc<Client>>,
    bus: web::Data<EventBus>,
    input: web::Json<RoutePricingInput>,
) -> impl Responder {
    let client = data.into_inner();
    let input = input.into_inner();

    let route = RouteQuery {
        from_type: input.from_type,
        from_location: input.from_location.trim().to_string(),
        to_type: input.to_type,
        to_location: input.to_location.trim().to_string(),
    };
    if !route.kinds_differ() {
        return invalid_route();
    }
    if input.base_price < 0.0 {
        return HttpResponse::BadRequest()
            .json(json!({ "error": "Base price cannot be negative", "field": "base_price" }));
    }

    let existing = match route_rules(&client)
        .find(doc! { "is_active": { "$ne": false } })
        .await
    {
        Ok(cursor) => match cursor.try_collect::<Vec<RoutePricing>>().await {
            Ok(rules) => rules,
            Err(err) => {
                eprintln!("Failed to collect route pricing: {:?}", err);
                return HttpResponse::InternalServerError().body("Failed to check pricing");
            }
        },
        Err(err) => {
            eprintln!("Failed to find route pricing: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to check pricing");
        }
    };
    if PricingService::find_route_rule(&existing, &route).is_some() {
        return duplicate_rule();
    }

    let now = DateTime::now();
    let rule = RoutePricing {
        id: None,
        from_type: route.from_type,
        from_location: route.from_location,
        to_type: route.to_type,
        to_location: route.to_location,
        base_price: input.base_price,
        price_unit: input.price_unit,
        is_active: input.is_active.unwrap_or(true),
        created_at: Some(now),
        updated_at: Some(now),
    };

    match route_rules(&client).insert_one(&rule).await {
        Ok(result) => {
            let id = result.inserted_id.as_object_id().map(|id| id.to_hex());
            bus.publish(mongo::ROUTE_PRICING, ChangeOp::Insert, id.clone());
            HttpResponse::Ok().json(json!({ "pricing_id": id }))
        }
        Err(err) => {
            eprintln!("Failed to create route pricing: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to create pricing")
        }
    }
}

pub async fn update_route_pricing(
    data: web::Data<Arc<Client>>,
    bus: web::Data<EventBus>,
    path: web::Path<(String,)>,
    input: web::Json<RoutePricingInput>,
) -> impl Responder {
    let client = data.into_inner();
    let input = input.into_inner();

    let rule_id = match ObjectId::parse_str(&path.into_inner().0) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid pricing ID"),
    };
    if input.from_type == input.to_type {
        return invalid_route();
    }

    let mut set = doc! {
        "from_type": input.from_type.as_str(),
        "from_location": input.from_location.trim(),
        "to_type": input.to_type.as_str(),
        "to_location": input.to_location.trim(),
        "base_price": input.base_price,
        "is_active": input.is_active.unwrap_or(true),
        "updated_at": DateTime::now(),
    };
    if let Some(unit) = input.price_unit {
        set.insert(
            "price_unit",
            mongodb::bson::to_bson(&unit).unwrap_or_default(),
        );
    }

    match route_rules(&client)
        .update_one(doc! { "_id": rule_id }, doc! { "$set": set })
        .await
    {
        Ok(result) if result.matched_count == 0 => {
            HttpResponse::NotFound().body("Pricing rule not found")
        }
        Ok(_) => {
            bus.publish(mongo::ROUTE_PRICING, ChangeOp::Update, Some(rule_id.to_hex()));
            HttpResponse::Ok().json(json!({ "updated": true }))
        }
        Err(err) => {
            eprintln!("Failed to update route pricing: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to update pricing")
        }
    }
}

pub async fn delete_route_pricing(
    data: web::Data<Arc<Client>>,
    bus: web::Data<EventBus>,
    path: web::Path<(String,)>,
) -> impl Responder {
    let client = data.into_inner();

    let rule_id = match ObjectId::parse_str(&path.into_inner().0) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid pricing ID"),
    };

    match route_rules(&client).delete_one(doc! { "_id": rule_id }).await {
        Ok(result) if result.deleted_count == 0 => {
            HttpResponse::NotFound().body("Pricing rule not found")
        }
        Ok(_) => {
            bus.publish(mongo::ROUTE_PRICING, ChangeOp::Delete, Some(rule_id.to_hex()));
            HttpResponse::Ok().json(json!({ "deleted": true }))
        }
        Err(err) => {
            eprintln!("Failed to delete route pricing: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to delete pricing")
        }
    }
}

pub async fn list_vehicle_pricing(data: web::Data<Arc<Client>>) -> impl Responder {
    let client = data.into_inner();
    match vehicle_rules(&client).find(doc! {}).await {
        Ok(cursor) => match cursor.try_collect::<Vec<RouteVehiclePricing>>().await {
            Ok(rules) => HttpResponse::Ok().json(rules),
            Err(err) => {
                eprintln!("Failed to collect vehicle pricing: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to fetch pricing")
            }
        },
        Err(err) => {
            eprintln!("Failed to find vehicle pricing: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch pricing")
        }
    }
}

pub async fn create_vehicle_pricing(
    data: web::Data<Arc<Client>>,
    bus: web::Data<EventBus>,
    input: web::Json<RouteVehiclePricingInput>,
) -> impl Responder {
    let client = data.into_inner();
    let input = input.into_inner();

    let route = RouteQuery {
        from_type: input.from_type,
        from_location: input.from_location.trim().to_string(),
        to_type: input.to_type,
        to_location: input.to_location.trim().to_string(),
    };
    if !route.kinds_differ() {
        return invalid_route();
    }
    if input.vehicle_type.trim().is_empty() {
        return HttpResponse::BadRequest()
            .json(json!({ "error": "Vehicle type is required", "field": "vehicle_type" }));
    }
    if input.base_price < 0.0 {
        return HttpResponse::BadRequest()
            .json(json!({ "error": "Base price cannot be negative", "field": "base_price" }));
    }

    let existing = match vehicle_rules(&client)
        .find(doc! { "is_active": { "$ne": false } })
        .await
    {
        Ok(cursor) => match cursor.try_collect::<Vec<RouteVehiclePricing>>().await {
            Ok(rules) => rules,
            Err(err) => {
                eprintln!("Failed to collect vehicle pricing: {:?}", err);
                return HttpResponse::InternalServerError().body("Failed to check pricing");
            }
        },
        Err(err) => {
            eprintln!("Failed to find vehicle pricing: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to check pricing");
        }
    };
    if PricingService::find_vehicle_rule(&existing, &route, input.vehicle_type.trim()).is_some() {
        return duplicate_rule();
    }

    let now = DateTime::now();
    let rule = RouteVehiclePricing {
        id: None,
        from_type: route.from_type,
        from_location: route.from_location,
        to_type: route.to_type,
        to_location: route.to_location,
        vehicle_type: input.vehicle_type.trim().to_string(),
        base_price: input.base_price,
        price_unit: input.price_unit,
        is_active: input.is_active.unwrap_or(true),
        created_at: Some(now),
        updated_at: Some(now),
    };

    match vehicle_rules(&client).insert_one(&rule).await {
        Ok(result) => {
            let id = result.inserted_id.as_object_id().map(|id| id.to_hex());
            bus.publish(mongo::ROUTE_VEHICLE_PRICING, ChangeOp::Insert, id.clone());
            HttpResponse::Ok().json(json!({ "pricing_id": id }))
        }
        Err(err) => {
            eprintln!("Failed to create vehicle pricing: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to create pricing")
        }
    }
}

pub async fn update_vehicle_pricing(
    data: web::Data<Arc<Client>>,
    bus: web::Data<EventBus>,
    path: web::Path<(String,)>,
    input: web::Json<RouteVehiclePricingInput>,
) -> impl Responder {
    let client = data.into_inner();
    let input = input.into_inner();

    let rule_id = match ObjectId::parse_str(&path.into_inner().0) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid pricing ID"),
    };
    if input.from_type == input.to_type {
        return invalid_route();
    }

    let mut set = doc! {
        "from_type": input.from_type.as_str(),
        "from_location": input.from_location.trim(),
        "to_type": input.to_type.as_str(),
        "to_location": input.to_location.trim(),
        "vehicle_type": input.vehicle_type.trim(),
        "base_price": input.base_price,
        "is_active": input.is_active.unwrap_or(true),
        "updated_at": DateTime::now(),
    };
    if let Some(unit) = input.price_unit {
        set.insert(
            "price_unit",
            mongodb::bson::to_bson(&unit).unwrap_or_default(),
        );
    }

    match vehicle_rules(&client)
        .update_one(doc! { "_id": rule_id }, doc! { "$set": set })
        .await
    {
        Ok(result) if result.matched_count == 0 => {
            HttpResponse::NotFound().body("Pricing rule not found")
        }
        Ok(_) => {
            bus.publish(
                mongo::ROUTE_VEHICLE_PRICING,
                ChangeOp::Update,
                Some(rule_id.to_hex()),
            );
            HttpResponse::Ok().json(json!({ "updated": true }))
        }
        Err(err) => {
            eprintln!("Failed to update vehicle pricing: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to update pricing")
        }
    }
}

pub async fn delete_vehicle_pricing(
    data: web::Data<Arc<Client>>,
    bus: web::Data<EventBus>,
    path: web::Path<(String,)>,
) -> impl Responder {
    let client = data.into_inner();

    let rule_id = match ObjectId::parse_str(&path.into_inner().0) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid pricing ID"),
    };

    match vehicle_rules(&client)
        .delete_one(doc! { "_id": rule_id })
        .await
    {
        Ok(result) if result.deleted_count == 0 => {
            HttpResponse::NotFound().body("Pricing rule not found")
        }
        Ok(_) => {
            bus.publish(
                mongo::ROUTE_VEHICLE_PRICING,
                ChangeOp::Delete,
                Some(rule_id.to_hex()),
            );
            HttpResponse::Ok().json(json!({ "deleted": true }))
        }
        Err(err) => {
            eprintln!("Failed to delete vehicle pricing: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to delete pricing")
        }
    }
}
