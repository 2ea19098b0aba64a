use actix_web::{web, HttpResponse, Responder};
use chrono::{NaiveDate, NaiveTime};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime};
use mongodb::Client;
use serde_json::json;
use std::sync::Arc;

use crate::db::mongo;
use crate::models::driver::DriverProfile;
use crate::models::pricing::RouteQuery;
use crate::models::rides::{AdminRideInput, AssignDriverInput, Ride, RideStatus, RideStatusInput};
use crate::models::vehicle::Vehicle;
use crate::services::availability_service::AvailabilityService;
use crate::services::events::{ChangeOp, EventBus};
use crate::services::ride_service::RideService;

/// Every ride regardless of status, soonest first, with availability so the
/// console can show fill levels.
pub async fn list_rides(data: web::Data<Arc<Client>>) -> impl Responder {
    let client = data.into_inner();

    let rides = match mongo::collection::<Ride>(&client, mongo::RIDES)
        .find(doc! {})
        .sort(doc! { "departure_date": 1, "departure_time": 1 })
        .await
    {
        Ok(cursor) => match cursor.try_collect::<Vec<Ride>>().await {
            Ok(rides) => rides,
            Err(err) => {
                eprintln!("Failed to collect rides: {:?}", err);
                return HttpResponse::InternalServerError().body("Failed to fetch rides");
            }
        },
        Err(err) => {
            eprintln!("Failed to find rides: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to fetch rides");
        }
    };

    let ride_ids: Vec<ObjectId> = rides.iter().filter_map(|ride| ride.id).collect();
    let mut grouped = match RideService::bookings_by_ride(&client, &ride_ids).await {
        Ok(grouped) => grouped,
        Err(err) => {
            eprintln!("Failed to fetch bookings: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to fetch rides");
        }
    };

    let listings: Vec<_> = rides
        .into_iter()
        .map(|ride| {
            let bookings = ride
                .id
                .and_then(|id| grouped.remove(&id))
                .unwrap_or_default();
            let availability = AvailabilityService::availability(&ride, &bookings);
            json!({
                "ride": ride,
                "available_seats": availability.available_seats,
                "bookable_seats": availability.bookable_seats,
                "seats_taken": availability.seats_taken,
            })
        })
        .collect();

    HttpResponse::Ok().json(listings)
}

/// Publish a ride riders can join. No payment involved; the admin sets the
/// per-seat price directly or leaves it to the pricing tables at display
/// time.
pub async fn create_ride(
    data: web::Data<Arc<Client>>,
    bus: web::Data<EventBus>,
    input: web::Json<AdminRideInput>,
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
        return HttpResponse::BadRequest().json(json!({
            "error": "A route must pair one state with one university",
            "field": "to_type",
        }));
    }

    if NaiveDate::parse_from_str(input.departure_date.trim(), "%Y-%m-%d").is_err() {
        return HttpResponse::BadRequest().json(json!({
            "error": "Departure date must be YYYY-MM-DD",
            "field": "departure_date",
        }));
    }
    if NaiveTime::parse_from_str(input.departure_time.trim(), "%H:%M").is_err() {
        return HttpResponse::BadRequest().json(json!({
            "error": "Departure time must be HH:MM",
            "field": "departure_time",
        }));
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

    let status = match input.status {
        None => RideStatus::Available,
        Some(status) if status.is_joinable() => status,
        Some(_) => {
            return HttpResponse::BadRequest().json(json!({
                "error": "A new ride must start as pending or available",
                "field": "status",
            }))
        }
    };

    let now = DateTime::now();
    let ride = Ride {
        id: None,
        from_type: route.from_type,
        from_location: route.from_location,
        to_type: route.to_type,
        to_location: route.to_location,
        departure_date: input.departure_date.trim().to_string(),
        departure_time: input.departure_time.trim().to_string(),
        vehicle_type: vehicle.name.clone(),
        vehicle_capacity: Some(vehicle.capacity),
        seats_requested: None,
        price: None,
        price_per_seat: input.price_per_seat,
        user_id: None,
        driver_id: None,
        pickup_address: None,
        status,
        created_at: Some(now),
        updated_at: Some(now),
    };

    match mongo::collection::<Ride>(&client, mongo::RIDES)
        .insert_one(&ride)
        .await
    {
        Ok(result) => {
            let id = result.inserted_id.as_object_id().map(|id| id.to_hex());
            bus.publish(mongo::RIDES, ChangeOp::Insert, id.clone());
            HttpResponse::Ok().json(json!({ "ride_id": id }))
        }
        Err(err) => {
            eprintln!("Failed to create ride: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to create ride")
        }
    }
}

/// Move a ride through its lifecycle. Illegal jumps answer 409 with the
/// current status so the console can resync.
pub async fn update_ride_status(
    data: web::Data<Arc<Client>>,
    bus: web::Data<EventBus>,
    path: web::Path<(String,)>,
    input: web::Json<RideStatusInput>,
) -> impl Responder {
    let client = data.into_inner();

    let ride_id = match ObjectId::parse_str(&path.into_inner().0) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid ride ID"),
    };

    let rides = mongo::collection::<Ride>(&client, mongo::RIDES);
    let ride = match rides.find_one(doc! { "_id": ride_id }).await {
        Ok(Some(ride)) => ride,
        Ok(None) => return HttpResponse::NotFound().body("Ride not found"),
        Err(err) => {
            eprintln!("Failed to fetch ride: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to fetch ride");
        }
    };

    let target = input.into_inner().status;
    if ride.status.is_terminal() {
        return HttpResponse::Conflict().json(json!({
            "error": "ride_closed",
            "current_status": ride.status.as_str(),
        }));
    }
    if !ride.status.can_transition(target) {
        return HttpResponse::Conflict().json(json!({
            "error": "invalid_transition",
            "current_status": ride.status.as_str(),
            "requested_status": target.as_str(),
        }));
    }

    match rides
        .update_one(
            doc! { "_id": ride_id },
            doc! { "$set": { "status": target.as_str(), "updated_at": DateTime::now() } },
        )
        .await
    {
        Ok(_) => {
            bus.publish(mongo::RIDES, ChangeOp::Update, Some(ride_id.to_hex()));
            HttpResponse::Ok().json(json!({ "status": target.as_str() }))
        }
        Err(err) => {
            eprintln!("Failed to update ride status: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to update ride")
        }
    }
}

/// Put a driver on a ride. The target account must carry an active driver
/// profile; a bare user id is refused.
pub async fn assign_driver(
    data: web::Data<Arc<Client>>,
    bus: web::Data<EventBus>,
    path: web::Path<(String,)>,
    input: web::Json<AssignDriverInput>,
) -> impl Responder {
    let client = data.into_inner();

    let ride_id = match ObjectId::parse_str(&path.into_inner().0) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid ride ID"),
    };
    let driver_user_id = match ObjectId::parse_str(&input.driver_user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid driver user ID"),
    };

    match mongo::collection::<DriverProfile>(&client, mongo::DRIVER_PROFILES)
        .find_one(doc! { "user_id": driver_user_id, "is_active": { "$ne": false } })
        .await
    {
        Ok(Some(_)) => {}
        Ok(None) => {
            return HttpResponse::BadRequest().json(json!({
                "error": "not_a_driver",
                "message": "This account has no active driver profile",
            }))
        }
        Err(err) => {
            eprintln!("Failed to fetch driver profile: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to assign driver");
        }
    }

    match mongo::collection::<Ride>(&client, mongo::RIDES)
        .update_one(
            doc! { "_id": ride_id },
            doc! { "$set": { "driver_id": driver_user_id, "updated_at": DateTime::now() } },
        )
        .await
    {
        Ok(result) if result.matched_count == 0 => HttpResponse::NotFound().body("Ride not found"),
        Ok(_) => {
            bus.publish(mongo::RIDES, ChangeOp::Update, Some(ride_id.to_hex()));
            HttpResponse::Ok().json(json!({ "assigned": true }))
        }
        Err(err) => {
            eprintln!("Failed to assign driver: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to assign driver")
        }
    }
}

/// Bookings on one ride, for the console's manifest view.
pub async fn list_ride_bookings(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String,)>,
) -> impl Responder {
    let client = data.into_inner();

    let ride_id = match ObjectId::parse_str(&path.into_inner().0) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid ride ID"),
    };

    match RideService::bookings_for_ride(&client, ride_id).await {
        Ok(bookings) => HttpResponse::Ok().json(bookings),
        Err(err) => {
            eprintln!("Failed to fetch ride bookings: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch bookings")
        }
    }
}
