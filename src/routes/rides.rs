use actix_web::{web, HttpResponse, Responder};
use chrono::{NaiveDate, NaiveTime};
use mongodb::bson::{doc, oid::ObjectId, DateTime};
use mongodb::Client;
use serde_json::json;
use std::sync::Arc;

use crate::db::mongo;
use crate::middleware::auth::Claims;
use crate::models::bookings::BookingInput;
use crate::models::pricing::{BookingMode, RouteQuery};
use crate::models::rides::{Ride, RideInput, RideStatus};
use crate::models::vehicle::Vehicle;
use crate::services::availability_service::AvailabilityService;
use crate::services::events::{ChangeOp, EventBus};
use crate::services::payment::interface::{PaymentError, PaymentOperations};
use crate::services::payment::paystack::PaystackClient;
use crate::services::pricing_service::PricingService;
use crate::services::ride_service::{ReserveOutcome, RideService};

/// Upcoming joinable rides with availability and display pricing.
pub async fn get_available_rides(data: web::Data<Arc<Client>>) -> impl Responder {
    let client = data.into_inner();
    match RideService::available_rides(&client).await {
        Ok(listings) => HttpResponse::Ok().json(listings),
        Err(err) => {
            eprintln!("Failed to list available rides: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to list rides")
        }
    }
}

pub async fn get_ride(data: web::Data<Arc<Client>>, path: web::Path<(String,)>) -> impl Responder {
    let client = data.into_inner();

    let ride_id = match ObjectId::parse_str(&path.into_inner().0) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid ride ID"),
    };

    let ride = match mongo::collection::<Ride>(&client, mongo::RIDES)
        .find_one(doc! { "_id": ride_id })
        .await
    {
        Ok(Some(ride)) => ride,
        Ok(None) => return HttpResponse::NotFound().body("Ride not found"),
        Err(err) => {
            eprintln!("Failed to fetch ride: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to fetch ride");
        }
    };

    let bookings = match RideService::bookings_for_ride(&client, ride_id).await {
        Ok(bookings) => bookings,
        Err(err) => {
            eprintln!("Failed to fetch bookings for ride: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to fetch ride");
        }
    };

    let availability = AvailabilityService::availability(&ride, &bookings);
    let display_price_per_seat = RideService::display_price_per_seat(&ride, availability.capacity);
    HttpResponse::Ok().json(json!({
        "ride": ride,
        "display_price_per_seat": display_price_per_seat,
        "available_seats": availability.available_seats,
        "bookable_seats": availability.bookable_seats,
    }))
}

/// Legacy custom-booking path: a rider books a route of their own, which
/// materialises as a confirmed ride they own. Payment is verified with the
/// gateway before anything is written.
pub async fn create_ride(
    data: web::Data<Arc<Client>>,
    gateway: web::Data<PaystackClient>,
    bus: web::Data<EventBus>,
    input: web::Json<RideInput>,
    claims: Claims,
) -> impl Responder {
    let client = data.into_inner();
    let input = input.into_inner();

    let user_id = match ObjectId::parse_str(&claims.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
    };

    let route = RouteQuery {
        from_type: input.from_type,
        from_location: input.from_location.clone(),
        to_type: input.to_type,
        to_location: input.to_location.clone(),
    };
    if !route.kinds_differ() {
        return HttpResponse::BadRequest().json(json!({
            "error": "A route must pair one state with one university",
            "field": "to_type"
        }));
    }

    let date = match NaiveDate::parse_from_str(input.departure_date.trim(), "%Y-%m-%d") {
        Ok(date) => date,
        Err(_) => {
            return HttpResponse::BadRequest().json(json!({
                "error": "Departure date must be YYYY-MM-DD",
                "field": "departure_date"
            }))
        }
    };
    if NaiveTime::parse_from_str(input.departure_time.trim(), "%H:%M").is_err() {
        return HttpResponse::BadRequest().json(json!({
            "error": "Departure time must be HH:MM",
            "field": "departure_time"
        }));
    }
    if date < chrono::Utc::now().date_naive() {
        return HttpResponse::BadRequest().json(json!({
            "error": "Departure date cannot be in the past",
            "field": "departure_date"
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

    let seats = match input.mode {
        BookingMode::Join => input.seats.unwrap_or(1),
        BookingMode::Full => vehicle.capacity,
    };
    if seats == 0 {
        return HttpResponse::BadRequest()
            .json(json!({ "error": "At least one seat is required", "field": "seats" }));
    }

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
    if quote.total <= 0.0 {
        return HttpResponse::BadRequest()
            .json(json!({ "error": "No price is configured for this selection" }));
    }

    match verify_payment(&gateway, &input.payment_reference, quote.total).await {
        Ok(()) => {}
        Err(response) => return response,
    }

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
        seats_requested: Some(seats),
        price: match input.mode {
            BookingMode::Full => Some(quote.total),
            BookingMode::Join => None,
        },
        price_per_seat: Some(quote.per_seat),
        user_id: Some(user_id),
        driver_id: None,
        pickup_address: input.pickup_address,
        status: RideStatus::Confirmed,
        created_at: Some(now),
        updated_at: Some(now),
    };

    match mongo::collection::<Ride>(&client, mongo::RIDES)
        .insert_one(&ride)
        .await
    {
        Ok(result) => {
            let ride_id = result
                .inserted_id
                .as_object_id()
                .expect("inserted ride has an ObjectId");
            bus.publish(mongo::RIDES, ChangeOp::Insert, Some(ride_id.to_hex()));
            HttpResponse::Ok().json(json!({
                "ride_id": ride_id.to_hex(),
                "total": quote.total,
            }))
        }
        Err(err) => {
            eprintln!("Failed to create ride: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to create ride")
        }
    }
}

/// Join an admin-created ride: verify payment, then claim seats with the
/// insert-then-verify reservation.
pub async fn join_ride(
    data: web::Data<Arc<Client>>,
    gateway: web::Data<PaystackClient>,
    bus: web::Data<EventBus>,
    path: web::Path<(String,)>,
    input: web::Json<BookingInput>,
    claims: Claims,
) -> impl Responder {
    let client = data.into_inner();
    let input = input.into_inner();

    if input.seats == 0 {
        return HttpResponse::BadRequest()
            .json(json!({ "error": "At least one seat is required", "field": "seats" }));
    }

    let user_id = match ObjectId::parse_str(&claims.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
    };
    let ride_id = match ObjectId::parse_str(&path.into_inner().0) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid ride ID"),
    };

    let ride = match mongo::collection::<Ride>(&client, mongo::RIDES)
        .find_one(doc! { "_id": ride_id })
        .await
    {
        Ok(Some(ride)) => ride,
        Ok(None) => return HttpResponse::NotFound().body("Ride not found"),
        Err(err) => {
            eprintln!("Failed to fetch ride: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to fetch ride");
        }
    };
    if !ride.status.is_joinable() {
        return HttpResponse::BadRequest().json(json!({ "error": "Ride is not joinable" }));
    }

    let bookings = match RideService::bookings_for_ride(&client, ride_id).await {
        Ok(bookings) => bookings,
        Err(err) => {
            eprintln!("Failed to fetch bookings: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to fetch ride");
        }
    };
    let availability = AvailabilityService::availability(&ride, &bookings);
    if input.seats > availability.bookable_seats {
        return HttpResponse::Conflict().json(json!({
            "error": "not_enough_seats",
            "bookable_seats": availability.bookable_seats,
        }));
    }

    let per_seat = RideService::display_price_per_seat(&ride, availability.capacity);
    let total = per_seat * input.seats as f64;

    match verify_payment(&gateway, &input.payment_reference, total).await {
        Ok(()) => {}
        Err(response) => return response,
    }

    match RideService::reserve_seats(
        &client,
        &ride,
        user_id,
        input.seats,
        total,
        &input.payment_reference,
    )
    .await
    {
        Ok(ReserveOutcome::Reserved(booking_id)) => {
            bus.publish(mongo::BOOKINGS, ChangeOp::Insert, Some(booking_id.to_hex()));
            HttpResponse::Ok().json(json!({
                "booking_id": booking_id.to_hex(),
                "total": total,
            }))
        }
        Ok(ReserveOutcome::Oversold) => HttpResponse::Conflict().json(json!({
            "error": "ride_oversold",
            "message": "Another rider took the last seat; your payment will be refunded",
        })),
        Err(err) => {
            eprintln!("Failed to reserve seats: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to create booking")
        }
    }
}

/// Shared gateway check: declined charges answer 402, an unreachable
/// gateway answers 502 so the caller knows a retry is worthwhile.
pub(crate) async fn verify_payment(
    gateway: &PaystackClient,
    reference: &str,
    expected_total: f64,
) -> Result<(), HttpResponse> {
    match gateway.verify_transaction(reference).await {
        Ok(verification) if verification.covers(expected_total) => Ok(()),
        Ok(verification) => {
            log::warn!(
                "Payment {} does not cover quote: paid={} amount={} expected={}",
                reference,
                verification.paid,
                verification.amount,
                expected_total
            );
            Err(HttpResponse::PaymentRequired().json(json!({
                "error": "payment_not_confirmed",
                "message": "The payment could not be confirmed for the quoted amount",
            })))
        }
        Err(PaymentError::Declined(message)) => {
            Err(HttpResponse::PaymentRequired().json(json!({
                "error": "payment_declined",
                "message": message,
            })))
        }
        Err(PaymentError::Unreachable(message)) => {
            eprintln!("Payment gateway unreachable: {}", message);
            Err(HttpResponse::BadGateway().json(json!({
                "error": "gateway_unreachable",
                "message": "Could not reach the payment gateway; please retry",
            })))
        }
    }
}
