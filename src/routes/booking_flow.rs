use actix_web::{web, HttpResponse, Responder};
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::Client;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::db::mongo;
use crate::middleware::auth::Claims;
use crate::models::booking_flow::{BookingDraft, BookingFlow, FlowEvent};
use crate::models::pricing::{BookingMode, RouteQuery};
use crate::models::rides::Ride;
use crate::models::vehicle::Vehicle;
use crate::services::availability_service::AvailabilityService;
use crate::services::booking_flow::{
    Advance, AdvanceContext, BookingFlowService, Completion, SelectedVehicle,
};
use crate::services::draft_service::DraftService;
use crate::services::events::{ChangeOp, EventBus};
use crate::services::payment::paystack::PaystackClient;
use crate::services::pricing_service::PricingService;
use crate::services::ride_service::{ReserveOutcome, RideService};

#[derive(Debug, Deserialize)]
pub struct StartFlowInput {
    pub mode: BookingMode,
}

#[derive(Debug, Deserialize)]
pub struct CompleteInput {
    pub payment_reference: String,
}

fn parse_user_id(claims: &Claims) -> Result<ObjectId, HttpResponse> {
    ObjectId::parse_str(&claims.user_id)
        .map_err(|_| HttpResponse::BadRequest().body("Invalid user ID"))
}

async fn load_owned_draft(
    client: &Client,
    draft_id: &str,
    user_id: ObjectId,
) -> Result<BookingDraft, HttpResponse> {
    let draft_id = ObjectId::parse_str(draft_id)
        .map_err(|_| HttpResponse::BadRequest().body("Invalid draft ID"))?;

    match DraftService::find_owned(client, draft_id, user_id).await {
        Ok(Some(draft)) => Ok(draft),
        Ok(None) => Err(HttpResponse::NotFound().body("Booking draft not found")),
        Err(err) => {
            eprintln!("Failed to fetch booking draft: {:?}", err);
            Err(HttpResponse::InternalServerError().body("Failed to fetch booking draft"))
        }
    }
}

async fn persist_flow(
    client: &Client,
    draft: &BookingDraft,
    flow: &BookingFlow,
) -> Result<(), HttpResponse> {
    DraftService::save_flow(client, draft, flow)
        .await
        .map_err(|err| {
            eprintln!("Failed to update booking draft: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to save booking draft")
        })
}

async fn insert_draft(
    client: &Client,
    user_id: ObjectId,
    flow: BookingFlow,
) -> Result<BookingDraft, HttpResponse> {
    DraftService::start(client, user_id, flow)
        .await
        .map_err(|err| {
            eprintln!("Failed to create booking draft: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to create booking draft")
        })
}

/// Start the custom four-step flow at the location step.
pub async fn start(
    data: web::Data<Arc<Client>>,
    input: web::Json<StartFlowInput>,
    claims: Claims,
) -> impl Responder {
    let client = data.into_inner();
    let user_id = match parse_user_id(&claims) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match insert_draft(&client, user_id, BookingFlow::Location { mode: input.mode }).await {
        Ok(draft) => HttpResponse::Ok().json(draft),
        Err(response) => response,
    }
}

/// Start the reduced join flow against an existing ride: straight to seat
/// selection, since route, schedule and vehicle are fixed.
pub async fn start_prefilled(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String,)>,
    claims: Claims,
) -> impl Responder {
    let client = data.into_inner();
    let user_id = match parse_user_id(&claims) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let ride_id = match ObjectId::parse_str(&path.into_inner().0) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid ride ID"),
    };

    match mongo::collection::<Ride>(&client, mongo::RIDES)
        .find_one(doc! { "_id": ride_id })
        .await
    {
        Ok(Some(ride)) if ride.status.is_joinable() => {}
        Ok(Some(_)) => {
            return HttpResponse::BadRequest().json(json!({ "error": "Ride is not joinable" }))
        }
        Ok(None) => return HttpResponse::NotFound().body("Ride not found"),
        Err(err) => {
            eprintln!("Failed to fetch ride: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to fetch ride");
        }
    }

    match insert_draft(&client, user_id, BookingFlow::SeatSelection { ride_id }).await {
        Ok(draft) => HttpResponse::Ok().json(draft),
        Err(response) => response,
    }
}

/// The rider's in-progress wizard, if any. This is how a selection survives
/// the sign-in redirect round-trip.
pub async fn current(data: web::Data<Arc<Client>>, claims: Claims) -> impl Responder {
    let client = data.into_inner();
    let user_id = match parse_user_id(&claims) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match DraftService::latest(&client, user_id).await {
        Ok(Some(draft)) => HttpResponse::Ok().json(draft),
        Ok(None) => HttpResponse::NotFound().body("No booking in progress"),
        Err(err) => {
            eprintln!("Failed to fetch booking draft: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch booking draft")
        }
    }
}

pub async fn get_flow(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String,)>,
    claims: Claims,
) -> impl Responder {
    let client = data.into_inner();
    let user_id = match parse_user_id(&claims) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match load_owned_draft(&client, &path.into_inner().0, user_id).await {
        Ok(draft) => HttpResponse::Ok().json(draft),
        Err(response) => response,
    }
}

/// Gather everything the pure transition function needs for this event.
async fn build_context(
    client: &Client,
    flow: &BookingFlow,
    event: &FlowEvent,
) -> Result<AdvanceContext, HttpResponse> {
    let mut ctx = AdvanceContext::new(chrono::Utc::now().date_naive());

    match (flow, event) {
        (
            BookingFlow::Location {
                mode: BookingMode::Join,
            },
            FlowEvent::SubmitLocation {
                from_type,
                from_location,
                to_type,
                to_location,
                ..
            },
        ) => {
            let route = RouteQuery {
                from_type: *from_type,
                from_location: from_location.clone(),
                to_type: *to_type,
                to_location: to_location.clone(),
            };
            // Same-kind routes are rejected by the machine before the count
            // matters; skip the query for those.
            if route.kinds_differ() {
                let count = RideService::count_candidate_rides(client, &route)
                    .await
                    .map_err(|err| {
                        eprintln!("Failed to count candidate rides: {:?}", err);
                        HttpResponse::InternalServerError().body("Failed to check for rides")
                    })?;
                ctx.candidate_rides = Some(count);
            }
        }
        (
            BookingFlow::Vehicle { mode, route, .. },
            FlowEvent::SubmitVehicle { vehicle_id, seats },
        ) => {
            let parsed_id = match ObjectId::parse_str(vehicle_id) {
                Ok(id) => Some(id),
                Err(_) => None,
            };
            if let Some(vehicle_id) = parsed_id {
                let vehicle = mongo::collection::<Vehicle>(client, mongo::VEHICLES)
                    .find_one(doc! { "_id": vehicle_id, "is_active": { "$ne": false } })
                    .await
                    .map_err(|err| {
                        eprintln!("Failed to fetch vehicle: {:?}", err);
                        HttpResponse::InternalServerError().body("Failed to fetch vehicle")
                    })?;
                if let Some(vehicle) = vehicle {
                    let (route_rules, vehicle_rules) = RideService::load_pricing_tables(client)
                        .await
                        .map_err(|err| {
                            eprintln!("Failed to load pricing tables: {:?}", err);
                            HttpResponse::InternalServerError().body("Failed to load pricing")
                        })?;
                    let quote = PricingService::quote(
                        &route_rules,
                        &vehicle_rules,
                        route,
                        &vehicle,
                        *mode,
                        seats.unwrap_or(1),
                    );
                    ctx.vehicle = Some(SelectedVehicle {
                        id: vehicle_id,
                        name: vehicle.name.clone(),
                    });
                    ctx.quote_total = Some(quote.total);
                }
            }
        }
        (BookingFlow::SeatSelection { ride_id }, FlowEvent::SubmitSeats { seats }) => {
            let ride = mongo::collection::<Ride>(client, mongo::RIDES)
                .find_one(doc! { "_id": ride_id })
                .await
                .map_err(|err| {
                    eprintln!("Failed to fetch ride: {:?}", err);
                    HttpResponse::InternalServerError().body("Failed to fetch ride")
                })?
                .ok_or_else(|| HttpResponse::NotFound().body("Ride not found"))?;

            let bookings = RideService::bookings_for_ride(client, *ride_id)
                .await
                .map_err(|err| {
                    eprintln!("Failed to fetch bookings: {:?}", err);
                    HttpResponse::InternalServerError().body("Failed to fetch ride")
                })?;
            let availability = AvailabilityService::availability(&ride, &bookings);
            let per_seat = RideService::display_price_per_seat(&ride, availability.capacity);

            ctx.bookable_seats = Some(availability.bookable_seats);
            ctx.quote_total = Some(per_seat * *seats as f64);
        }
        _ => {}
    }

    Ok(ctx)
}

pub async fn advance(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String,)>,
    input: web::Json<FlowEvent>,
    claims: Claims,
) -> impl Responder {
    let client = data.into_inner();
    let user_id = match parse_user_id(&claims) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let draft = match load_owned_draft(&client, &path.into_inner().0, user_id).await {
        Ok(draft) => draft,
        Err(response) => return response,
    };

    let event = input.into_inner();
    let ctx = match build_context(&client, &draft.flow, &event).await {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };

    match BookingFlowService::advance(&draft.flow, event, &ctx) {
        Ok(Advance::Next(flow)) => {
            if let Err(response) = persist_flow(&client, &draft, &flow).await {
                return response;
            }
            HttpResponse::Ok().json(json!({ "advanced": true, "flow": flow }))
        }
        Ok(Advance::SwitchedToFull(flow)) => {
            if let Err(response) = persist_flow(&client, &draft, &flow).await {
                return response;
            }
            HttpResponse::Ok().json(json!({
                "advanced": false,
                "flow": flow,
                "reason": "no_candidate_rides",
                "message": "No rides are available to join on this route; switched to a full booking",
            }))
        }
        Err(error) => HttpResponse::BadRequest().json(json!({
            "error": error,
            "message": error.message(),
        })),
    }
}

pub async fn back(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String,)>,
    claims: Claims,
) -> impl Responder {
    let client = data.into_inner();
    let user_id = match parse_user_id(&claims) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let draft = match load_owned_draft(&client, &path.into_inner().0, user_id).await {
        Ok(draft) => draft,
        Err(response) => return response,
    };

    match BookingFlowService::back(&draft.flow) {
        Ok(flow) => {
            if let Err(response) = persist_flow(&client, &draft, &flow).await {
                return response;
            }
            HttpResponse::Ok().json(json!({ "flow": flow }))
        }
        Err(error) => HttpResponse::BadRequest().json(json!({
            "error": error,
            "message": error.message(),
        })),
    }
}

/// Final step: verify the payment with the gateway and materialise the
/// booking or ride. Any failure leaves the draft on the payment step so the
/// rider can retry; the draft is deleted only on success.
pub async fn complete(
    data: web::Data<Arc<Client>>,
    gateway: web::Data<PaystackClient>,
    bus: web::Data<EventBus>,
    path: web::Path<(String,)>,
    input: web::Json<CompleteInput>,
    claims: Claims,
) -> impl Responder {
    let client = data.into_inner();
    let user_id = match parse_user_id(&claims) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let draft = match load_owned_draft(&client, &path.into_inner().0, user_id).await {
        Ok(draft) => draft,
        Err(response) => return response,
    };

    let completion = match BookingFlowService::complete(&draft.flow) {
        Ok(completion) => completion,
        Err(error) => {
            return HttpResponse::BadRequest().json(json!({
                "error": error,
                "message": error.message(),
            }))
        }
    };

    let reference = input.into_inner().payment_reference;

    match completion {
        Completion::CustomRide {
            mode,
            route,
            pickup_address,
            departure_date,
            departure_time,
            vehicle_id,
            vehicle_type: _,
            seats,
            total,
        } => {
            // Re-fetch the vehicle: the ride stores its real capacity, and
            // the vehicle may have been deactivated since the wizard step.
            let vehicle = match mongo::collection::<Vehicle>(&client, mongo::VEHICLES)
                .find_one(doc! { "_id": vehicle_id, "is_active": { "$ne": false } })
                .await
            {
                Ok(Some(vehicle)) => vehicle,
                Ok(None) => {
                    return HttpResponse::Conflict().json(json!({
                        "error": "vehicle_unavailable",
                        "message": "The selected vehicle is no longer available",
                    }))
                }
                Err(err) => {
                    eprintln!("Failed to fetch vehicle: {:?}", err);
                    return HttpResponse::InternalServerError().body("Failed to fetch vehicle");
                }
            };

            if let Err(response) =
                crate::routes::rides::verify_payment(&gateway, &reference, total).await
            {
                return response;
            }

            let ride = RideService::custom_ride(
                mode,
                route,
                pickup_address,
                departure_date,
                departure_time,
                &vehicle,
                seats,
                total,
                user_id,
            );

            match mongo::collection::<Ride>(&client, mongo::RIDES)
                .insert_one(&ride)
                .await
            {
                Ok(result) => {
                    let ride_id = result
                        .inserted_id
                        .as_object_id()
                        .expect("inserted ride has an ObjectId");
                    DraftService::consume(&client, &draft).await;
                    bus.publish(mongo::RIDES, ChangeOp::Insert, Some(ride_id.to_hex()));
                    HttpResponse::Ok().json(json!({ "ride_id": ride_id.to_hex(), "total": total }))
                }
                Err(err) => {
                    // Draft stays on the payment step for a retry.
                    eprintln!("Failed to create ride: {:?}", err);
                    HttpResponse::InternalServerError().body("Failed to create ride")
                }
            }
        }
        Completion::JoinRide {
            ride_id,
            seats,
            total,
        } => {
            let ride = match mongo::collection::<Ride>(&client, mongo::RIDES)
                .find_one(doc! { "_id": ride_id })
                .await
            {
                Ok(Some(ride)) if ride.status.is_joinable() => ride,
                Ok(Some(_)) | Ok(None) => {
                    return HttpResponse::Conflict().json(json!({
                        "error": "ride_unavailable",
                        "message": "This ride can no longer be joined",
                    }))
                }
                Err(err) => {
                    eprintln!("Failed to fetch ride: {:?}", err);
                    return HttpResponse::InternalServerError().body("Failed to fetch ride");
                }
            };

            if let Err(response) =
                crate::routes::rides::verify_payment(&gateway, &reference, total).await
            {
                return response;
            }

            match RideService::reserve_seats(&client, &ride, user_id, seats, total, &reference)
                .await
            {
                Ok(ReserveOutcome::Reserved(booking_id)) => {
                    DraftService::consume(&client, &draft).await;
                    bus.publish(mongo::BOOKINGS, ChangeOp::Insert, Some(booking_id.to_hex()));
                    HttpResponse::Ok()
                        .json(json!({ "booking_id": booking_id.to_hex(), "total": total }))
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
    }
}
