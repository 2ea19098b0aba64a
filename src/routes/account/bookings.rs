use actix_web::{web, HttpResponse, Responder};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::Client;
use std::sync::Arc;

use crate::db::mongo;
use crate::middleware::auth::Claims;
use crate::models::bookings::Booking;

/// A rider's own bookings, newest first.
pub async fn get_all_bookings(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String,)>,
    claims: Claims,
) -> impl Responder {
    if path.into_inner().0 != claims.user_id {
        return HttpResponse::Forbidden().body("Forbidden");
    }

    let client = data.into_inner();
    let collection = mongo::collection::<Booking>(&client, mongo::BOOKINGS);

    let user_id = match ObjectId::parse_str(&claims.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
    };

    match collection
        .find(doc! { "user_id": user_id })
        .sort(doc! { "created_at": -1 })
        .await
    {
        Ok(cursor) => match cursor.try_collect::<Vec<Booking>>().await {
            Ok(bookings) => HttpResponse::Ok().json(bookings),
            Err(err) => {
                eprintln!("Error collecting bookings: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to retrieve bookings")
            }
        },
        Err(err) => {
            eprintln!("Error fetching bookings: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch bookings")
        }
    }
}

pub async fn get_booking_by_id(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String, String)>,
    claims: Claims,
) -> impl Responder {
    let (user_id, booking_id) = path.into_inner();
    if user_id != claims.user_id {
        return HttpResponse::Forbidden().body("Forbidden");
    }

    let client = data.into_inner();
    let collection = mongo::collection::<Booking>(&client, mongo::BOOKINGS);

    let booking_object_id = match ObjectId::parse_str(&booking_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid booking ID format"),
    };
    let user_object_id = match ObjectId::parse_str(&claims.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
    };

    // Owner-scoped filter: a booking is only visible to the rider who made
    // it.
    let filter = doc! {
        "_id": booking_object_id,
        "user_id": user_object_id,
    };

    match collection.find_one(filter).await {
        Ok(Some(booking)) => HttpResponse::Ok().json(booking),
        Ok(None) => HttpResponse::NotFound().body("Booking not found"),
        Err(err) => {
            eprintln!("Error fetching booking: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch booking")
        }
    }
}
