use actix_web::{web, HttpResponse, Responder};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime};
use mongodb::Client;
use serde_json::json;
use std::sync::Arc;

use crate::db::mongo;
use crate::middleware::role_auth::DriverIdentity;
use crate::models::account::{SigninInput, UserProfile, UserRole};
use crate::models::driver::DriverProfile;
use crate::models::rides::Ride;
use crate::routes::account::auth::generate_token;

/// The forced sign-out response: the credentials are fine but the account
/// has no driver profile, so the dashboard must not let it in.
fn driver_profile_missing() -> HttpResponse {
    HttpResponse::Forbidden().json(json!({
        "error": "driver_profile_missing",
        "message": "This account is not registered as a driver",
        "action": "sign_out",
    }))
}

/// Driver dashboard sign-in: normal credential check plus a gate on the
/// existence of an active driver profile.
pub async fn driver_signin(
    data: web::Data<Arc<Client>>,
    input: web::Json<SigninInput>,
) -> impl Responder {
    let client = data.into_inner();
    let profiles = mongo::collection::<UserProfile>(&client, mongo::PROFILES);

    let input = input.into_inner();
    let email = input.email.trim().to_lowercase();

    let user = match profiles.find_one(doc! { "email": &email }).await {
        Ok(Some(user)) => user,
        Ok(None) => return HttpResponse::NotFound().body("User not found"),
        Err(err) => {
            eprintln!("Database error: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to process signin");
        }
    };

    if !bcrypt::verify(&input.password, &user.password).unwrap_or(false) {
        return HttpResponse::Unauthorized().body("Invalid credentials");
    }

    let user_id = match user.id {
        Some(id) => id,
        None => return HttpResponse::InternalServerError().body("Invalid user record"),
    };

    let driver_profiles = mongo::collection::<DriverProfile>(&client, mongo::DRIVER_PROFILES);
    match driver_profiles
        .find_one(doc! { "user_id": user_id, "is_active": { "$ne": false } })
        .await
    {
        Ok(Some(_)) => {}
        Ok(None) => return driver_profile_missing(),
        Err(err) => {
            eprintln!("Failed to fetch driver profile: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to process signin");
        }
    }

    if let Err(err) = profiles
        .update_one(
            doc! { "_id": user_id },
            doc! { "$set": { "last_signin": DateTime::now(), "failed_signins": 0 } },
        )
        .await
    {
        eprintln!("Failed to update signin metadata: {:?}", err);
    }

    // Admins keep their role; everyone else signs in to the dashboard as a
    // driver.
    let role = match user.role {
        Some(UserRole::Admin) => UserRole::Admin,
        _ => UserRole::Driver,
    };
    match generate_token(&email, user_id, Some(&role)) {
        Ok(token) => HttpResponse::Ok().json(json!({ "auth_token": token })),
        Err(_) => HttpResponse::InternalServerError().body("Token generation failed"),
    }
}

pub async fn driver_profile(
    data: web::Data<Arc<Client>>,
    driver: DriverIdentity,
) -> impl Responder {
    let client = data.into_inner();

    let user_id = match ObjectId::parse_str(&driver.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
    };

    match mongo::collection::<DriverProfile>(&client, mongo::DRIVER_PROFILES)
        .find_one(doc! { "user_id": user_id })
        .await
    {
        Ok(Some(profile)) => HttpResponse::Ok().json(profile),
        Ok(None) => driver_profile_missing(),
        Err(err) => {
            eprintln!("Failed to fetch driver profile: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch driver profile")
        }
    }
}

/// Rides assigned to the signed-in driver, soonest first.
pub async fn driver_rides(data: web::Data<Arc<Client>>, driver: DriverIdentity) -> impl Responder {
    let client = data.into_inner();

    let user_id = match ObjectId::parse_str(&driver.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
    };

    match mongo::collection::<Ride>(&client, mongo::RIDES)
        .find(doc! { "driver_id": user_id })
        .sort(doc! { "departure_date": 1, "departure_time": 1 })
        .await
    {
        Ok(cursor) => match cursor.try_collect::<Vec<Ride>>().await {
            Ok(rides) => HttpResponse::Ok().json(rides),
            Err(err) => {
                eprintln!("Failed to collect driver rides: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to fetch rides")
            }
        },
        Err(err) => {
            eprintln!("Failed to find driver rides: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch rides")
        }
    }
}
