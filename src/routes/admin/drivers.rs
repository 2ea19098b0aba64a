use actix_web::{web, HttpResponse, Responder};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime};
use mongodb::Client;
use serde_json::json;
use std::sync::Arc;

use crate::db::mongo;
use crate::models::account::{UserProfile, UserRole};
use crate::models::driver::{DriverProfile, DriverProfileInput};
use crate::services::events::{ChangeOp, EventBus};

pub async fn list_driver_profiles(data: web::Data<Arc<Client>>) -> impl Responder {
    let client = data.into_inner();

    match mongo::collection::<DriverProfile>(&client, mongo::DRIVER_PROFILES)
        .find(doc! {})
        .await
    {
        Ok(cursor) => match cursor.try_collect::<Vec<DriverProfile>>().await {
            Ok(profiles) => HttpResponse::Ok().json(profiles),
            Err(err) => {
                eprintln!("Failed to collect driver profiles: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to fetch driver profiles")
            }
        },
        Err(err) => {
            eprintln!("Failed to find driver profiles: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch driver profiles")
        }
    }
}

/// Register an account as a driver: create (or reactivate) its driver
/// profile and promote the role so the dashboard gate lets it in.
pub async fn create_driver_profile(
    data: web::Data<Arc<Client>>,
    bus: web::Data<EventBus>,
    input: web::Json<DriverProfileInput>,
) -> impl Responder {
    let client = data.into_inner();
    let input = input.into_inner();

    let user_id = match ObjectId::parse_str(&input.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
    };

    let profiles = mongo::collection::<UserProfile>(&client, mongo::PROFILES);
    let user = match profiles.find_one(doc! { "_id": user_id }).await {
        Ok(Some(user)) => user,
        Ok(None) => return HttpResponse::NotFound().body("User not found"),
        Err(err) => {
            eprintln!("Failed to fetch user: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to create driver profile");
        }
    };

    let now = DateTime::now();
    let mut set = doc! { "is_active": true, "updated_at": now };
    if let Some(license_number) = &input.license_number {
        set.insert("license_number", license_number);
    }
    if let Some(phone_number) = &input.phone_number {
        set.insert("phone_number", phone_number);
    }

    let result = mongo::collection::<DriverProfile>(&client, mongo::DRIVER_PROFILES)
        .update_one(
            doc! { "user_id": user_id },
            doc! { "$set": set, "$setOnInsert": { "created_at": now } },
        )
        .upsert(true)
        .await;

    match result {
        Ok(_) => {
            // Admins keep their role through driver registration.
            if user.role != Some(UserRole::Admin) {
                if let Err(err) = profiles
                    .update_one(
                        doc! { "_id": user_id },
                        doc! { "$set": { "role": UserRole::Driver.as_str() } },
                    )
                    .await
                {
                    eprintln!("Failed to promote user to driver: {:?}", err);
                }
            }
            bus.publish(
                mongo::DRIVER_PROFILES,
                ChangeOp::Update,
                Some(user_id.to_hex()),
            );
            HttpResponse::Ok().json(json!({ "user_id": user_id.to_hex(), "is_active": true }))
        }
        Err(err) => {
            eprintln!("Failed to upsert driver profile: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to create driver profile")
        }
    }
}

/// Deactivate a driver profile. The account keeps its bookings and history;
/// the driver dashboard just stops accepting it.
pub async fn deactivate_driver_profile(
    data: web::Data<Arc<Client>>,
    bus: web::Data<EventBus>,
    path: web::Path<(String,)>,
) -> impl Responder {
    let client = data.into_inner();

    let user_id = match ObjectId::parse_str(&path.into_inner().0) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
    };

    match mongo::collection::<DriverProfile>(&client, mongo::DRIVER_PROFILES)
        .update_one(
            doc! { "user_id": user_id },
            doc! { "$set": { "is_active": false, "updated_at": DateTime::now() } },
        )
        .await
    {
        Ok(result) if result.matched_count == 0 => {
            HttpResponse::NotFound().body("Driver profile not found")
        }
        Ok(_) => {
            bus.publish(
                mongo::DRIVER_PROFILES,
                ChangeOp::Update,
                Some(user_id.to_hex()),
            );
            HttpResponse::Ok().json(json!({ "is_active": false }))
        }
        Err(err) => {
            eprintln!("Failed to deactivate driver profile: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to deactivate driver profile")
        }
    }
}
