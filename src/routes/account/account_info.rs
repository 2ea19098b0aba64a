use actix_web::{web, HttpResponse, Responder};
use mongodb::bson::{doc, oid::ObjectId, DateTime};
use mongodb::Client;
use std::sync::Arc;

use crate::db::mongo;
use crate::middleware::auth::Claims;
use crate::models::account::{ProfileUpdateInput, UserProfile, UserRole, UserSession};

pub async fn get_profile(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String,)>,
    claims: Claims,
) -> impl Responder {
    if path.into_inner().0 != claims.user_id {
        return HttpResponse::Forbidden().body("Forbidden");
    }

    let client = data.into_inner();
    let collection = mongo::collection::<UserProfile>(&client, mongo::PROFILES);

    let user_id = match ObjectId::parse_str(&claims.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
    };

    match collection.find_one(doc! { "_id": user_id }).await {
        Ok(Some(user)) => {
            let session = UserSession {
                id: user.id.unwrap_or_default(),
                email: user.email,
                first_name: user.first_name.unwrap_or_default(),
                last_name: user.last_name.unwrap_or_default(),
                role: user.role.unwrap_or(UserRole::User).as_str().to_string(),
                created_at: user.created_at.unwrap_or_else(DateTime::now),
            };
            HttpResponse::Ok().json(session)
        }
        Ok(None) => HttpResponse::NotFound().body("User not found"),
        Err(err) => {
            eprintln!("Failed to fetch profile: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch profile")
        }
    }
}

pub async fn update_profile(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String,)>,
    input: web::Json<ProfileUpdateInput>,
    claims: Claims,
) -> impl Responder {
    if path.into_inner().0 != claims.user_id {
        return HttpResponse::Forbidden().body("Forbidden");
    }

    let client = data.into_inner();
    let collection = mongo::collection::<UserProfile>(&client, mongo::PROFILES);

    let user_id = match ObjectId::parse_str(&claims.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
    };

    let input = input.into_inner();
    let mut updates = doc! { "updated_at": DateTime::now() };
    if let Some(first_name) = input.first_name {
        updates.insert("first_name", first_name);
    }
    if let Some(last_name) = input.last_name {
        updates.insert("last_name", last_name);
    }
    if let Some(phone_number) = input.phone_number {
        updates.insert("phone_number", phone_number);
    }

    match collection
        .update_one(doc! { "_id": user_id }, doc! { "$set": updates })
        .await
    {
        Ok(result) => {
            if result.matched_count == 0 {
                return HttpResponse::NotFound().body("User not found");
            }
            HttpResponse::Ok().body("User information updated")
        }
        Err(err) => {
            eprintln!("Failed to update profile: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to update user information")
        }
    }
}
