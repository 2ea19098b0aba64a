use actix_web::{web, HttpResponse, Responder};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, DateTime};
use mongodb::error::WriteError;
use mongodb::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::db::mongo;
use crate::middleware::auth::Claims;
use crate::models::account::{SigninInput, SignupInput, UserProfile, UserRole, UserSession};

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    auth_token: String,
}

pub async fn signup(
    data: web::Data<Arc<Client>>,
    input: web::Json<SignupInput>,
) -> impl Responder {
    let client = data.into_inner();
    let collection = mongo::collection::<UserProfile>(&client, mongo::PROFILES);

    let input = input.into_inner();

    if !is_valid_email(&input.email) {
        return HttpResponse::BadRequest()
            .json(json!({ "error": "Invalid email address", "field": "email" }));
    }
    if input.password.len() < 8 {
        return HttpResponse::BadRequest().json(json!({
            "error": "Password must be at least 8 characters",
            "field": "password"
        }));
    }

    let hashed = match bcrypt::hash(&input.password, bcrypt::DEFAULT_COST) {
        Ok(hashed) => hashed,
        Err(err) => {
            eprintln!("Failed to hash password: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to create user");
        }
    };

    let now = DateTime::now();
    let profile = UserProfile {
        id: None,
        email: input.email.trim().to_lowercase(),
        password: hashed,
        first_name: input.first_name,
        last_name: input.last_name,
        phone_number: input.phone_number,
        role: Some(UserRole::User),
        last_signin: None,
        failed_signins: Some(0),
        created_at: Some(now),
        updated_at: Some(now),
    };

    match collection.insert_one(&profile).await {
        Ok(result) => {
            let user_id = result
                .inserted_id
                .as_object_id()
                .expect("inserted profile has an ObjectId");
            match generate_token(&profile.email, user_id, profile.role.as_ref()) {
                Ok(token) => HttpResponse::Ok().json(TokenResponse { auth_token: token }),
                Err(_) => HttpResponse::InternalServerError().body("Token generation failed"),
            }
        }
        Err(err) => match *err.kind {
            mongodb::error::ErrorKind::Write(error_info) => match error_info {
                mongodb::error::WriteFailure::WriteError(WriteError { code, .. }) => {
                    if code == 11000 {
                        HttpResponse::Conflict().body("User already exists")
                    } else {
                        eprintln!("Signup write error code: {}", code);
                        HttpResponse::InternalServerError().body("Failed to create user")
                    }
                }
                _ => HttpResponse::InternalServerError().body("Failed to create user"),
            },
            _ => HttpResponse::InternalServerError().body("Failed to create user"),
        },
    }
}

pub async fn signin(
    data: web::Data<Arc<Client>>,
    input: web::Json<SigninInput>,
) -> impl Responder {
    let client = data.into_inner();
    let collection = mongo::collection::<UserProfile>(&client, mongo::PROFILES);

    let input = input.into_inner();
    let email = input.email.trim().to_lowercase();
    let filter = doc! { "email": &email };

    match collection.find_one(filter.clone()).await {
        Ok(Some(user)) => {
            if bcrypt::verify(&input.password, &user.password).unwrap_or(false) {
                let update = doc! {
                    "$set": {
                        "last_signin": DateTime::now(),
                        "failed_signins": 0
                    }
                };

                if let Err(err) = collection.update_one(filter, update).await {
                    eprintln!("Failed to update signin metadata: {:?}", err);
                    return HttpResponse::InternalServerError().body("Failed to sign in");
                }

                let user_id = match user.id {
                    Some(id) => id,
                    None => return HttpResponse::InternalServerError().body("Failed to sign in"),
                };
                match generate_token(&email, user_id, user.role.as_ref()) {
                    Ok(token) => HttpResponse::Ok().json(TokenResponse { auth_token: token }),
                    Err(_) => {
                        HttpResponse::InternalServerError().body("Token generation failed")
                    }
                }
            } else {
                let failed_signins = user.failed_signins.unwrap_or(0) + 1;
                let update = doc! { "$set": { "failed_signins": failed_signins } };

                match collection.update_one(filter, update).await {
                    Ok(_) => HttpResponse::Unauthorized().body("Invalid credentials"),
                    Err(err) => {
                        eprintln!("Failed to update failed signins: {:?}", err);
                        HttpResponse::InternalServerError().body("Failed to process signin")
                    }
                }
            }
        }
        Ok(None) => HttpResponse::NotFound().body("User not found"),
        Err(err) => {
            eprintln!("Database error: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to process signin")
        }
    }
}

pub async fn user_session(claims: Claims, data: web::Data<Arc<Client>>) -> impl Responder {
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
                role: user
                    .role
                    .unwrap_or(UserRole::User)
                    .as_str()
                    .to_string(),
                created_at: user.created_at.unwrap_or_else(DateTime::now),
            };
            HttpResponse::Ok().json(session)
        }
        Ok(None) => HttpResponse::NotFound().body("User not found"),
        Err(err) => {
            eprintln!("Failed to fetch user: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch user")
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    let re = regex::Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?)*$",
    );
    re.unwrap().is_match(email)
}

pub fn generate_token(
    email: &str,
    user_id: ObjectId,
    role: Option<&UserRole>,
) -> Result<String, jsonwebtoken::errors::Error> {
    let secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set");
    let now = Utc::now();

    let claims = Claims {
        sub: email.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(24)).timestamp() as usize,
        user_id: user_id.to_string(),
        role: Some(role.unwrap_or(&UserRole::User).as_str().to_string()),
    };

    let header = Header::new(Algorithm::HS256);
    encode(&header, &claims, &EncodingKey::from_secret(secret.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_addresses() {
        assert!(is_valid_email("rider@unilag.edu.ng"));
        assert!(is_valid_email("first.last+tag@example.com"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld@twice.com"));
        assert!(!is_valid_email(""));
    }
}
