use actix_web::{http::header, web, HttpResponse, Responder};
use mongodb::bson::{doc, DateTime};
use mongodb::Client;
use oauth2::AuthorizationCode;
use std::sync::Arc;

use crate::db::mongo;
use crate::models::account::{UserProfile, UserRole};
use crate::models::google_auth::GoogleAuthCallbackParams;
use crate::routes::account::auth::generate_token;
use crate::services::google_auth_service::GoogleAuth;

pub async fn google_auth_init() -> impl Responder {
    let google = GoogleAuth::from_env();
    let (auth_url, _csrf_token) = google.authorize_url();

    // The CSRF token rides along in the OAuth state parameter; a hardened
    // deployment would pin it in a server-side session as well.
    HttpResponse::Found()
        .insert_header((header::LOCATION, auth_url.to_string()))
        .finish()
}

pub async fn google_auth_callback(
    data: web::Data<Arc<Client>>,
    query: web::Query<GoogleAuthCallbackParams>,
) -> impl Responder {
    if let Some(error) = &query.error {
        eprintln!("OAuth error received: {}", error);
        return HttpResponse::BadRequest().body(format!("OAuth error: {}", error));
    }

    let google = GoogleAuth::from_env();
    let code = AuthorizationCode::new(query.code.clone());

    let access_token = match google.exchange_code(code).await {
        Ok(token) => token,
        Err(e) => {
            eprintln!("Failed to exchange code for token: {}", e);
            return HttpResponse::InternalServerError().body(format!("Token error: {}", e));
        }
    };

    let user_info = match google.fetch_user(&access_token).await {
        Ok(info) => info,
        Err(e) => {
            eprintln!("Failed to get user info: {}", e);
            return HttpResponse::InternalServerError().body(format!("User info error: {}", e));
        }
    };

    let db_client = data.into_inner();
    let collection = mongo::collection::<UserProfile>(&db_client, mongo::PROFILES);

    let email = user_info.email.trim().to_lowercase();
    let filter = doc! { "email": &email };
    let now = DateTime::now();

    match collection.find_one(filter.clone()).await {
        Ok(Some(existing_user)) => {
            let update = doc! {
                "$set": {
                    "last_signin": now,
                    "failed_signins": 0
                }
            };
            if let Err(err) = collection.update_one(filter, update).await {
                eprintln!("Failed to update user sign-in info: {:?}", err);
                return HttpResponse::InternalServerError().body("Failed to update user");
            }

            let user_id = match existing_user.id {
                Some(id) => id,
                None => return HttpResponse::InternalServerError().body("Invalid user record"),
            };
            match generate_token(&existing_user.email, user_id, existing_user.role.as_ref()) {
                Ok(token) => redirect_with_token(&token),
                Err(_) => HttpResponse::InternalServerError().body("Failed to generate token"),
            }
        }
        Ok(None) => {
            // First Google sign-in: provision a profile. No password is set
            // for OAuth accounts.
            let new_user = UserProfile {
                id: None,
                email,
                password: bcrypt::hash("", bcrypt::DEFAULT_COST).unwrap_or_default(),
                first_name: user_info.given_name,
                last_name: user_info.family_name,
                phone_number: None,
                role: Some(UserRole::User),
                last_signin: Some(now),
                failed_signins: Some(0),
                created_at: Some(now),
                updated_at: Some(now),
            };

            match collection.insert_one(&new_user).await {
                Ok(result) => {
                    let user_id = result
                        .inserted_id
                        .as_object_id()
                        .expect("inserted profile has an ObjectId");
                    match generate_token(&new_user.email, user_id, new_user.role.as_ref()) {
                        Ok(token) => redirect_with_token(&token),
                        Err(_) => {
                            HttpResponse::InternalServerError().body("Failed to generate token")
                        }
                    }
                }
                Err(err) => {
                    eprintln!("Failed to create user: {:?}", err);
                    HttpResponse::InternalServerError().body("Failed to create user")
                }
            }
        }
        Err(err) => {
            eprintln!("Database error: {:?}", err);
            HttpResponse::InternalServerError().body("Database error")
        }
    }
}

fn redirect_with_token(token: &str) -> HttpResponse {
    let frontend_url =
        std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let redirect_url = format!("{}/?token={}", frontend_url, token);
    HttpResponse::Found()
        .insert_header((header::LOCATION, redirect_url))
        .finish()
}
