use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, Responder};
use std::sync::Arc;

use unirides_api::db::mongo::create_mongo_client;

pub struct TestApp {
    pub client: Arc<mongodb::Client>,
}

impl TestApp {
    pub async fn new() -> Self {
        let mongo_uri = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let client = create_mongo_client(&mongo_uri).await;

        Self { client }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(self.client.clone()))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .route("/", web::get().to(|| async { "Unirides API is running" }))
            .route("/health", web::get().to(health_check))
            .route("/states", web::get().to(empty_list))
            .route("/universities", web::get().to(empty_list))
            .route("/vehicles", web::get().to(empty_list))
            .route("/pricing/quote", web::post().to(vehicle_not_found))
            .route("/rides", web::get().to(empty_list))
            .route("/rides/{id}", web::get().to(ride_not_found))
            .route("/events", web::get().to(event_stream))
            .service(
                web::scope("/auth")
                    .route("/signin", web::post().to(signin))
                    .route("/signup", web::post().to(signup))
                    .route("/driver/signin", web::post().to(driver_signin))
                    .route("/google", web::get().to(google_oauth))
                    .route("/session", web::get().to(unauthorized_handler)),
            )
            .service(
                web::scope("/rides")
                    .route("", web::post().to(unauthorized_handler))
                    .route("/{id}/join", web::post().to(unauthorized_handler)),
            )
            .service(
                web::scope("/booking-flow")
                    .route("", web::post().to(unauthorized_handler))
                    .route("/prefilled/{ride_id}", web::post().to(unauthorized_handler))
                    .route("/current", web::get().to(unauthorized_handler))
                    .route("/{id}", web::get().to(unauthorized_handler))
                    .route("/{id}/advance", web::post().to(unauthorized_handler))
                    .route("/{id}/back", web::post().to(unauthorized_handler))
                    .route("/{id}/complete", web::post().to(unauthorized_handler)),
            )
            .service(
                web::scope("/payment")
                    .route("/init", web::post().to(unauthorized_handler)),
            )
            .service(
                web::scope("/account/{id}")
                    .route("", web::get().to(unauthorized_handler))
                    .route("", web::put().to(unauthorized_handler))
                    .route("/bookings", web::get().to(unauthorized_handler))
                    .route("/bookings/{booking_id}", web::get().to(unauthorized_handler)),
            )
            .service(
                web::scope("/driver")
                    .route("/profile", web::get().to(unauthorized_handler))
                    .route("/rides", web::get().to(unauthorized_handler)),
            )
            .service(
                web::scope("/admin")
                    .route("/users", web::get().to(unauthorized_handler))
                    .route("/users/{id}/role", web::put().to(unauthorized_handler))
                    .route("/vehicles", web::get().to(unauthorized_handler))
                    .route("/vehicles", web::post().to(unauthorized_handler))
                    .route("/vehicles/{id}", web::put().to(unauthorized_handler))
                    .route("/vehicles/{id}", web::delete().to(unauthorized_handler))
                    .route("/pricing/routes", web::get().to(unauthorized_handler))
                    .route("/pricing/routes", web::post().to(unauthorized_handler))
                    .route("/pricing/vehicles", web::post().to(unauthorized_handler))
                    .route("/states", web::post().to(unauthorized_handler))
                    .route("/universities", web::post().to(unauthorized_handler))
                    .route("/rides", web::get().to(unauthorized_handler))
                    .route("/rides", web::post().to(unauthorized_handler))
                    .route("/rides/{id}/status", web::put().to(unauthorized_handler))
                    .route("/rides/{id}/driver", web::put().to(unauthorized_handler))
                    .route("/drivers", web::post().to(unauthorized_handler)),
            )
    }
}

// Mock handler functions for testing
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({"status": "ok"}))
}

async fn empty_list() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!([]))
}

async fn vehicle_not_found() -> impl Responder {
    HttpResponse::NotFound().body("Vehicle not found")
}

async fn ride_not_found() -> impl Responder {
    HttpResponse::NotFound().body("Ride not found")
}

async fn event_stream() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/event-stream")
        .body("")
}

async fn signin() -> impl Responder {
    HttpResponse::Unauthorized().body("Invalid credentials")
}

async fn signup() -> impl Responder {
    HttpResponse::BadRequest()
        .json(serde_json::json!({"error": "Please provide a valid email address", "field": "email"}))
}

async fn driver_signin() -> impl Responder {
    HttpResponse::Forbidden().json(serde_json::json!({
        "error": "driver_profile_missing",
        "message": "This account is not registered as a driver",
        "action": "sign_out",
    }))
}

async fn google_oauth() -> impl Responder {
    HttpResponse::Found()
        .insert_header(("Location", "https://accounts.google.com/o/oauth2/v2/auth"))
        .finish()
}

async fn unauthorized_handler() -> impl Responder {
    HttpResponse::Unauthorized().json(serde_json::json!({"error": "Unauthorized"}))
}

pub fn get_test_user_id() -> String {
    "68a1b2c3d4e5f6a7b8c9d0e1".to_string()
}

pub fn get_test_email() -> String {
    "test@example.com".to_string()
}

pub async fn cleanup_test_data(client: &mongodb::Client) {
    let db = client.database("unirides");

    let collections = ["profiles", "bookings", "booking_drafts"];
    for collection_name in collections {
        let collection = db.collection::<mongodb::bson::Document>(collection_name);
        let _ = collection
            .delete_many(mongodb::bson::doc! {
                "$or": [
                    {"email": {"$regex": "test.*@example.com"}},
                    {"payment_reference": {"$regex": "^UR-TEST"}},
                ]
            })
            .await;
    }
}
