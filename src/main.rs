use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use unirides_api::db;
use unirides_api::middleware::auth::AuthMiddleware;
use unirides_api::routes;
use unirides_api::services::events::EventBus;
use unirides_api::services::payment::paystack::PaystackClient;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    println!("Application starting...");

    env_logger::init_from_env(Env::default().default_filter_or("info"));
    println!("Logger initialized");

    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    } else {
        println!("Release mode");
    }

    let host = std::env::var("HOST").unwrap_or_else(|_| HOST.to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| PORT.to_string())
        .parse()
        .unwrap_or(PORT);
    println!("Attempting to bind to {}:{}", host, port);

    let mongo_uri = std::env::var("MONGODB_URI").expect("MONGODB_URI must be set");
    println!("Got MongoDB URI, attempting connection...");
    let client = db::mongo::create_mongo_client(&mongo_uri).await;
    db::mongo::ensure_indexes(&client).await;
    println!("MongoDB connection established");

    let paystack = PaystackClient::from_env();
    let event_bus = EventBus::default();

    println!("Starting HTTP server...");

    HttpServer::new(move || {
        let cors = match std::env::var("FRONTEND_URL") {
            Ok(origin) => Cors::default()
                .allowed_origin(&origin)
                .allow_any_method()
                .allow_any_header()
                .supports_credentials(),
            Err(_) => Cors::permissive(),
        };

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .route("/health", web::get().to(routes::health::health_check))
            .app_data(web::Data::new(client.clone()))
            .app_data(web::Data::new(paystack.clone()))
            .app_data(web::Data::new(event_bus.clone()))
            .service(
                web::scope("/api")
                    .service(
                        web::scope("/auth")
                            .route("/signup", web::post().to(routes::account::auth::signup))
                            .route("/signin", web::post().to(routes::account::auth::signin))
                            .route(
                                "/driver/signin",
                                web::post().to(routes::driver::driver_signin),
                            )
                            .route(
                                "/google",
                                web::get().to(routes::account::google_auth::google_auth_init),
                            )
                            .route(
                                "/google/callback",
                                web::get().to(routes::account::google_auth::google_auth_callback),
                            )
                            .service(
                                web::scope("").wrap(AuthMiddleware).route(
                                    "/session",
                                    web::get().to(routes::account::auth::user_session),
                                ),
                            ),
                    )
                    // Public catalogue and listings
                    .route("/states", web::get().to(routes::location::get_states))
                    .route(
                        "/universities",
                        web::get().to(routes::location::get_universities),
                    )
                    .route("/vehicles", web::get().to(routes::vehicle::get_vehicles))
                    .route("/pricing/quote", web::post().to(routes::pricing::quote))
                    .route("/events", web::get().to(routes::events::subscribe))
                    .service(
                        web::scope("/rides")
                            .route("", web::get().to(routes::rides::get_available_rides))
                            .route("/{id}", web::get().to(routes::rides::get_ride))
                            // Rider actions
                            .service(
                                web::scope("")
                                    .wrap(AuthMiddleware)
                                    .route("", web::post().to(routes::rides::create_ride))
                                    .route(
                                        "/{id}/join",
                                        web::post().to(routes::rides::join_ride),
                                    ),
                            ),
                    )
                    .service(
                        web::scope("/booking-flow")
                            .wrap(AuthMiddleware)
                            .route("", web::post().to(routes::booking_flow::start))
                            .route(
                                "/prefilled/{ride_id}",
                                web::post().to(routes::booking_flow::start_prefilled),
                            )
                            .route("/current", web::get().to(routes::booking_flow::current))
                            .route("/{id}", web::get().to(routes::booking_flow::get_flow))
                            .route(
                                "/{id}/advance",
                                web::post().to(routes::booking_flow::advance),
                            )
                            .route("/{id}/back", web::post().to(routes::booking_flow::back))
                            .route(
                                "/{id}/complete",
                                web::post().to(routes::booking_flow::complete),
                            ),
                    )
                    .service(
                        web::scope("/payment")
                            .wrap(AuthMiddleware)
                            .route("/init", web::post().to(routes::payment::init_payment)),
                    )
                    .service(
                        web::scope("/account")
                            .wrap(AuthMiddleware)
                            .route(
                                "/{id}",
                                web::get().to(routes::account::account_info::get_profile),
                            )
                            .route(
                                "/{id}",
                                web::put().to(routes::account::account_info::update_profile),
                            )
                            .route(
                                "/{id}/bookings",
                                web::get().to(routes::account::bookings::get_all_bookings),
                            )
                            .route(
                                "/{id}/bookings/{booking_id}",
                                web::get().to(routes::account::bookings::get_booking_by_id),
                            ),
                    )
                    .service(
                        web::scope("/driver")
                            .wrap(AuthMiddleware)
                            .route("/profile", web::get().to(routes::driver::driver_profile))
                            .route("/rides", web::get().to(routes::driver::driver_rides)),
                    )
                    .configure(routes::admin::config),
            )
    })
    .bind((host, port))?
    .run()
    .await
}
