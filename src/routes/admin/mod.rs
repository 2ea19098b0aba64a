pub mod drivers;
pub mod locations;
pub mod pricing;
pub mod rides;
pub mod vehicles;

use actix_web::web;

use crate::middleware::auth::AuthMiddleware;
use crate::middleware::role_auth::RequireRole;
use crate::models::account::UserRole;
use crate::routes::account::role_management::{list_users_with_roles, update_user_role};

/// Admin console surface. Middleware runs in reverse registration order,
/// so AuthMiddleware is registered last to decode the token before the
/// role check reads it.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .wrap(RequireRole::new(UserRole::Admin))
            .wrap(AuthMiddleware)
            .route("/users", web::get().to(list_users_with_roles))
            .route("/users/{id}/role", web::put().to(update_user_role))
            .route("/vehicles", web::get().to(vehicles::list_vehicles))
            .route("/vehicles", web::post().to(vehicles::create_vehicle))
            .route("/vehicles/{id}", web::put().to(vehicles::update_vehicle))
            .route("/vehicles/{id}", web::delete().to(vehicles::delete_vehicle))
            .route("/pricing/routes", web::get().to(pricing::list_route_pricing))
            .route(
                "/pricing/routes",
                web::post().to(pricing::create_route_pricing),
            )
            .route(
                "/pricing/routes/{id}",
                web::put().to(pricing::update_route_pricing),
            )
            .route(
                "/pricing/routes/{id}",
                web::delete().to(pricing::delete_route_pricing),
            )
            .route(
                "/pricing/vehicles",
                web::get().to(pricing::list_vehicle_pricing),
            )
            .route(
                "/pricing/vehicles",
                web::post().to(pricing::create_vehicle_pricing),
            )
            .route(
                "/pricing/vehicles/{id}",
                web::put().to(pricing::update_vehicle_pricing),
            )
            .route(
                "/pricing/vehicles/{id}",
                web::delete().to(pricing::delete_vehicle_pricing),
            )
            .route("/states", web::get().to(locations::list_states))
            .route("/states", web::post().to(locations::create_state))
            .route("/states/{id}", web::put().to(locations::update_state))
            .route("/states/{id}", web::delete().to(locations::delete_state))
            .route("/universities", web::get().to(locations::list_universities))
            .route(
                "/universities",
                web::post().to(locations::create_university),
            )
            .route(
                "/universities/{id}",
                web::put().to(locations::update_university),
            )
            .route(
                "/universities/{id}",
                web::delete().to(locations::delete_university),
            )
            .route("/rides", web::get().to(rides::list_rides))
            .route("/rides", web::post().to(rides::create_ride))
            .route("/rides/{id}/status", web::put().to(rides::update_ride_status))
            .route("/rides/{id}/driver", web::put().to(rides::assign_driver))
            .route(
                "/rides/{id}/bookings",
                web::get().to(rides::list_ride_bookings),
            )
            .route("/drivers", web::get().to(drivers::list_driver_profiles))
            .route("/drivers", web::post().to(drivers::create_driver_profile))
            .route(
                "/drivers/{user_id}",
                web::delete().to(drivers::deactivate_driver_profile),
            ),
    );
}
