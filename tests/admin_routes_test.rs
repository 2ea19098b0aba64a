mod common;

use actix_web::{http::header, test};
use serde_json::json;
use serial_test::serial;

use common::{get_test_user_id, TestApp};

fn user_jwt_token() -> String {
    // Not a valid signature; the middleware must reject it outright.
    "Bearer user_jwt_token".to_string()
}

#[actix_rt::test]
#[serial]
async fn test_list_users_without_auth() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/admin/users").to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
#[serial]
async fn test_list_users_with_invalid_token() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/admin/users")
        .insert_header((header::AUTHORIZATION, user_jwt_token()))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert!(resp.status() == 401 || resp.status() == 403);
}

#[actix_rt::test]
#[serial]
async fn test_update_user_role_without_auth() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let user_id = get_test_user_id();

    let req = test::TestRequest::put()
        .uri(&format!("/admin/users/{}/role", user_id))
        .set_json(&json!({ "role": "driver" }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
#[serial]
async fn test_vehicle_management_without_auth() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/admin/vehicles")
        .set_json(&json!({
            "name": "Sienna",
            "capacity": 6,
            "base_price": 5000.0
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let req = test::TestRequest::delete()
        .uri("/admin/vehicles/000000000000000000000000")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
#[serial]
async fn test_pricing_management_without_auth() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/admin/pricing/routes")
        .set_json(&json!({
            "from_type": "state",
            "from_location": "Lagos",
            "to_type": "university",
            "to_location": "UNILAG",
            "base_price": 4000.0
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let req = test::TestRequest::post()
        .uri("/admin/pricing/vehicles")
        .set_json(&json!({
            "from_type": "state",
            "from_location": "Lagos",
            "to_type": "university",
            "to_location": "UNILAG",
            "vehicle_type": "Sienna",
            "base_price": 6000.0
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
#[serial]
async fn test_location_management_without_auth() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/admin/states")
        .set_json(&json!({ "name": "Lagos" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let req = test::TestRequest::post()
        .uri("/admin/universities")
        .set_json(&json!({ "name": "UNILAG" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
#[serial]
async fn test_ride_management_without_auth() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/admin/rides")
        .set_json(&json!({
            "from_type": "state",
            "from_location": "Lagos",
            "to_type": "university",
            "to_location": "UNILAG",
            "departure_date": "2026-09-01",
            "departure_time": "08:00",
            "vehicle_id": "000000000000000000000000"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let req = test::TestRequest::put()
        .uri("/admin/rides/000000000000000000000000/status")
        .set_json(&json!({ "status": "available" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let req = test::TestRequest::put()
        .uri("/admin/rides/000000000000000000000000/driver")
        .set_json(&json!({ "driver_user_id": get_test_user_id() }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
#[serial]
async fn test_driver_registration_without_auth() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/admin/drivers")
        .set_json(&json!({ "user_id": get_test_user_id() }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}
