mod common;

use actix_web::test;
use serde_json::json;
use serial_test::serial;

use common::{cleanup_test_data, get_test_user_id, TestApp};

#[actix_rt::test]
#[serial]
async fn test_get_session_without_auth() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/auth/session").to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
#[serial]
async fn test_get_account_info_without_auth() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let user_id = get_test_user_id();

    let req = test::TestRequest::get()
        .uri(&format!("/account/{}", user_id))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
#[serial]
async fn test_update_account_info_without_auth() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let user_id = get_test_user_id();

    let req = test::TestRequest::put()
        .uri(&format!("/account/{}", user_id))
        .set_json(&json!({
            "first_name": "Updated",
            "last_name": "Name"
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
#[serial]
async fn test_get_bookings_without_auth() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let user_id = get_test_user_id();

    let req = test::TestRequest::get()
        .uri(&format!("/account/{}/bookings", user_id))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
#[serial]
async fn test_create_ride_without_auth() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/rides")
        .set_json(&json!({
            "from_type": "state",
            "from_location": "Lagos",
            "to_type": "university",
            "to_location": "UNILAG",
            "departure_date": "2026-09-01",
            "departure_time": "08:00",
            "vehicle_id": "000000000000000000000000",
            "mode": "full",
            "pickup_address": "12 Marina Road",
            "payment_reference": "UR-TEST12345"
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
#[serial]
async fn test_join_ride_without_auth() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/rides/000000000000000000000000/join")
        .set_json(&json!({
            "seats": 2,
            "payment_reference": "UR-TEST12345"
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
#[serial]
async fn test_start_booking_flow_without_auth() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/booking-flow")
        .set_json(&json!({ "mode": "join" }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
#[serial]
async fn test_booking_flow_steps_without_auth() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    for (method, uri) in [
        ("GET", "/booking-flow/current"),
        ("GET", "/booking-flow/000000000000000000000000"),
        ("POST", "/booking-flow/000000000000000000000000/advance"),
        ("POST", "/booking-flow/000000000000000000000000/back"),
        ("POST", "/booking-flow/000000000000000000000000/complete"),
        ("POST", "/booking-flow/prefilled/000000000000000000000000"),
    ] {
        let req = match method {
            "GET" => test::TestRequest::get().uri(uri).to_request(),
            _ => test::TestRequest::post()
                .uri(uri)
                .set_json(&json!({}))
                .to_request(),
        };

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401, "expected 401 for {} {}", method, uri);
    }
}

#[actix_rt::test]
#[serial]
async fn test_driver_routes_without_auth() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/driver/profile").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let req = test::TestRequest::get().uri("/driver/rides").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
#[serial]
async fn test_cleanup_leaves_no_test_documents() {
    let test_app = TestApp::new().await;

    cleanup_test_data(&test_app.client).await;
}
