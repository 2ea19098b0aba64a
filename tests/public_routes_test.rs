mod common;

use actix_web::{test, web, App};
use serde_json::json;
use serial_test::serial;

use common::TestApp;

#[actix_rt::test]
#[serial]
async fn test_health_check() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/health").to_request();

    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
}

#[actix_rt::test]
#[serial]
async fn test_root_endpoint() {
    let _test_app = TestApp::new().await;
    let app = test::init_service(
        App::new().route("/", web::get().to(|| async { "Unirides API is running" })),
    )
    .await;

    let req = test::TestRequest::get().uri("/").to_request();

    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body = test::read_body(resp).await;
    assert_eq!(body, "Unirides API is running");
}

#[actix_rt::test]
#[serial]
async fn test_states_listing_is_public() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/states").to_request();

    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body.is_array());
}

#[actix_rt::test]
#[serial]
async fn test_universities_listing_is_public() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/universities").to_request();

    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
}

#[actix_rt::test]
#[serial]
async fn test_vehicles_listing_is_public() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/vehicles").to_request();

    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
}

#[actix_rt::test]
#[serial]
async fn test_available_rides_listing_is_public() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/rides").to_request();

    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body.is_array());
}

#[actix_rt::test]
#[serial]
async fn test_unknown_ride_returns_404() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/rides/000000000000000000000000")
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_rt::test]
#[serial]
async fn test_quote_for_unknown_vehicle_returns_404() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/pricing/quote")
        .set_json(&json!({
            "from_type": "state",
            "from_location": "Lagos",
            "to_type": "university",
            "to_location": "UNILAG",
            "vehicle_id": "000000000000000000000000",
            "mode": "join",
            "seats": 1
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_rt::test]
#[serial]
async fn test_signup_invalid_email() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/auth/signup")
        .set_json(&json!({
            "email": "invalid-email",
            "password": "password123"
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["field"], "email");
}

#[actix_rt::test]
#[serial]
async fn test_signin_wrong_credentials() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/auth/signin")
        .set_json(&json!({
            "email": common::get_test_email(),
            "password": "wrongpassword"
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
#[serial]
async fn test_driver_signin_without_driver_profile() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/auth/driver/signin")
        .set_json(&json!({
            "email": common::get_test_email(),
            "password": "password123"
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);

    // The dashboard relies on this shape to force a sign-out.
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "driver_profile_missing");
    assert_eq!(body["action"], "sign_out");
}

#[actix_rt::test]
#[serial]
async fn test_google_oauth_redirects() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/auth/google").to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 302);
}

#[actix_rt::test]
#[serial]
async fn test_event_stream_content_type() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/events").to_request();

    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert!(content_type.starts_with("text/event-stream"));
}
