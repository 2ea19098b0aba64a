mod common;

use actix_web::test;
use serde_json::json;
use serial_test::serial;

use common::TestApp;

#[actix_rt::test]
#[serial]
async fn test_init_payment_without_auth() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/payment/init")
        .set_json(&json!({ "amount": 5000.0 }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
#[serial]
async fn test_complete_booking_flow_without_auth() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/booking-flow/000000000000000000000000/complete")
        .set_json(&json!({ "payment_reference": "UR-TEST12345" }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}
