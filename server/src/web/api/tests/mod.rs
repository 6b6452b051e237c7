
use crate::clock::FixedClock;
use crate::data_store::store_mock::StoreMock;
use crate::data_store::StoreError;
use crate::web::api::configure_app;
use crate::web::AppState;
use actix_web::{test, web, App};
use serde_json::json;
use std::sync::Arc;

fn test_state(store: Arc<StoreMock>) -> AppState {
    AppState {
        store,
        clock: Arc::new(FixedClock("2025-05-15".parse().unwrap())),
    }
}

macro_rules! init_test_app {
    ($store:expr) => {
        test::init_service(
            App::new()
                .configure(configure_app)
                .app_data(web::Data::new(test_state($store.clone()))),
        )
        .await
    };
}

macro_rules! post_booking {
    ($app:expr, $user_id:expr, $venue_id:expr, $booking_date:expr, $number_of_guests:expr) => {{
        let request = test::TestRequest::post()
            .uri("/api/v1/bookings")
            .insert_header(("X-USER-ID", $user_id.to_string()))
            .set_json(json!({
                "venue_id": $venue_id,
                "booking_date": $booking_date,
                "number_of_guests": $number_of_guests,
            }))
            .to_request();
        test::call_service(&$app, request).await
    }};
}

#[actix_web::test]
async fn test_create_booking() {
    let store = Arc::new(StoreMock::default());
    sample_data::fill_sample_data(&store);
    let app = init_test_app!(store);

    let response = post_booking!(app, 1, 1, "2025-06-01", 50);
    assert_eq!(response.status(), 201);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["status"], "Pending");
    assert_eq!(body["venue_id"], 1);
    assert_eq!(body["client_user_id"], 1);
    assert_eq!(body["number_of_guests"], 50);

    let request = test::TestRequest::get()
        .uri("/api/v1/bookings/my-bookings")
        .insert_header(("X-USER-ID", "1"))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["venue_name"], "Grand Hall");
    assert_eq!(body[0]["venue_address"], "Navoi street 12");
}

#[actix_web::test]
async fn test_create_booking_conflict() {
    let store = Arc::new(StoreMock::default());
    sample_data::fill_sample_data(&store);
    let app = init_test_app!(store);

    let response = post_booking!(app, 1, 1, "2025-06-01", 50);
    assert_eq!(response.status(), 201);
    let response = post_booking!(app, 2, 1, "2025-06-01", 30);
    assert_eq!(response.status(), 409);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["httpCode"], 409);
    assert_eq!(body["kind"], "conflict");
}

#[actix_web::test]
async fn test_create_booking_validation_errors() {
    let store = Arc::new(StoreMock::default());
    sample_data::fill_sample_data(&store);
    let app = init_test_app!(store);

    // Past date
    let response = post_booking!(app, 1, 1, "2025-05-14", 50);
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["kind"], "validation_error");

    // Guest count above the venue's capacity
    let response = post_booking!(app, 1, 1, "2025-06-01", 150);
    assert_eq!(response.status(), 400);

    // Unapproved venue
    let response = post_booking!(app, 1, 2, "2025-06-01", 10);
    assert_eq!(response.status(), 409);

    // Unknown venue
    let response = post_booking!(app, 1, 99, "2025-06-01", 10);
    assert_eq!(response.status(), 404);
}

#[actix_web::test]
async fn test_create_booking_requires_user_header() {
    let store = Arc::new(StoreMock::default());
    sample_data::fill_sample_data(&store);
    let app = init_test_app!(store);

    let request = test::TestRequest::post()
        .uri("/api/v1/bookings")
        .set_json(json!({
            "venue_id": 1,
            "booking_date": "2025-06-01",
            "number_of_guests": 50,
        }))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 401);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["kind"], "unauthorized");

    // Unknown user id
    let response = post_booking!(app, 99, 1, "2025-06-01", 50);
    assert_eq!(response.status(), 401);
}

#[actix_web::test]
async fn test_create_booking_invalid_json() {
    let store = Arc::new(StoreMock::default());
    sample_data::fill_sample_data(&store);
    let app = init_test_app!(store);

    let request = test::TestRequest::post()
        .uri("/api/v1/bookings")
        .insert_header(("X-USER-ID", "1"))
        .set_json(json!({ "venue_id": 1 }))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 422);
}

#[actix_web::test]
async fn test_cancel_booking() {
    let store = Arc::new(StoreMock::default());
    sample_data::fill_sample_data(&store);
    let app = init_test_app!(store);
    let response = post_booking!(app, 1, 1, "2025-06-01", 50);
    let booking: serde_json::Value = test::read_body_json(response).await;
    let booking_id = booking["booking_id"].as_i64().unwrap();

    // A different client must not cancel the booking.
    let request = test::TestRequest::put()
        .uri(&format!("/api/v1/bookings/{}/cancel", booking_id))
        .insert_header(("X-USER-ID", "2"))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 403);

    let request = test::TestRequest::put()
        .uri(&format!("/api/v1/bookings/{}/cancel", booking_id))
        .insert_header(("X-USER-ID", "1"))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["status"], "CancelledByClient");

    // Cancelling twice must fail.
    let request = test::TestRequest::put()
        .uri(&format!("/api/v1/bookings/{}/cancel", booking_id))
        .insert_header(("X-USER-ID", "1"))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 409);

    let request = test::TestRequest::put()
        .uri("/api/v1/bookings/123/cancel")
        .insert_header(("X-USER-ID", "1"))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 404);
}

#[actix_web::test]
async fn test_admin_status_override() {
    let store = Arc::new(StoreMock::default());
    sample_data::fill_sample_data(&store);
    let app = init_test_app!(store);
    let response = post_booking!(app, 1, 1, "2025-06-01", 50);
    let booking: serde_json::Value = test::read_body_json(response).await;
    let booking_id = booking["booking_id"].as_i64().unwrap();

    // Only admins may use this endpoint.
    let request = test::TestRequest::put()
        .uri(&format!("/api/v1/bookings/admin/{}/status", booking_id))
        .insert_header(("X-USER-ID", "3"))
        .set_json(json!({ "new_status": "Confirmed" }))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 403);

    let request = test::TestRequest::put()
        .uri(&format!("/api/v1/bookings/admin/{}/status", booking_id))
        .insert_header(("X-USER-ID", "4"))
        .set_json(json!({ "new_status": "Confirmed" }))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["status"], "Confirmed");

    // Confirmed bookings can only be cancelled, not moved back to Pending.
    let request = test::TestRequest::put()
        .uri(&format!("/api/v1/bookings/admin/{}/status", booking_id))
        .insert_header(("X-USER-ID", "4"))
        .set_json(json!({ "new_status": "Pending" }))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 409);
}

#[actix_web::test]
async fn test_availability_calendar() {
    let store = Arc::new(StoreMock::default());
    sample_data::fill_sample_data(&store);
    let app = init_test_app!(store);
    let response = post_booking!(app, 1, 1, "2025-06-01", 50);
    let booking: serde_json::Value = test::read_body_json(response).await;
    post_booking!(app, 2, 1, "2025-06-14", 30);
    let request = test::TestRequest::put()
        .uri(&format!(
            "/api/v1/bookings/admin/{}/status",
            booking["booking_id"]
        ))
        .insert_header(("X-USER-ID", "4"))
        .set_json(json!({ "new_status": "Confirmed" }))
        .to_request();
    test::call_service(&app, request).await;

    // Anonymous callers get the occupancy data without client details.
    let request = test::TestRequest::get()
        .uri("/api/v1/venues/1/calendar/2025/6")
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["venue_id"], 1);
    assert_eq!(body["year"], 2025);
    assert_eq!(body["month"], 6);
    let days = body["calendar_data"].as_array().unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0]["date"], "2025-06-01");
    assert_eq!(days[0]["status"], "booked_confirmed");
    assert_eq!(days[1]["status"], "booked_pending");
    assert!(days[0].get("client_fio").is_none());
    assert!(days[0].get("number_of_guests").is_none());

    // Admins additionally get the client details.
    let request = test::TestRequest::get()
        .uri("/api/v1/venues/1/calendar/2025/6")
        .insert_header(("X-USER-ID", "4"))
        .to_request();
    let response = test::call_service(&app, request).await;
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["calendar_data"][0]["client_fio"], "Karimov Aziz");
    assert_eq!(body["calendar_data"][0]["client_phone"], "+998901112233");
    assert_eq!(body["calendar_data"][0]["number_of_guests"], 50);
}

#[actix_web::test]
async fn test_availability_calendar_validation() {
    let store = Arc::new(StoreMock::default());
    sample_data::fill_sample_data(&store);
    let app = init_test_app!(store);

    let request = test::TestRequest::get()
        .uri("/api/v1/venues/99/calendar/2025/6")
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 404);

    let request = test::TestRequest::get()
        .uri("/api/v1/venues/1/calendar/1999/6")
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 400);

    let request = test::TestRequest::get()
        .uri("/api/v1/venues/1/calendar/2025/13")
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 400);
}

#[actix_web::test]
async fn test_admin_booking_listing() {
    let store = Arc::new(StoreMock::default());
    sample_data::fill_sample_data(&store);
    let app = init_test_app!(store);
    post_booking!(app, 1, 1, "2025-06-01", 50);
    post_booking!(app, 2, 1, "2025-06-14", 30);

    let request = test::TestRequest::get()
        .uri("/api/v1/bookings/admin/all")
        .insert_header(("X-USER-ID", "1"))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 403);

    let request = test::TestRequest::get()
        .uri("/api/v1/bookings/admin/all")
        .insert_header(("X-USER-ID", "4"))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = test::read_body_json(response).await;
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 2);
    // Default order: newest booking date first.
    assert_eq!(records[0]["booking_date"], "2025-06-14");
    assert_eq!(records[0]["client_fio"], "Tosheva Nilufar");

    let request = test::TestRequest::get()
        .uri("/api/v1/bookings/admin/all?client_search=karimov&sort_by=booking_date&order=asc")
        .insert_header(("X-USER-ID", "4"))
        .to_request();
    let response = test::call_service(&app, request).await;
    let body: serde_json::Value = test::read_body_json(response).await;
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["client_fio"], "Karimov Aziz");
}

#[actix_web::test]
async fn test_venue_owner_booking_listing() {
    let store = Arc::new(StoreMock::default());
    sample_data::fill_sample_data(&store);
    let app = init_test_app!(store);
    post_booking!(app, 1, 1, "2025-06-01", 50);

    // The owner of a different venue must not see the bookings.
    let request = test::TestRequest::get()
        .uri("/api/v1/bookings/venue-owner/1")
        .insert_header(("X-USER-ID", "5"))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 403);

    let request = test::TestRequest::get()
        .uri("/api/v1/bookings/venue-owner/1")
        .insert_header(("X-USER-ID", "3"))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["client_fio"], "Karimov Aziz");
    assert_eq!(body[0]["client_phone"], "+998901112233");
}

#[actix_web::test]
async fn test_store_error_reported_as_internal_error() {
    let store = Arc::new(StoreMock::default());
    sample_data::fill_sample_data(&store);
    let app = init_test_app!(store);

    store.data.lock().unwrap().next_error =
        Some(StoreError::ConnectionError("connection lost".to_string()));
    let request = test::TestRequest::get()
        .uri("/api/v1/venues/1/calendar/2025/6")
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 500);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["kind"], "internal_error");
}
