use crate::booking;
use crate::web::api::{required_user_id, resolve_identity, APIError, UserIdHeader};
use crate::web::util::BookingFilterAsQuery;
use crate::web::AppState;
use actix_web::{get, post, put, web, HttpResponse, Responder};

#[post("/bookings")]
async fn create_booking(
    data: web::Json<venuebook_api_types::CreateBookingRequest>,
    state: web::Data<AppState>,
    user_id_header: Option<web::Header<UserIdHeader>>,
) -> Result<impl Responder, APIError> {
    let user_id = required_user_id(user_id_header)?;
    let request = data.into_inner();
    let booking: venuebook_api_types::Booking = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        let identity = resolve_identity(&mut *store, user_id)?;
        Ok(booking::create_booking(
            &mut *store,
            &*state.clock,
            &identity,
            request.venue_id,
            request.booking_date,
            request.number_of_guests,
        )?)
    })
    .await??
    .into();
    Ok(HttpResponse::Created().json(booking))
}

#[get("/bookings/my-bookings")]
async fn my_bookings(
    state: web::Data<AppState>,
    user_id_header: Option<web::Header<UserIdHeader>>,
) -> Result<impl Responder, APIError> {
    let user_id = required_user_id(user_id_header)?;
    let bookings: Vec<venuebook_api_types::MyBooking> =
        web::block(move || -> Result<_, APIError> {
            let mut store = state.store.get_facade()?;
            let identity = resolve_identity(&mut *store, user_id)?;
            Ok(booking::my_bookings(&mut *store, &identity)?)
        })
        .await??
        .into_iter()
        .map(|b| b.into())
        .collect();
    Ok(web::Json(bookings))
}

#[put("/bookings/{booking_id}/cancel")]
async fn cancel_booking(
    path: web::Path<i32>,
    state: web::Data<AppState>,
    user_id_header: Option<web::Header<UserIdHeader>>,
) -> Result<impl Responder, APIError> {
    let booking_id = path.into_inner();
    let user_id = required_user_id(user_id_header)?;
    let booking: venuebook_api_types::Booking = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        let identity = resolve_identity(&mut *store, user_id)?;
        Ok(booking::cancel_booking(
            &mut *store,
            &*state.clock,
            &identity,
            booking_id,
        )?)
    })
    .await??
    .into();
    Ok(web::Json(booking))
}

#[get("/bookings/admin/all")]
async fn admin_list_bookings(
    query: web::Query<BookingFilterAsQuery>,
    state: web::Data<AppState>,
    user_id_header: Option<web::Header<UserIdHeader>>,
) -> Result<impl Responder, APIError> {
    let user_id = required_user_id(user_id_header)?;
    let bookings: Vec<venuebook_api_types::AdminBooking> =
        web::block(move || -> Result<_, APIError> {
            let mut store = state.store.get_facade()?;
            let identity = resolve_identity(&mut *store, user_id)?;
            Ok(booking::admin_bookings(
                &mut *store,
                &identity,
                query.into_inner().into(),
            )?)
        })
        .await??
        .into_iter()
        .map(|b| b.into())
        .collect();
    Ok(web::Json(bookings))
}

#[get("/bookings/venue-owner/{venue_id}")]
async fn venue_owner_bookings(
    path: web::Path<i32>,
    state: web::Data<AppState>,
    user_id_header: Option<web::Header<UserIdHeader>>,
) -> Result<impl Responder, APIError> {
    let venue_id = path.into_inner();
    let user_id = required_user_id(user_id_header)?;
    let bookings: Vec<venuebook_api_types::VenueBooking> =
        web::block(move || -> Result<_, APIError> {
            let mut store = state.store.get_facade()?;
            let identity = resolve_identity(&mut *store, user_id)?;
            Ok(booking::venue_bookings(&mut *store, &identity, venue_id)?)
        })
        .await??
        .into_iter()
        .map(|b| b.into())
        .collect();
    Ok(web::Json(bookings))
}

#[put("/bookings/admin/{booking_id}/status")]
async fn admin_set_booking_status(
    path: web::Path<i32>,
    data: web::Json<venuebook_api_types::UpdateBookingStatusRequest>,
    state: web::Data<AppState>,
    user_id_header: Option<web::Header<UserIdHeader>>,
) -> Result<impl Responder, APIError> {
    let booking_id = path.into_inner();
    let user_id = required_user_id(user_id_header)?;
    let new_status = data.into_inner().new_status;
    let booking: venuebook_api_types::Booking = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        let identity = resolve_identity(&mut *store, user_id)?;
        Ok(booking::set_booking_status(
            &mut *store,
            &identity,
            booking_id,
            new_status.into(),
        )?)
    })
    .await??
    .into();
    Ok(web::Json(booking))
}
