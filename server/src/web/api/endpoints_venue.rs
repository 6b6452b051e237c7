use crate::booking;
use crate::web::api::{resolve_identity, APIError, UserIdHeader};
use crate::web::AppState;
use actix_web::{get, web, Responder};

/// The public availability calendar of one venue for one month.
///
/// Unlike the booking endpoints, this one does not require the X-USER-ID header: anonymous
/// callers get the occupancy data without client details, admins get the full entries.
#[get("/venues/{venue_id}/calendar/{year}/{month}")]
async fn availability_calendar(
    path: web::Path<(i32, i32, u32)>,
    state: web::Data<AppState>,
    user_id_header: Option<web::Header<UserIdHeader>>,
) -> Result<impl Responder, APIError> {
    let (venue_id, year, month) = path.into_inner();
    let user_id = user_id_header
        .map(|header| header.into_inner().user_id())
        .transpose()?;
    let calendar_data = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        let requester_role = user_id
            .map(|user_id| resolve_identity(&mut *store, user_id))
            .transpose()?
            .map(|identity| identity.role);
        Ok(booking::availability_calendar(
            &mut *store,
            venue_id,
            year,
            month,
            requester_role,
        )?)
    })
    .await??;
    Ok(web::Json(venuebook_api_types::CalendarResponse {
        venue_id,
        year,
        month,
        calendar_data,
    }))
}
