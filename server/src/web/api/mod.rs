use std::fmt::Display;

mod endpoints_booking;
mod endpoints_venue;
#[cfg(test)]
mod tests;

use crate::booking::{BookingError, Identity};
use crate::data_store::{StoreError, UserId, VenueBookingStoreFacade};
use actix_web::error::JsonPayloadError;
use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    web, HttpResponse,
};
use serde_json::json;

pub fn configure_app(cfg: &mut web::ServiceConfig) {
    cfg.service(get_api_service());
}

fn get_api_service() -> actix_web::Scope {
    let json_config =
        web::JsonConfig::default().error_handler(|err, _req| APIError::InvalidJson(err).into());
    web::scope("/api/v1")
        .app_data(json_config)
        .service(endpoints_booking::create_booking)
        .service(endpoints_booking::my_bookings)
        .service(endpoints_booking::cancel_booking)
        .service(endpoints_booking::admin_list_bookings)
        .service(endpoints_booking::venue_owner_bookings)
        .service(endpoints_booking::admin_set_booking_status)
        .service(endpoints_venue::availability_calendar)
}

#[derive(Debug)]
pub enum APIError {
    NotExisting,
    /// The request is valid but conflicts with the current state of the data (occupied slot,
    /// unapproved venue, illegal status transition, …)
    Conflict(String),
    /// The caller is authenticated but not allowed to perform this action
    PermissionDenied(String),
    /// The X-USER-ID header is missing, malformed or does not match a known user
    Unauthenticated(String),
    InvalidJson(actix_web::error::JsonPayloadError),
    /// The request data does not pass validation (past date, guest count out of range, …)
    InvalidData(String),
    TransactionConflict,
    InternalError(String),
}

impl APIError {
    fn kind(&self) -> &'static str {
        match self {
            Self::NotExisting => "not_found",
            Self::Conflict(_) => "conflict",
            Self::PermissionDenied(_) => "forbidden",
            Self::Unauthenticated(_) => "unauthorized",
            Self::InvalidJson(_) => "invalid_json",
            Self::InvalidData(_) => "validation_error",
            Self::TransactionConflict => "transaction_conflict",
            Self::InternalError(_) => "internal_error",
        }
    }
}

impl Display for APIError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotExisting => f.write_str("Element does not exist")?,
            Self::Conflict(e) => f.write_str(e)?,
            Self::PermissionDenied(e) => f.write_str(e)?,
            Self::Unauthenticated(e) => f.write_str(e)?,
            Self::InvalidJson(e) => {
                write!(f, "Invalid JSON request data: {}", e)?;
            }
            Self::InvalidData(e) => {
                write!(f, "Invalid request data: {}", e)?;
            }
            Self::TransactionConflict => {
                f.write_str("Concurrent database transaction conflict. Please retry request.")?;
            }
            Self::InternalError(s) => {
                f.write_str("Internal error: ")?;
                f.write_str(s)?;
            }
        };
        Ok(())
    }
}

impl ResponseError for APIError {
    fn error_response(&self) -> HttpResponse {
        let message = format!("{}", self);

        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(json!({
                "httpCode": self.status_code().as_u16(),
                "kind": self.kind(),
                "message": message
            }))
    }
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotExisting => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::PermissionDenied(_) => StatusCode::FORBIDDEN,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidJson(e) => match e {
                JsonPayloadError::ContentType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                JsonPayloadError::Deserialize(json_error) if json_error.is_data() => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                _ => StatusCode::BAD_REQUEST,
            },
            Self::InvalidData(_) => StatusCode::BAD_REQUEST,
            Self::TransactionConflict => StatusCode::SERVICE_UNAVAILABLE,
            Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for APIError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::ConnectionError(error) => {
                Self::InternalError(format!("Could not connect to database: {}", error))
            }
            StoreError::QueryError(diesel_error) => Self::InternalError(format!(
                "Error while executing database query: {}",
                diesel_error
            )),
            StoreError::TransactionConflict => Self::TransactionConflict,
            StoreError::NotExisting => Self::NotExisting,
            StoreError::ConflictEntityExists => {
                Self::Conflict("Conflicting entity exists already.".to_string())
            }
            StoreError::InvalidInputData(e) => Self::InvalidData(e),
            StoreError::InvalidDataInDatabase(e) => Self::InternalError(format!(
                "Data queried from database could not be deserialized: {}",
                e
            )),
        }
    }
}

impl From<BookingError> for APIError {
    fn from(e: BookingError) -> Self {
        match e {
            BookingError::DateInPast
            | BookingError::GuestCountNotPositive
            | BookingError::GuestCountExceedsCapacity { .. }
            | BookingError::InvalidCalendarMonth
            | BookingError::PastBookingNotCancellable => Self::InvalidData(e.to_string()),
            BookingError::VenueNotFound | BookingError::BookingNotFound => Self::NotExisting,
            BookingError::VenueNotBookable
            | BookingError::DateConflict
            | BookingError::NotCancellable(_)
            | BookingError::IllegalStatusTransition { .. } => Self::Conflict(e.to_string()),
            BookingError::Forbidden(reason) => Self::PermissionDenied(reason.to_string()),
            BookingError::Store(store_error) => store_error.into(),
        }
    }
}

impl From<actix_web::error::BlockingError> for APIError {
    fn from(_e: actix_web::error::BlockingError) -> Self {
        APIError::InternalError(
            "Could not get thread from thread pool for synchronous database operation.".to_owned(),
        )
    }
}

/// The X-USER-ID request header, carrying the numeric id of the calling user.
///
/// Authentication itself (tokens, sessions) is handled by the reverse proxy in front of this
/// service; this service trusts the header and only resolves the user's role from the database.
struct UserIdHeader(String);

impl UserIdHeader {
    fn user_id(&self) -> Result<UserId, APIError> {
        self.0.trim().parse().map_err(|_| {
            APIError::Unauthenticated("X-USER-ID header is not a valid user id.".to_string())
        })
    }
}

impl actix_web::http::header::TryIntoHeaderValue for UserIdHeader {
    type Error = actix_web::http::header::InvalidHeaderValue;

    fn try_into_value(self) -> Result<actix_web::http::header::HeaderValue, Self::Error> {
        self.0.parse()
    }
}

impl actix_web::http::header::Header for UserIdHeader {
    fn name() -> actix_web::http::header::HeaderName {
        "X-USER-ID"
            .try_into()
            .expect("User id header name should be a valid header name")
    }

    fn parse<M: actix_web::HttpMessage>(msg: &M) -> Result<Self, actix_web::error::ParseError> {
        Ok(Self(
            msg.headers()
                .get(Self::name())
                .ok_or(actix_web::error::ParseError::Header)?
                .to_str()
                .unwrap_or("")
                .to_owned(),
        ))
    }
}

/// Extract the calling user's id from the optional header extractor, failing if it is absent.
fn required_user_id(header: Option<web::Header<UserIdHeader>>) -> Result<UserId, APIError> {
    header
        .ok_or_else(|| APIError::Unauthenticated("Missing X-USER-ID header.".to_string()))?
        .into_inner()
        .user_id()
}

/// Load the user record for the given id and turn it into an [Identity] for the booking logic.
fn resolve_identity(
    store: &mut dyn VenueBookingStoreFacade,
    user_id: UserId,
) -> Result<Identity, APIError> {
    let user = store.get_user(user_id).map_err(|e| match e {
        StoreError::NotExisting => {
            APIError::Unauthenticated(format!("No user with id {} exists.", user_id))
        }
        other => other.into(),
    })?;
    Ok(Identity {
        user_id: user.id,
        role: user.role,
    })
}
