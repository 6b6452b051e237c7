//! The booking manager: creation preconditions, the cancellation state machine, the admin
//! status-override transition table and the availability-calendar aggregation.
//!
//! All functions in this module operate on a [VenueBookingStoreFacade] and are the only place
//! where booking business rules live; the web layer merely resolves the caller's [Identity] and
//! translates [BookingError] values into HTTP responses. Conflict prevention for the
//! one-active-booking-per-(venue, date) invariant is ultimately enforced by the store's partial
//! unique index; the availability pre-check here is a fast path only, and a unique violation
//! reported by the store is translated into the same [BookingError::DateConflict].

use crate::clock::Clock;
use crate::data_store::models::{BookingStatus, NewBooking, UserRole, VenueApprovalStatus};
use crate::data_store::{
    models, BookingFilter, BookingId, StoreError, UserId, VenueBookingStoreFacade, VenueId,
};
use chrono::{Days, Months, NaiveDate};
use venuebook_api_types::{CalendarDay, CalendarSlotStatus};

/// The authenticated caller of a booking operation: user id plus the role resolved from the user
/// record, exactly once per request.
#[derive(Clone, Copy, Debug)]
pub struct Identity {
    pub user_id: UserId,
    pub role: UserRole,
}

#[derive(Debug)]
pub enum BookingError {
    /// The requested booking date is before the current day
    DateInPast,
    /// The number of guests is zero or negative
    GuestCountNotPositive,
    /// The number of guests exceeds the venue's capacity
    GuestCountExceedsCapacity {
        number_of_guests: i32,
        capacity: i32,
    },
    /// Year or month of a calendar request is outside the supported range
    InvalidCalendarMonth,
    VenueNotFound,
    BookingNotFound,
    /// The venue exists but is not approved for bookings
    VenueNotBookable,
    /// The venue already has an active booking on the requested date
    DateConflict,
    /// The booking is in a status from which it cannot be cancelled
    NotCancellable(BookingStatus),
    /// Only admins may cancel bookings whose date has already passed
    PastBookingNotCancellable,
    /// The caller's role or identity does not permit the requested action
    Forbidden(&'static str),
    /// The requested admin status override is not a permitted transition
    IllegalStatusTransition {
        from: BookingStatus,
        to: BookingStatus,
    },
    /// The persistence layer failed
    Store(StoreError),
}

impl std::fmt::Display for BookingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DateInPast => f.write_str("Cannot create a booking for a past date."),
            Self::GuestCountNotPositive => {
                f.write_str("The number of guests must be greater than 0.")
            }
            Self::GuestCountExceedsCapacity {
                number_of_guests,
                capacity,
            } => write!(
                f,
                "The number of guests ({}) must not exceed the venue's capacity ({}).",
                number_of_guests, capacity
            ),
            Self::InvalidCalendarMonth => {
                f.write_str("Invalid year or month for the availability calendar.")
            }
            Self::VenueNotFound => f.write_str("Venue not found."),
            Self::BookingNotFound => f.write_str("Booking not found."),
            Self::VenueNotBookable => {
                f.write_str("This venue is currently not available for booking (not approved).")
            }
            Self::DateConflict => {
                f.write_str("This venue is already booked on the selected date.")
            }
            Self::NotCancellable(status) => write!(
                f,
                "This booking cannot be cancelled in its current status ({}).",
                status.as_str()
            ),
            Self::PastBookingNotCancellable => {
                f.write_str("A booking on a past date cannot be cancelled.")
            }
            Self::Forbidden(reason) => f.write_str(reason),
            Self::IllegalStatusTransition { from, to } => write!(
                f,
                "A booking cannot be moved from status {} to status {}.",
                from.as_str(),
                to.as_str()
            ),
            Self::Store(e) => write!(f, "Data store failure: {}", e),
        }
    }
}

impl std::error::Error for BookingError {}

impl From<StoreError> for BookingError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

/// Create a new booking for `client` on `venue_id` at `booking_date`.
///
/// Precondition checks run in a fixed order, each short-circuiting with its own error: past date,
/// venue existence, venue approval, guest count positivity, capacity, slot availability. The
/// created booking starts in [BookingStatus::Pending].
pub fn create_booking(
    store: &mut dyn VenueBookingStoreFacade,
    clock: &dyn Clock,
    client: &Identity,
    venue_id: VenueId,
    booking_date: NaiveDate,
    number_of_guests: i32,
) -> Result<models::Booking, BookingError> {
    if client.role != UserRole::Client {
        return Err(BookingError::Forbidden("Only clients can create bookings."));
    }
    if booking_date < clock.today() {
        return Err(BookingError::DateInPast);
    }
    let venue = store.get_venue(venue_id).map_err(|e| match e {
        StoreError::NotExisting => BookingError::VenueNotFound,
        other => BookingError::Store(other),
    })?;
    if venue.status != VenueApprovalStatus::Approved {
        return Err(BookingError::VenueNotBookable);
    }
    if number_of_guests <= 0 {
        return Err(BookingError::GuestCountNotPositive);
    }
    if number_of_guests > venue.capacity {
        return Err(BookingError::GuestCountExceedsCapacity {
            number_of_guests,
            capacity: venue.capacity,
        });
    }
    if store.has_active_booking(venue_id, booking_date)? {
        return Err(BookingError::DateConflict);
    }
    store
        .create_booking(NewBooking {
            venue_id,
            client_user_id: client.user_id,
            booking_date,
            number_of_guests,
            status: BookingStatus::Pending,
        })
        .map_err(|e| match e {
            // A concurrent creation attempt won the race between the availability check and the
            // insert; the unique index caught it.
            StoreError::ConflictEntityExists => BookingError::DateConflict,
            other => BookingError::Store(other),
        })
}

/// Cancel a booking on behalf of `actor`.
///
/// Clients may cancel their own bookings, owners the bookings on venues they own, admins any
/// booking. Only active (Pending or Confirmed) bookings are cancellable, and only admins may
/// cancel bookings whose date has already passed.
pub fn cancel_booking(
    store: &mut dyn VenueBookingStoreFacade,
    clock: &dyn Clock,
    actor: &Identity,
    booking_id: BookingId,
) -> Result<models::Booking, BookingError> {
    let booking = store.get_booking(booking_id).map_err(|e| match e {
        StoreError::NotExisting => BookingError::BookingNotFound,
        other => BookingError::Store(other),
    })?;
    if actor.role != UserRole::Admin && booking.booking_date < clock.today() {
        return Err(BookingError::PastBookingNotCancellable);
    }
    if !booking.status.is_active() {
        return Err(BookingError::NotCancellable(booking.status));
    }
    let new_status = match actor.role {
        UserRole::Client => {
            if booking.client_user_id != actor.user_id {
                return Err(BookingError::Forbidden(
                    "You can only cancel your own bookings.",
                ));
            }
            BookingStatus::CancelledByClient
        }
        UserRole::Owner => {
            let venue = store.get_venue(booking.venue_id)?;
            if venue.owner_user_id != Some(actor.user_id) {
                return Err(BookingError::Forbidden(
                    "You can only cancel bookings on your own venues.",
                ));
            }
            BookingStatus::CancelledByOwner
        }
        UserRole::Admin => BookingStatus::CancelledByAdmin,
    };
    Ok(store.update_booking_status(booking_id, new_status)?)
}

/// Whether the admin status-override endpoint may move a booking from `from` to `to`.
///
/// The override exists for the confirm/reject workflow only. In particular, terminal statuses
/// are final: a cancelled or rejected booking cannot be re-activated.
pub fn admin_transition_allowed(from: BookingStatus, to: BookingStatus) -> bool {
    matches!(
        (from, to),
        (
            BookingStatus::Pending,
            BookingStatus::Confirmed | BookingStatus::Rejected | BookingStatus::CancelledByAdmin,
        ) | (BookingStatus::Confirmed, BookingStatus::CancelledByAdmin)
    )
}

/// Admin-only status override (confirm/reject path).
pub fn set_booking_status(
    store: &mut dyn VenueBookingStoreFacade,
    actor: &Identity,
    booking_id: BookingId,
    new_status: BookingStatus,
) -> Result<models::Booking, BookingError> {
    if actor.role != UserRole::Admin {
        return Err(BookingError::Forbidden(
            "Only admins can override booking statuses.",
        ));
    }
    let booking = store.get_booking(booking_id).map_err(|e| match e {
        StoreError::NotExisting => BookingError::BookingNotFound,
        other => BookingError::Store(other),
    })?;
    if !admin_transition_allowed(booking.status, new_status) {
        return Err(BookingError::IllegalStatusTransition {
            from: booking.status,
            to: new_status,
        });
    }
    Ok(store.update_booking_status(booking_id, new_status)?)
}

/// A client's own bookings, with venue data joined in, newest first.
pub fn my_bookings(
    store: &mut dyn VenueBookingStoreFacade,
    actor: &Identity,
) -> Result<Vec<models::BookingWithVenue>, BookingError> {
    if actor.role != UserRole::Client {
        return Err(BookingError::Forbidden(
            "Only clients have a personal booking list.",
        ));
    }
    Ok(store.get_bookings_for_client(actor.user_id)?)
}

/// All bookings on one venue, for the venue's owner or an admin.
pub fn venue_bookings(
    store: &mut dyn VenueBookingStoreFacade,
    actor: &Identity,
    venue_id: VenueId,
) -> Result<Vec<models::BookingWithClient>, BookingError> {
    let venue = store.get_venue(venue_id).map_err(|e| match e {
        StoreError::NotExisting => BookingError::VenueNotFound,
        other => BookingError::Store(other),
    })?;
    match actor.role {
        UserRole::Admin => {}
        UserRole::Owner => {
            if venue.owner_user_id != Some(actor.user_id) {
                return Err(BookingError::Forbidden(
                    "You can only view bookings on your own venues.",
                ));
            }
        }
        UserRole::Client => {
            return Err(BookingError::Forbidden(
                "Only venue owners and admins can view a venue's bookings.",
            ));
        }
    }
    Ok(store.get_bookings_for_venue(venue_id)?)
}

/// The filtered admin listing over all bookings.
pub fn admin_bookings(
    store: &mut dyn VenueBookingStoreFacade,
    actor: &Identity,
    filter: BookingFilter,
) -> Result<Vec<models::AdminBookingRecord>, BookingError> {
    if actor.role != UserRole::Admin {
        return Err(BookingError::Forbidden(
            "Only admins can list all bookings.",
        ));
    }
    Ok(store.get_bookings_filtered(filter)?)
}

/// First and last calendar day of the given month.
fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first_day = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last_day = (first_day + Months::new(1)).checked_sub_days(Days::new(1))?;
    Some((first_day, last_day))
}

/// The availability calendar of one venue for one month.
///
/// Returns a sparse list with one entry per *occupied* day; days absent from the list are free.
/// Admin callers additionally get the client's contact data and guest count per entry. Anyone,
/// including anonymous callers, may query the calendar.
pub fn availability_calendar(
    store: &mut dyn VenueBookingStoreFacade,
    venue_id: VenueId,
    year: i32,
    month: u32,
    requester_role: Option<UserRole>,
) -> Result<Vec<CalendarDay>, BookingError> {
    if !(2000..=2100).contains(&year) || !(1..=12).contains(&month) {
        return Err(BookingError::InvalidCalendarMonth);
    }
    let (first_day, last_day) = month_bounds(year, month).ok_or(BookingError::InvalidCalendarMonth)?;
    store.get_venue(venue_id).map_err(|e| match e {
        StoreError::NotExisting => BookingError::VenueNotFound,
        other => BookingError::Store(other),
    })?;
    let records = store.get_active_bookings_in_range(venue_id, first_day, last_day)?;
    let is_admin = requester_role == Some(UserRole::Admin);
    Ok(records
        .into_iter()
        .map(|record| CalendarDay {
            date: record.booking.booking_date,
            status: match record.booking.status {
                BookingStatus::Confirmed => CalendarSlotStatus::BookedConfirmed,
                _ => CalendarSlotStatus::BookedPending,
            },
            client_fio: is_admin.then(|| record.client_fio),
            client_phone: is_admin.then(|| record.client_phone),
            number_of_guests: is_admin.then_some(record.booking.number_of_guests),
        })
        .collect())
}
