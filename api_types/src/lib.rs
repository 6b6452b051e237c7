//! Shared JSON data types of the Venuebook HTTP API.
//!
//! The status enums in this crate serialize to the exact strings used at the
//! API boundary (`Pending`, `Confirmed`, `CancelledByClient`, … and
//! `booked_confirmed`/`booked_pending` for calendar slots), so clients and
//! the server agree on round-tripping them.

use chrono::{naive::NaiveDate, DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a booking.
///
/// `Pending` and `Confirmed` are the "active" statuses that occupy a calendar
/// slot; all other statuses are terminal.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    CancelledByClient,
    CancelledByOwner,
    CancelledByAdmin,
    Rejected,
    Completed,
    NoShow,
}

/// Approval state of a venue. Only `Approved` venues are bookable.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum VenueApprovalStatus {
    Pending,
    Approved,
    Rejected,
    Unapproved,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Booking {
    pub booking_id: i32,
    pub venue_id: i32,
    pub client_user_id: i32,
    pub booking_date: NaiveDate,
    pub number_of_guests: i32,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for `POST /api/v1/bookings`.
#[derive(Serialize, Deserialize, Debug)]
pub struct CreateBookingRequest {
    pub venue_id: i32,
    pub booking_date: NaiveDate,
    pub number_of_guests: i32,
}

/// Request body for the admin status-override endpoint.
#[derive(Serialize, Deserialize, Debug)]
pub struct UpdateBookingStatusRequest {
    pub new_status: BookingStatus,
}

/// One booking in a client's own booking list, with venue details joined in.
#[derive(Serialize, Deserialize, Debug)]
pub struct MyBooking {
    pub booking_id: i32,
    pub venue_name: String,
    pub venue_address: String,
    pub booking_date: NaiveDate,
    pub number_of_guests: i32,
    pub booking_status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

/// One booking in a venue owner's per-venue listing, with client contact data.
#[derive(Serialize, Deserialize, Debug)]
pub struct VenueBooking {
    pub booking_id: i32,
    pub client_fio: String,
    pub client_phone: String,
    pub booking_date: NaiveDate,
    pub number_of_guests: i32,
    pub booking_status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One booking in the admin listing, with venue and client details joined in.
#[derive(Serialize, Deserialize, Debug)]
pub struct AdminBooking {
    pub booking_id: i32,
    pub venue_id: i32,
    pub venue_name: String,
    pub client_fio: String,
    pub client_phone: String,
    pub booking_date: NaiveDate,
    pub number_of_guests: i32,
    pub booking_status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Occupancy state of a single calendar day.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalendarSlotStatus {
    #[serde(rename = "booked_confirmed")]
    BookedConfirmed,
    #[serde(rename = "booked_pending")]
    BookedPending,
}

/// One occupied day in a venue's availability calendar.
///
/// The client fields are only present for admin callers; for everyone else
/// they are omitted from the JSON entirely.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub status: CalendarSlotStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_fio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_guests: Option<i32>,
}

/// Response of the availability-calendar endpoint.
///
/// `calendar_data` is sparse: one entry per *occupied* day of the requested
/// month. Days not present in the list are free.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CalendarResponse {
    pub venue_id: i32,
    pub year: i32,
    pub month: u32,
    pub calendar_data: Vec<CalendarDay>,
}
