//! The backend part of the backend: the database interface
//!
//! The primary entry point to this module is the function [get_store_from_env], which returns an
//! object implementing the [VenueBookingStore] trait. This object can be shared between threads in
//! a global application state and be used to create [VenueBookingStoreFacade] instances for
//! interaction with the database. These provide a CRUD-like interface, using the data models from
//! the [models] module.
//!
//! The primary implementation of [VenueBookingStore] ([postgres::PgDataStore]) wraps a PostgreSQL
//! connection pool and its corresponding [VenueBookingStoreFacade] objects
//! ([postgres::PgDataStoreFacade]) hold a reference to one pooled connection each, using the
//! Diesel query DSL for implementing the database interaction.
//!
//! There is also a mock implementation for unittests. Other [VenueBookingStore] implementations
//! may be added later and selected via the "DATABASE_URL" environment variable.

use crate::cli_error::CliError;
use crate::cli_error::CliError::UnexpectedStoreError;
use crate::setup;
use chrono::NaiveDate;
use models::BookingStatus;

pub mod models;
mod postgres;
mod schema;
#[cfg(test)]
pub mod store_mock;

/// Get a [VenueBookingStore] instance, according to the "DATABASE_URL" environment variable.
///
/// The DATABASE_URL must be a PostgreSQL connection url, following the schema
/// "postgres://{user}:{password}@{host}/{database}".
pub fn get_store_from_env() -> Result<impl VenueBookingStore, CliError> {
    postgres::PgDataStore::new(&setup::get_database_url_from_env()?)
        .map_err(|err| UnexpectedStoreError(err.to_string()))
}

pub type UserId = i32;
pub type VenueId = i32;
pub type BookingId = i32;

pub trait VenueBookingStoreFacade {
    fn get_user(&mut self, user_id: UserId) -> Result<models::User, StoreError>;

    fn get_venue(&mut self, venue_id: VenueId) -> Result<models::Venue, StoreError>;

    /// Insert a new booking and return the persisted record.
    ///
    /// The store must guarantee that at most one booking with an active status (Pending or
    /// Confirmed) exists per (venue, date) pair, even under concurrent insertion attempts. A
    /// violation of that guarantee is reported as [StoreError::ConflictEntityExists]; the caller
    /// treats it identically to its own availability pre-check.
    fn create_booking(&mut self, booking: models::NewBooking)
        -> Result<models::Booking, StoreError>;

    fn get_booking(&mut self, booking_id: BookingId) -> Result<models::Booking, StoreError>;

    /// Check whether an active (Pending or Confirmed) booking exists for the venue on the date.
    ///
    /// This is only a fast-path check; the uniqueness constraint behind [create_booking] is the
    /// authoritative conflict signal.
    fn has_active_booking(
        &mut self,
        venue_id: VenueId,
        date: NaiveDate,
    ) -> Result<bool, StoreError>;

    /// Set the status of a booking, updating its `updated_at` timestamp, and return the updated
    /// record.
    fn update_booking_status(
        &mut self,
        booking_id: BookingId,
        new_status: BookingStatus,
    ) -> Result<models::Booking, StoreError>;

    /// Get all bookings of one client, with venue name and address joined in, sorted by booking
    /// date (newest first).
    fn get_bookings_for_client(
        &mut self,
        client_user_id: UserId,
    ) -> Result<Vec<models::BookingWithVenue>, StoreError>;

    /// Get all bookings on one venue, with client contact data joined in, sorted by booking date
    /// (newest first).
    fn get_bookings_for_venue(
        &mut self,
        venue_id: VenueId,
    ) -> Result<Vec<models::BookingWithClient>, StoreError>;

    /// Get a filtered and sorted list of all bookings with venue and client data joined in, for
    /// the admin listing.
    fn get_bookings_filtered(
        &mut self,
        filter: BookingFilter,
    ) -> Result<Vec<models::AdminBookingRecord>, StoreError>;

    /// Get all active (Pending or Confirmed) bookings of the venue with a booking date within
    /// [first_day, last_day], with client contact data joined in, sorted by booking date
    /// (ascending).
    fn get_active_bookings_in_range(
        &mut self,
        venue_id: VenueId,
        first_day: NaiveDate,
        last_day: NaiveDate,
    ) -> Result<Vec<models::BookingWithClient>, StoreError>;
}

/// Sort key options for the admin booking listing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BookingSortKey {
    #[default]
    BookingDate,
    VenueName,
    Status,
    CreatedAt,
    Id,
}

/// Filter and sort options for retrieving bookings from the store via
/// [VenueBookingStoreFacade::get_bookings_filtered]
///
/// Can be constructed through the [BookingFilterBuilder]
pub struct BookingFilter {
    /// Filter for bookings on the given venue
    pub venue_id: Option<VenueId>,
    /// Filter for bookings with the given status
    pub status: Option<BookingStatus>,
    /// Case-insensitive substring search over the client's fio and phone number
    pub client_search: Option<String>,
    /// Filter for bookings on or after the given date
    pub date_from: Option<NaiveDate>,
    /// Filter for bookings on or before the given date
    pub date_to: Option<NaiveDate>,
    /// Sort key; booking id is always used as tie-breaker
    pub sort_by: BookingSortKey,
    /// Sort descending (the default, newest bookings first)
    pub descending: bool,
}

impl Default for BookingFilter {
    fn default() -> Self {
        Self {
            venue_id: None,
            status: None,
            client_search: None,
            date_from: None,
            date_to: None,
            sort_by: BookingSortKey::BookingDate,
            descending: true,
        }
    }
}

impl BookingFilter {
    /// Checks if a given booking record matches the filter
    ///
    /// Usually, filtering should be done by the database. This function can be used for separate
    /// checks of individual records in software.
    pub fn matches(&self, record: &models::AdminBookingRecord) -> bool {
        if let Some(venue_id) = self.venue_id {
            if record.venue_id != venue_id {
                return false;
            }
        }
        if let Some(status) = self.status {
            if record.status != status {
                return false;
            }
        }
        if let Some(search) = &self.client_search {
            let needle = search.to_lowercase();
            if !record.client_fio.to_lowercase().contains(&needle)
                && !record.client_phone.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        if let Some(date_from) = self.date_from {
            if record.booking_date < date_from {
                return false;
            }
        }
        if let Some(date_to) = self.date_to {
            if record.booking_date > date_to {
                return false;
            }
        }
        true
    }
}

/// Builder for constructing [BookingFilter] objects
pub struct BookingFilterBuilder {
    result: BookingFilter,
}

impl BookingFilterBuilder {
    pub fn new() -> Self {
        Self {
            result: BookingFilter::default(),
        }
    }

    /// Add filter to only include bookings on the given venue
    pub fn venue(&mut self, venue_id: VenueId) -> &mut Self {
        self.result.venue_id = Some(venue_id);
        self
    }

    /// Add filter to only include bookings with the given status
    pub fn status(&mut self, status: BookingStatus) -> &mut Self {
        self.result.status = Some(status);
        self
    }

    /// Add a case-insensitive substring search over the client's fio and phone number
    pub fn client_search(&mut self, search: String) -> &mut Self {
        self.result.client_search = Some(search);
        self
    }

    /// Add filter to only include bookings on or after the given date
    pub fn date_from(&mut self, date_from: NaiveDate) -> &mut Self {
        self.result.date_from = Some(date_from);
        self
    }

    /// Add filter to only include bookings on or before the given date
    pub fn date_to(&mut self, date_to: NaiveDate) -> &mut Self {
        self.result.date_to = Some(date_to);
        self
    }

    /// Set the sort key and direction
    pub fn sort(&mut self, sort_by: BookingSortKey, descending: bool) -> &mut Self {
        self.result.sort_by = sort_by;
        self.result.descending = descending;
        self
    }

    /// Create the [BookingFilter] object
    pub fn build(self) -> BookingFilter {
        self.result
    }
}

pub trait VenueBookingStore: Send + Sync {
    fn get_facade<'a>(&'a self) -> Result<Box<dyn VenueBookingStoreFacade + 'a>, StoreError>;
}

#[derive(Debug)]
pub enum StoreError {
    /// Connection to the database failed. See string description for details.
    ConnectionError(String),
    /// The query could not be executed because of some error not covered by the other members (see
    /// string description)
    QueryError(diesel::result::Error),
    /// Database transaction could not be commited due to a conflicting concurrent transaction
    TransactionConflict,
    /// The requested entity does not exist
    NotExisting,
    /// The entity could not be created because a conflicting entity exists already. For bookings,
    /// this is the unique-index-backed signal that the (venue, date) slot is taken.
    ConflictEntityExists,
    /// The provided data is invalid, i.e. it does not match the expected ranges or violates a
    /// SQL constraint. See string description for details.
    InvalidInputData(String),
    /// Some data queried from the database could not be deserialized. See string description for
    /// details.
    InvalidDataInDatabase(String),
}

impl From<diesel::result::Error> for StoreError {
    fn from(error: diesel::result::Error) -> Self {
        match error {
            diesel::result::Error::NotFound => Self::NotExisting,
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            ) => Self::ConflictEntityExists,
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::SerializationFailure,
                _,
            ) => Self::TransactionConflict,
            diesel::result::Error::DatabaseError(
                e @ diesel::result::DatabaseErrorKind::ForeignKeyViolation
                | e @ diesel::result::DatabaseErrorKind::CheckViolation,
                _,
            ) => Self::InvalidInputData(format!("{:?}", e)),
            diesel::result::Error::SerializationError(e) => Self::InvalidInputData(e.to_string()),
            diesel::result::Error::DeserializationError(e) => {
                Self::InvalidDataInDatabase(e.to_string())
            }
            _ => Self::QueryError(error),
        }
    }
}

impl From<r2d2::Error> for StoreError {
    fn from(error: r2d2::Error) -> Self {
        Self::ConnectionError(error.to_string())
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConnectionError(e) => write!(f, "Error connecting to database: {}", e),
            Self::QueryError(e) => write!(f, "Error while executing database query: {}", e),
            Self::TransactionConflict => f.write_str("Database transaction could not be commited due to a conflicting concurrent transaction"),
            Self::NotExisting => f.write_str("Database record does not exist."),
            Self::ConflictEntityExists => f.write_str("Conflicting database record exists already."),
            Self::InvalidInputData(e) => {
                write!(f, "Data to be stored in database is not valid: {}", e)
            }
            Self::InvalidDataInDatabase(e) => {
                write!(f, "Data queried from database could not be deserialized: {}", e)
            }
        }
    }
}

impl std::error::Error for StoreError {}
