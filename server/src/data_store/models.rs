use chrono::{naive::NaiveDate, DateTime, Utc};
use diesel::deserialize::FromSql;
use diesel::pg::{Pg, PgValue};
use diesel::prelude::*;
use diesel::serialize::{Output, ToSql};
use diesel::sql_types::Text;
use diesel::{AsExpression, FromSqlRow};

/// Status of a booking, stored as its exact string name in the database.
///
/// [BookingStatus::Pending] and [BookingStatus::Confirmed] are the "active" statuses: only they
/// occupy a (venue, date) calendar slot and only they can still be cancelled. All other statuses
/// are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
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

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::CancelledByClient => "CancelledByClient",
            Self::CancelledByOwner => "CancelledByOwner",
            Self::CancelledByAdmin => "CancelledByAdmin",
            Self::Rejected => "Rejected",
            Self::Completed => "Completed",
            Self::NoShow => "NoShow",
        }
    }

    /// Whether the booking still occupies its calendar slot (and can still be cancelled).
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Confirmed" => Ok(Self::Confirmed),
            "CancelledByClient" => Ok(Self::CancelledByClient),
            "CancelledByOwner" => Ok(Self::CancelledByOwner),
            "CancelledByAdmin" => Ok(Self::CancelledByAdmin),
            "Rejected" => Ok(Self::Rejected),
            "Completed" => Ok(Self::Completed),
            "NoShow" => Ok(Self::NoShow),
            other => Err(format!("\"{}\" is not a valid booking status", other)),
        }
    }
}

impl ToSql<Text, Pg> for BookingStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> diesel::serialize::Result {
        <str as ToSql<Text, Pg>>::to_sql(self.as_str(), &mut out.reborrow())
    }
}

impl FromSql<Text, Pg> for BookingStatus {
    fn from_sql(bytes: PgValue) -> diesel::deserialize::Result<Self> {
        let value = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
        value.parse().map_err(|e: String| e.into())
    }
}

impl From<BookingStatus> for venuebook_api_types::BookingStatus {
    fn from(value: BookingStatus) -> Self {
        match value {
            BookingStatus::Pending => Self::Pending,
            BookingStatus::Confirmed => Self::Confirmed,
            BookingStatus::CancelledByClient => Self::CancelledByClient,
            BookingStatus::CancelledByOwner => Self::CancelledByOwner,
            BookingStatus::CancelledByAdmin => Self::CancelledByAdmin,
            BookingStatus::Rejected => Self::Rejected,
            BookingStatus::Completed => Self::Completed,
            BookingStatus::NoShow => Self::NoShow,
        }
    }
}

impl From<venuebook_api_types::BookingStatus> for BookingStatus {
    fn from(value: venuebook_api_types::BookingStatus) -> Self {
        match value {
            venuebook_api_types::BookingStatus::Pending => Self::Pending,
            venuebook_api_types::BookingStatus::Confirmed => Self::Confirmed,
            venuebook_api_types::BookingStatus::CancelledByClient => Self::CancelledByClient,
            venuebook_api_types::BookingStatus::CancelledByOwner => Self::CancelledByOwner,
            venuebook_api_types::BookingStatus::CancelledByAdmin => Self::CancelledByAdmin,
            venuebook_api_types::BookingStatus::Rejected => Self::Rejected,
            venuebook_api_types::BookingStatus::Completed => Self::Completed,
            venuebook_api_types::BookingStatus::NoShow => Self::NoShow,
        }
    }
}

/// Approval state of a venue, stored as its string name. Only [VenueApprovalStatus::Approved]
/// venues accept new bookings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub enum VenueApprovalStatus {
    Pending,
    Approved,
    Rejected,
    Unapproved,
}

impl VenueApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Unapproved => "Unapproved",
        }
    }
}

impl std::str::FromStr for VenueApprovalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Approved" => Ok(Self::Approved),
            "Rejected" => Ok(Self::Rejected),
            "Unapproved" => Ok(Self::Unapproved),
            other => Err(format!("\"{}\" is not a valid venue approval status", other)),
        }
    }
}

impl ToSql<Text, Pg> for VenueApprovalStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> diesel::serialize::Result {
        <str as ToSql<Text, Pg>>::to_sql(self.as_str(), &mut out.reborrow())
    }
}

impl FromSql<Text, Pg> for VenueApprovalStatus {
    fn from_sql(bytes: PgValue) -> diesel::deserialize::Result<Self> {
        let value = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
        value.parse().map_err(|e: String| e.into())
    }
}

/// Role of a user account. Resolved once at the API boundary and matched exhaustively in the
/// booking logic, so no role string comparisons happen outside this module.
#[derive(Clone, Copy, Debug, PartialEq, Eq, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub enum UserRole {
    Client,
    Owner,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Client => "Client",
            Self::Owner => "Owner",
            Self::Admin => "Admin",
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Client" => Ok(Self::Client),
            "Owner" => Ok(Self::Owner),
            "Admin" => Ok(Self::Admin),
            other => Err(format!("\"{}\" is not a valid user role", other)),
        }
    }
}

impl ToSql<Text, Pg> for UserRole {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> diesel::serialize::Result {
        <str as ToSql<Text, Pg>>::to_sql(self.as_str(), &mut out.reborrow())
    }
}

impl FromSql<Text, Pg> for UserRole {
    fn from_sql(bytes: PgValue) -> diesel::deserialize::Result<Self> {
        let value = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
        value.parse().map_err(|e: String| e.into())
    }
}

#[derive(Clone, Debug, Queryable, Selectable)]
#[diesel(table_name=super::schema::users)]
pub struct User {
    pub id: i32,
    pub fio: String,
    pub phone_number: String,
    pub role: UserRole,
}

#[derive(Clone, Debug, Queryable, Selectable)]
#[diesel(table_name=super::schema::venues)]
pub struct Venue {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub capacity: i32,
    pub status: VenueApprovalStatus,
    /// A venue may exist without an assigned owner (e.g. created by an admin before handover).
    pub owner_user_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Queryable, Selectable)]
#[diesel(table_name=super::schema::bookings)]
pub struct Booking {
    pub id: i32,
    pub venue_id: i32,
    pub client_user_id: i32,
    pub booking_date: NaiveDate,
    pub number_of_guests: i32,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Booking> for venuebook_api_types::Booking {
    fn from(value: Booking) -> Self {
        Self {
            booking_id: value.id,
            venue_id: value.venue_id,
            client_user_id: value.client_user_id,
            booking_date: value.booking_date,
            number_of_guests: value.number_of_guests,
            status: value.status.into(),
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// A booking to be inserted. Timestamps are assigned by the database.
#[derive(Insertable)]
#[diesel(table_name=super::schema::bookings)]
pub struct NewBooking {
    pub venue_id: i32,
    pub client_user_id: i32,
    pub booking_date: NaiveDate,
    pub number_of_guests: i32,
    pub status: BookingStatus,
}

/// A booking with the venue's name and address joined in, for the client's own booking list.
#[derive(Clone, Debug)]
pub struct BookingWithVenue {
    pub booking: Booking,
    pub venue_name: String,
    pub venue_address: String,
}

impl From<BookingWithVenue> for venuebook_api_types::MyBooking {
    fn from(value: BookingWithVenue) -> Self {
        Self {
            booking_id: value.booking.id,
            venue_name: value.venue_name,
            venue_address: value.venue_address,
            booking_date: value.booking.booking_date,
            number_of_guests: value.booking.number_of_guests,
            booking_status: value.booking.status.into(),
            created_at: value.booking.created_at,
        }
    }
}

/// A booking with the client's contact data joined in, for venue-scoped listings and the
/// availability calendar.
#[derive(Clone, Debug)]
pub struct BookingWithClient {
    pub booking: Booking,
    pub client_fio: String,
    pub client_phone: String,
}

impl From<BookingWithClient> for venuebook_api_types::VenueBooking {
    fn from(value: BookingWithClient) -> Self {
        Self {
            booking_id: value.booking.id,
            client_fio: value.client_fio,
            client_phone: value.client_phone,
            booking_date: value.booking.booking_date,
            number_of_guests: value.booking.number_of_guests,
            booking_status: value.booking.status.into(),
            created_at: value.booking.created_at,
            updated_at: value.booking.updated_at,
        }
    }
}

/// One row of the admin booking listing, with venue and client data joined in.
#[derive(Clone, Debug)]
pub struct AdminBookingRecord {
    pub booking_id: i32,
    pub venue_id: i32,
    pub venue_name: String,
    pub client_fio: String,
    pub client_phone: String,
    pub booking_date: NaiveDate,
    pub number_of_guests: i32,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AdminBookingRecord> for venuebook_api_types::AdminBooking {
    fn from(value: AdminBookingRecord) -> Self {
        Self {
            booking_id: value.booking_id,
            venue_id: value.venue_id,
            venue_name: value.venue_name,
            client_fio: value.client_fio,
            client_phone: value.client_phone,
            booking_date: value.booking_date,
            number_of_guests: value.number_of_guests,
            booking_status: value.status.into(),
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}
