use super::{
    models, schema, BookingFilter, BookingId, BookingSortKey, StoreError, UserId,
    VenueBookingStore, VenueBookingStoreFacade, VenueId,
};
use crate::data_store::models::BookingStatus;
use chrono::NaiveDate;
use diesel::dsl::exists;
use diesel::pg::PgConnection;
use diesel::prelude::*;

#[derive(Clone)]
pub struct PgDataStore {
    pool: diesel::r2d2::Pool<diesel::r2d2::ConnectionManager<PgConnection>>,
}

impl PgDataStore {
    pub fn new(database_url: &str) -> Result<Self, StoreError> {
        let connection_manager = diesel::r2d2::ConnectionManager::<PgConnection>::new(database_url);
        Ok(Self {
            pool: diesel::r2d2::Pool::builder()
                .test_on_check_out(true)
                .min_idle(Some(2))
                .build(connection_manager)?,
        })
    }
}

impl VenueBookingStore for PgDataStore {
    fn get_facade<'a>(&'a self) -> Result<Box<dyn VenueBookingStoreFacade + 'a>, StoreError> {
        Ok(Box::new(PgDataStoreFacade::with_pooled_connection(
            self.pool.get()?,
        )))
    }
}

pub struct PgDataStoreFacade {
    connection: diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<PgConnection>>,
}

impl PgDataStoreFacade {
    pub fn with_pooled_connection(
        connection: diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<PgConnection>>,
    ) -> Self {
        Self { connection }
    }
}

const ACTIVE_STATUSES: [BookingStatus; 2] = [BookingStatus::Pending, BookingStatus::Confirmed];

impl VenueBookingStoreFacade for PgDataStoreFacade {
    fn get_user(&mut self, user_id: UserId) -> Result<models::User, StoreError> {
        use schema::users::dsl::*;

        users
            .filter(id.eq(user_id))
            .select(models::User::as_select())
            .first::<models::User>(&mut self.connection)
            .map_err(|e| e.into())
    }

    fn get_venue(&mut self, venue_id: VenueId) -> Result<models::Venue, StoreError> {
        use schema::venues::dsl::*;

        venues
            .filter(id.eq(venue_id))
            .select(models::Venue::as_select())
            .first::<models::Venue>(&mut self.connection)
            .map_err(|e| e.into())
    }

    fn create_booking(
        &mut self,
        booking: models::NewBooking,
    ) -> Result<models::Booking, StoreError> {
        use schema::bookings::dsl::*;

        // The partial unique index on (venue_id, booking_date) for active statuses turns a lost
        // race into a UniqueViolation, which the StoreError conversion reports as
        // ConflictEntityExists.
        Ok(diesel::insert_into(bookings)
            .values(&booking)
            .returning(models::Booking::as_returning())
            .get_result::<models::Booking>(&mut self.connection)?)
    }

    fn get_booking(&mut self, booking_id: BookingId) -> Result<models::Booking, StoreError> {
        use schema::bookings::dsl::*;

        bookings
            .filter(id.eq(booking_id))
            .select(models::Booking::as_select())
            .first::<models::Booking>(&mut self.connection)
            .map_err(|e| e.into())
    }

    fn has_active_booking(
        &mut self,
        the_venue_id: VenueId,
        date: NaiveDate,
    ) -> Result<bool, StoreError> {
        use schema::bookings::dsl::*;

        Ok(diesel::select(exists(
            bookings
                .filter(venue_id.eq(the_venue_id))
                .filter(booking_date.eq(date))
                .filter(status.eq_any(ACTIVE_STATUSES)),
        ))
        .get_result::<bool>(&mut self.connection)?)
    }

    fn update_booking_status(
        &mut self,
        booking_id: BookingId,
        new_status: BookingStatus,
    ) -> Result<models::Booking, StoreError> {
        use schema::bookings::dsl::*;

        Ok(diesel::update(bookings.filter(id.eq(booking_id)))
            .set((status.eq(new_status), updated_at.eq(diesel::dsl::now)))
            .returning(models::Booking::as_returning())
            .get_result::<models::Booking>(&mut self.connection)?)
    }

    fn get_bookings_for_client(
        &mut self,
        the_client_user_id: UserId,
    ) -> Result<Vec<models::BookingWithVenue>, StoreError> {
        use schema::{bookings, venues};

        let rows = bookings::table
            .inner_join(venues::table)
            .filter(bookings::client_user_id.eq(the_client_user_id))
            .order_by((bookings::booking_date.desc(), bookings::id.desc()))
            .select((
                models::Booking::as_select(),
                venues::name,
                venues::address,
            ))
            .load::<(models::Booking, String, String)>(&mut self.connection)?;

        Ok(rows
            .into_iter()
            .map(|(booking, venue_name, venue_address)| models::BookingWithVenue {
                booking,
                venue_name,
                venue_address,
            })
            .collect())
    }

    fn get_bookings_for_venue(
        &mut self,
        the_venue_id: VenueId,
    ) -> Result<Vec<models::BookingWithClient>, StoreError> {
        use schema::{bookings, users};

        let rows = bookings::table
            .inner_join(users::table)
            .filter(bookings::venue_id.eq(the_venue_id))
            .order_by((bookings::booking_date.desc(), bookings::id.desc()))
            .select((
                models::Booking::as_select(),
                users::fio,
                users::phone_number,
            ))
            .load::<(models::Booking, String, String)>(&mut self.connection)?;

        Ok(rows
            .into_iter()
            .map(|(booking, client_fio, client_phone)| models::BookingWithClient {
                booking,
                client_fio,
                client_phone,
            })
            .collect())
    }

    fn get_bookings_filtered(
        &mut self,
        filter: BookingFilter,
    ) -> Result<Vec<models::AdminBookingRecord>, StoreError> {
        use schema::{bookings, users, venues};

        let mut query = bookings::table
            .inner_join(venues::table)
            .inner_join(users::table)
            .select((
                models::Booking::as_select(),
                venues::name,
                users::fio,
                users::phone_number,
            ))
            .into_boxed();

        if let Some(the_venue_id) = filter.venue_id {
            query = query.filter(bookings::venue_id.eq(the_venue_id));
        }
        if let Some(the_status) = filter.status {
            query = query.filter(bookings::status.eq(the_status));
        }
        if let Some(search) = &filter.client_search {
            let pattern = format!("%{}%", search);
            query = query.filter(
                users::fio
                    .ilike(pattern.clone())
                    .or(users::phone_number.ilike(pattern)),
            );
        }
        if let Some(date_from) = filter.date_from {
            query = query.filter(bookings::booking_date.ge(date_from));
        }
        if let Some(date_to) = filter.date_to {
            query = query.filter(bookings::booking_date.le(date_to));
        }

        query = match (filter.sort_by, filter.descending) {
            (BookingSortKey::BookingDate, false) => {
                query.order((bookings::booking_date.asc(), bookings::id.asc()))
            }
            (BookingSortKey::BookingDate, true) => {
                query.order((bookings::booking_date.desc(), bookings::id.desc()))
            }
            (BookingSortKey::VenueName, false) => {
                query.order((venues::name.asc(), bookings::id.asc()))
            }
            (BookingSortKey::VenueName, true) => {
                query.order((venues::name.desc(), bookings::id.desc()))
            }
            (BookingSortKey::Status, false) => {
                query.order((bookings::status.asc(), bookings::id.asc()))
            }
            (BookingSortKey::Status, true) => {
                query.order((bookings::status.desc(), bookings::id.desc()))
            }
            (BookingSortKey::CreatedAt, false) => {
                query.order((bookings::created_at.asc(), bookings::id.asc()))
            }
            (BookingSortKey::CreatedAt, true) => {
                query.order((bookings::created_at.desc(), bookings::id.desc()))
            }
            (BookingSortKey::Id, false) => query.order(bookings::id.asc()),
            (BookingSortKey::Id, true) => query.order(bookings::id.desc()),
        };

        let rows =
            query.load::<(models::Booking, String, String, String)>(&mut self.connection)?;

        Ok(rows
            .into_iter()
            .map(
                |(booking, venue_name, client_fio, client_phone)| models::AdminBookingRecord {
                    booking_id: booking.id,
                    venue_id: booking.venue_id,
                    venue_name,
                    client_fio,
                    client_phone,
                    booking_date: booking.booking_date,
                    number_of_guests: booking.number_of_guests,
                    status: booking.status,
                    created_at: booking.created_at,
                    updated_at: booking.updated_at,
                },
            )
            .collect())
    }

    fn get_active_bookings_in_range(
        &mut self,
        the_venue_id: VenueId,
        first_day: NaiveDate,
        last_day: NaiveDate,
    ) -> Result<Vec<models::BookingWithClient>, StoreError> {
        use schema::{bookings, users};

        let rows = bookings::table
            .inner_join(users::table)
            .filter(bookings::venue_id.eq(the_venue_id))
            .filter(bookings::booking_date.ge(first_day))
            .filter(bookings::booking_date.le(last_day))
            .filter(bookings::status.eq_any(ACTIVE_STATUSES))
            .order_by(bookings::booking_date.asc())
            .select((
                models::Booking::as_select(),
                users::fio,
                users::phone_number,
            ))
            .load::<(models::Booking, String, String)>(&mut self.connection)?;

        Ok(rows
            .into_iter()
            .map(|(booking, client_fio, client_phone)| models::BookingWithClient {
                booking,
                client_fio,
                client_phone,
            })
            .collect())
    }
}
