use crate::data_store::models::{
    AdminBookingRecord, Booking, BookingStatus, BookingWithClient, BookingWithVenue, NewBooking,
    User, Venue,
};
use crate::data_store::{
    models, BookingFilter, BookingId, BookingSortKey, StoreError, UserId, VenueBookingStore,
    VenueBookingStoreFacade, VenueId,
};
use chrono::NaiveDate;
use std::sync::Mutex;

/**
 * A mock [VenueBookingStore] implementation for testing.
 *
 * The simulated database consists of the [StoreMockData] structure with vectors of entities. These
 * can be directly modified by the tests.
 *
 * Except from checking for entity existence and emulating the partial unique index on active
 * bookings, the interface functions of this mock don't do any error checking. Instead, the
 * [StoreMockData::next_error] attribute can be set to simulate a database error.
 */
#[derive(Default)]
pub struct StoreMock {
    pub data: Mutex<StoreMockData>,
}

impl VenueBookingStore for StoreMock {
    fn get_facade<'a>(&'a self) -> Result<Box<dyn VenueBookingStoreFacade + 'a>, StoreError> {
        Ok(Box::new(StoreMockFacade { store: self }))
    }
}

#[derive(Default)]
pub struct StoreMockData {
    pub users: Vec<User>,
    pub venues: Vec<Venue>,
    pub bookings: Vec<Booking>,
    /// If not none, the next call to a store facade method will return this error.
    pub next_error: Option<StoreError>,
}

impl StoreMockData {
    fn next_booking_id(&self) -> BookingId {
        self.bookings.iter().map(|b| b.id).max().unwrap_or(0) + 1
    }

    fn venue_name(&self, venue_id: VenueId) -> String {
        self.venues
            .iter()
            .find(|v| v.id == venue_id)
            .map(|v| v.name.clone())
            .unwrap_or_default()
    }

    fn venue_address(&self, venue_id: VenueId) -> String {
        self.venues
            .iter()
            .find(|v| v.id == venue_id)
            .map(|v| v.address.clone())
            .unwrap_or_default()
    }

    fn client_contact(&self, user_id: UserId) -> (String, String) {
        self.users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| (u.fio.clone(), u.phone_number.clone()))
            .unwrap_or_default()
    }
}

struct StoreMockFacade<'a> {
    store: &'a StoreMock,
}

impl<'a> VenueBookingStoreFacade for StoreMockFacade<'a> {
    fn get_user(&mut self, user_id: UserId) -> Result<User, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        data.users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or(StoreError::NotExisting)
    }

    fn get_venue(&mut self, venue_id: VenueId) -> Result<Venue, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        data.venues
            .iter()
            .find(|v| v.id == venue_id)
            .cloned()
            .ok_or(StoreError::NotExisting)
    }

    fn create_booking(&mut self, booking: NewBooking) -> Result<Booking, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        // Emulates the partial unique index on (venue_id, booking_date) for active statuses.
        let conflicting = data.bookings.iter().any(|b| {
            b.venue_id == booking.venue_id
                && b.booking_date == booking.booking_date
                && b.status.is_active()
        });
        if conflicting && booking.status.is_active() {
            return Err(StoreError::ConflictEntityExists);
        }
        let now = chrono::Utc::now();
        let created = Booking {
            id: data.next_booking_id(),
            venue_id: booking.venue_id,
            client_user_id: booking.client_user_id,
            booking_date: booking.booking_date,
            number_of_guests: booking.number_of_guests,
            status: booking.status,
            created_at: now,
            updated_at: now,
        };
        data.bookings.push(created.clone());
        Ok(created)
    }

    fn get_booking(&mut self, booking_id: BookingId) -> Result<Booking, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        data.bookings
            .iter()
            .find(|b| b.id == booking_id)
            .cloned()
            .ok_or(StoreError::NotExisting)
    }

    fn has_active_booking(
        &mut self,
        venue_id: VenueId,
        date: NaiveDate,
    ) -> Result<bool, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        Ok(data
            .bookings
            .iter()
            .any(|b| b.venue_id == venue_id && b.booking_date == date && b.status.is_active()))
    }

    fn update_booking_status(
        &mut self,
        booking_id: BookingId,
        new_status: BookingStatus,
    ) -> Result<Booking, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let booking = data
            .bookings
            .iter_mut()
            .find(|b| b.id == booking_id)
            .ok_or(StoreError::NotExisting)?;
        booking.status = new_status;
        booking.updated_at = chrono::Utc::now();
        Ok(booking.clone())
    }

    fn get_bookings_for_client(
        &mut self,
        client_user_id: UserId,
    ) -> Result<Vec<BookingWithVenue>, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let mut result: Vec<Booking> = data
            .bookings
            .iter()
            .filter(|b| b.client_user_id == client_user_id)
            .cloned()
            .collect();
        result.sort_by_key(|b| (std::cmp::Reverse(b.booking_date), std::cmp::Reverse(b.id)));
        Ok(result
            .into_iter()
            .map(|booking| models::BookingWithVenue {
                venue_name: data.venue_name(booking.venue_id),
                venue_address: data.venue_address(booking.venue_id),
                booking,
            })
            .collect())
    }

    fn get_bookings_for_venue(
        &mut self,
        venue_id: VenueId,
    ) -> Result<Vec<BookingWithClient>, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let mut result: Vec<Booking> = data
            .bookings
            .iter()
            .filter(|b| b.venue_id == venue_id)
            .cloned()
            .collect();
        result.sort_by_key(|b| (std::cmp::Reverse(b.booking_date), std::cmp::Reverse(b.id)));
        Ok(result
            .into_iter()
            .map(|booking| {
                let (client_fio, client_phone) = data.client_contact(booking.client_user_id);
                models::BookingWithClient {
                    booking,
                    client_fio,
                    client_phone,
                }
            })
            .collect())
    }

    fn get_bookings_filtered(
        &mut self,
        filter: BookingFilter,
    ) -> Result<Vec<AdminBookingRecord>, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let mut result: Vec<AdminBookingRecord> = data
            .bookings
            .iter()
            .map(|booking| {
                let (client_fio, client_phone) = data.client_contact(booking.client_user_id);
                AdminBookingRecord {
                    booking_id: booking.id,
                    venue_id: booking.venue_id,
                    venue_name: data.venue_name(booking.venue_id),
                    client_fio,
                    client_phone,
                    booking_date: booking.booking_date,
                    number_of_guests: booking.number_of_guests,
                    status: booking.status,
                    created_at: booking.created_at,
                    updated_at: booking.updated_at,
                }
            })
            .filter(|record| filter.matches(record))
            .collect();
        result.sort_by(|a, b| {
            let ordering = match filter.sort_by {
                BookingSortKey::BookingDate => a.booking_date.cmp(&b.booking_date),
                BookingSortKey::VenueName => a.venue_name.cmp(&b.venue_name),
                BookingSortKey::Status => a.status.as_str().cmp(b.status.as_str()),
                BookingSortKey::CreatedAt => a.created_at.cmp(&b.created_at),
                BookingSortKey::Id => std::cmp::Ordering::Equal,
            }
            .then(a.booking_id.cmp(&b.booking_id));
            if filter.descending {
                ordering.reverse()
            } else {
                ordering
            }
        });
        Ok(result)
    }

    fn get_active_bookings_in_range(
        &mut self,
        venue_id: VenueId,
        first_day: NaiveDate,
        last_day: NaiveDate,
    ) -> Result<Vec<BookingWithClient>, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let mut result: Vec<Booking> = data
            .bookings
            .iter()
            .filter(|b| {
                b.venue_id == venue_id
                    && b.booking_date >= first_day
                    && b.booking_date <= last_day
                    && b.status.is_active()
            })
            .cloned()
            .collect();
        result.sort_by_key(|b| b.booking_date);
        Ok(result
            .into_iter()
            .map(|booking| {
                let (client_fio, client_phone) = data.client_contact(booking.client_user_id);
                models::BookingWithClient {
                    booking,
                    client_fio,
                    client_phone,
                }
            })
            .collect())
    }
}
