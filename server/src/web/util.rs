use crate::data_store::{BookingFilter, BookingFilterBuilder, BookingSortKey, VenueId};
use chrono::NaiveDate;
use serde::Deserialize;

/// Query-string representation of a [BookingFilter] for the admin booking listing, e.g.
/// `?status=Pending&client_search=karimov&sort_by=created_at&order=asc`.
#[derive(Debug, Default, Deserialize)]
pub struct BookingFilterAsQuery {
    pub venue_id: Option<VenueId>,
    pub status: Option<venuebook_api_types::BookingStatus>,
    pub client_search: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub sort_by: Option<SortKeyAsQuery>,
    pub order: Option<SortOrderAsQuery>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKeyAsQuery {
    BookingDate,
    VenueName,
    Status,
    CreatedAt,
    Id,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrderAsQuery {
    Asc,
    Desc,
}

impl From<BookingFilterAsQuery> for BookingFilter {
    fn from(query: BookingFilterAsQuery) -> Self {
        let mut builder = BookingFilterBuilder::new();
        if let Some(venue_id) = query.venue_id {
            builder.venue(venue_id);
        }
        if let Some(status) = query.status {
            builder.status(status.into());
        }
        if let Some(client_search) = query.client_search {
            builder.client_search(client_search);
        }
        if let Some(date_from) = query.date_from {
            builder.date_from(date_from);
        }
        if let Some(date_to) = query.date_to {
            builder.date_to(date_to);
        }
        let sort_by = match query.sort_by {
            Some(SortKeyAsQuery::BookingDate) | None => BookingSortKey::BookingDate,
            Some(SortKeyAsQuery::VenueName) => BookingSortKey::VenueName,
            Some(SortKeyAsQuery::Status) => BookingSortKey::Status,
            Some(SortKeyAsQuery::CreatedAt) => BookingSortKey::CreatedAt,
            Some(SortKeyAsQuery::Id) => BookingSortKey::Id,
        };
        let descending = !matches!(query.order, Some(SortOrderAsQuery::Asc));
        builder.sort(sort_by, descending);
        builder.build()
    }
}
