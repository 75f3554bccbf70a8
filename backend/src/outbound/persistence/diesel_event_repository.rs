//! PostgreSQL-backed [`EventRepository`] implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::{PgArrayExpressionMethods, PgTextExpressionMethods};
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::event::{
    Event, EventFilter, EventPage, EventPatch, EventSortKey, EventWithCreator, NewEvent, SortOrder,
};
use crate::domain::ports::{EventRepository, RepositoryError};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{EventChangeset, EventRow, NewEventRow, UserRow};
use super::pool::DbPool;
use super::schema::{events, users};

/// Diesel-backed event repository.
#[derive(Clone)]
pub struct DieselEventRepository {
    pool: DbPool,
}

impl DieselEventRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Apply the listing filter to a boxed query over the events table.
///
/// A macro because the joined listing query and the bare count query have
/// different boxed types but share every predicate.
macro_rules! apply_filters {
    ($query:expr, $filter:expr) => {{
        let mut query = $query.filter(events::status.eq($filter.status.as_str()));
        if let Some(search) = &$filter.search {
            let pattern = format!("%{search}%");
            query = query.filter(
                events::title
                    .ilike(pattern.clone())
                    .or(events::description.ilike(pattern)),
            );
        }
        if let Some(categories) = &$filter.categories {
            query = query.filter(events::categories.overlaps_with(categories.clone()));
        }
        if let Some(city) = &$filter.city {
            query = query.filter(events::city.ilike(format!("%{city}%")));
        }
        if let Some(country) = &$filter.country {
            query = query.filter(events::country.ilike(format!("%{country}%")));
        }
        if let Some(after) = $filter.starts_after {
            query = query.filter(events::start_time.ge(after));
        }
        if let Some(before) = $filter.starts_before {
            query = query.filter(events::start_time.le(before));
        }
        if let Some(min_price) = $filter.min_price {
            query = query.filter(events::ticket_price.ge(min_price));
        }
        if let Some(max_price) = $filter.max_price {
            query = query.filter(events::ticket_price.le(max_price));
        }
        if let Some(location_type) = $filter.location_type {
            query = query.filter(events::location_type.eq(location_type.as_str()));
        }
        query
    }};
}

fn join_row(pair: (EventRow, UserRow)) -> EventWithCreator {
    EventWithCreator {
        event: Event::from(pair.0),
        creator: pair.1.into(),
    }
}

#[async_trait]
impl EventRepository for DieselEventRepository {
    async fn insert(&self, event: NewEvent) -> Result<Event, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: EventRow = diesel::insert_into(events::table)
            .values(NewEventRow::from_domain(event))
            .returning(EventRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(row.into())
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<EventWithCreator>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let pair: Option<(EventRow, UserRow)> = events::table
            .find(id)
            .inner_join(users::table)
            .select((EventRow::as_select(), UserRow::as_select()))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(pair.map(join_row))
    }

    async fn fetch_basic(&self, id: Uuid) -> Result<Option<Event>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<EventRow> = events::table
            .find(id)
            .select(EventRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Event::from))
    }

    async fn list(&self, filter: &EventFilter) -> Result<EventPage, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = apply_filters!(events::table.into_boxed(), filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let query = apply_filters!(events::table.inner_join(users::table).into_boxed(), filter);
        let query = match (filter.sort_by, filter.sort_order) {
            (EventSortKey::StartTime, SortOrder::Asc) => query.order(events::start_time.asc()),
            (EventSortKey::StartTime, SortOrder::Desc) => query.order(events::start_time.desc()),
            (EventSortKey::TicketPrice, SortOrder::Asc) => query.order(events::ticket_price.asc()),
            (EventSortKey::TicketPrice, SortOrder::Desc) => {
                query.order(events::ticket_price.desc())
            }
            (EventSortKey::CreatedAt, SortOrder::Asc) => query.order(events::created_at.asc()),
            (EventSortKey::CreatedAt, SortOrder::Desc) => query.order(events::created_at.desc()),
        };
        let rows: Vec<(EventRow, UserRow)> = query
            .select((EventRow::as_select(), UserRow::as_select()))
            .limit(i64::from(filter.limit))
            .offset(filter.offset())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(EventPage {
            events: rows.into_iter().map(join_row).collect(),
            total,
            page: filter.page,
            limit: filter.limit,
        })
    }

    async fn update(
        &self,
        id: Uuid,
        patch: &EventPatch,
    ) -> Result<Option<Event>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<EventRow> = diesel::update(events::table.find(id))
            .set(EventChangeset::from_patch(patch))
            .returning(EventRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Event::from))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(events::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
