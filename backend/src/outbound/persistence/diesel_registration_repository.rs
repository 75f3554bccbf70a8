//! PostgreSQL-backed [`RegistrationRepository`] implementation.
//!
//! The `(event_id, user_id)` pair is unique at the database level, so the
//! service-layer reactivation logic never races into duplicate rows.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::registration::{
    Attendee, Registration, RegistrationStatus, RegistrationWithEvent,
};
use crate::domain::ports::{RegistrationRepository, RepositoryError};
use crate::domain::user::UserId;

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{EventRow, NewRegistrationRow, RegistrationRow, UserRow};
use super::pool::DbPool;
use super::schema::{events, registrations, users};

/// Diesel-backed registration repository.
#[derive(Clone)]
pub struct DieselRegistrationRepository {
    pool: DbPool,
}

impl DieselRegistrationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RegistrationRepository for DieselRegistrationRepository {
    async fn find(
        &self,
        event_id: Uuid,
        user_id: &UserId,
    ) -> Result<Option<Registration>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<RegistrationRow> = registrations::table
            .filter(registrations::event_id.eq(event_id))
            .filter(registrations::user_id.eq(user_id.as_uuid()))
            .select(RegistrationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Registration::from))
    }

    async fn insert_confirmed(
        &self,
        event_id: Uuid,
        user_id: &UserId,
    ) -> Result<Registration, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: RegistrationRow = diesel::insert_into(registrations::table)
            .values(NewRegistrationRow {
                id: Uuid::new_v4(),
                event_id,
                user_id: user_id.as_uuid(),
                status: RegistrationStatus::Confirmed.as_str().to_owned(),
            })
            .returning(RegistrationRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(row.into())
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: RegistrationStatus,
    ) -> Result<Registration, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: RegistrationRow = diesel::update(registrations::table.find(id))
            .set((
                registrations::status.eq(status.as_str()),
                registrations::updated_at.eq(Utc::now()),
            ))
            .returning(RegistrationRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(row.into())
    }

    async fn confirmed_count(&self, event_id: Uuid) -> Result<i64, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        registrations::table
            .filter(registrations::event_id.eq(event_id))
            .filter(registrations::status.eq(RegistrationStatus::Confirmed.as_str()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn attendees(&self, event_id: Uuid) -> Result<Vec<Attendee>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(RegistrationRow, UserRow)> = registrations::table
            .inner_join(users::table)
            .filter(registrations::event_id.eq(event_id))
            .filter(registrations::status.eq(RegistrationStatus::Confirmed.as_str()))
            .order(registrations::registered_at.asc())
            .select((RegistrationRow::as_select(), UserRow::as_select()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|(registration, user)| Attendee {
                registration: registration.into(),
                user: user.into(),
            })
            .collect())
    }

    async fn confirmed_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<RegistrationWithEvent>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(RegistrationRow, (EventRow, UserRow))> = registrations::table
            .inner_join(events::table.inner_join(users::table))
            .filter(registrations::user_id.eq(user_id.as_uuid()))
            .filter(registrations::status.eq(RegistrationStatus::Confirmed.as_str()))
            .order(registrations::registered_at.desc())
            .select((
                RegistrationRow::as_select(),
                (EventRow::as_select(), UserRow::as_select()),
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|(registration, (event, creator))| RegistrationWithEvent {
                registration: registration.into(),
                event: event.into(),
                creator: creator.into(),
            })
            .collect())
    }
}
