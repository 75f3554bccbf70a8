//! PostgreSQL-backed [`PreferencesRepository`] implementation.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde_json::to_value;

use crate::domain::ports::{PreferencesRepository, RepositoryError};
use crate::domain::preferences::{PreferencesUpsert, UserPreferences};
use crate::domain::user::UserId;

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewPreferencesRow, PreferencesRefresh, PreferencesRow};
use super::pool::DbPool;
use super::schema::user_preferences;

/// Diesel-backed preferences repository.
#[derive(Clone)]
pub struct DieselPreferencesRepository {
    pool: DbPool,
}

impl DieselPreferencesRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn encode_json<T: serde::Serialize>(value: &T, column: &'static str) -> Result<serde_json::Value, RepositoryError> {
    to_value(value).map_err(|error| {
        RepositoryError::query(format!("failed to encode {column}: {error}"))
    })
}

#[async_trait]
impl PreferencesRepository for DieselPreferencesRepository {
    async fn fetch(&self, user_id: &UserId) -> Result<Option<UserPreferences>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<PreferencesRow> = user_preferences::table
            .find(user_id.as_uuid())
            .select(PreferencesRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(UserPreferences::from))
    }

    async fn upsert(
        &self,
        upsert: &PreferencesUpsert,
    ) -> Result<UserPreferences, RepositoryError> {
        let location = upsert
            .location
            .as_ref()
            .map(|loc| encode_json(loc, "location"))
            .transpose()?;
        let notification_settings =
            encode_json(&upsert.notification_settings, "notification_settings")?;
        let privacy_settings = encode_json(&upsert.privacy_settings, "privacy_settings")?;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: PreferencesRow = diesel::insert_into(user_preferences::table)
            .values(NewPreferencesRow {
                user_id: upsert.user_id.as_uuid(),
                interests: upsert.interests.clone(),
                location: location.clone(),
                notification_settings: notification_settings.clone(),
                privacy_settings: privacy_settings.clone(),
            })
            .on_conflict(user_preferences::user_id)
            .do_update()
            .set(PreferencesRefresh {
                interests: upsert.interests.clone(),
                location,
                notification_settings,
                privacy_settings,
                updated_at: Utc::now(),
            })
            .returning(PreferencesRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(row.into())
    }

    async fn delete(&self, user_id: &UserId) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(user_preferences::table.find(user_id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
