//! PostgreSQL-backed [`UserDirectory`] implementation.
//!
//! Verified identities are mirrored locally so event and registration rows
//! can join against a creator. The upsert refreshes profile fields on every
//! authenticated request; the identity provider remains the source of truth.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RepositoryError, UserDirectory};
use crate::domain::user::AuthenticatedUser;

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserRefresh};
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed mirror of identity-provider accounts.
#[derive(Clone)]
pub struct DieselUserDirectory {
    pool: DbPool,
}

impl DieselUserDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for DieselUserDirectory {
    async fn upsert(&self, user: &AuthenticatedUser) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(users::table)
            .values(NewUserRow {
                id: user.id.as_uuid(),
                email: &user.email,
                display_name: &user.display_name,
                avatar_url: user.avatar_url.as_deref(),
            })
            .on_conflict(users::id)
            .do_update()
            .set(UserRefresh {
                email: &user.email,
                display_name: &user.display_name,
                avatar_url: user.avatar_url.as_deref(),
                updated_at: Utc::now(),
            })
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }
}
