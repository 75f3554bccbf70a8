//! User preference handlers.
//!
//! ```text
//! GET    /api/v1/users/me/preferences
//! PUT    /api/v1/users/me/preferences
//! DELETE /api/v1/users/me/preferences
//! ```

use actix_web::{HttpResponse, delete, get, put, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::preferences::{
    NotificationSettings, PreferencesUpsert, PreferredLocation, PrivacySettings, UserPreferences,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::missing_field;

/// Request payload for creating or replacing preferences.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PreferencesRequest {
    /// Interest categories; at least one is required.
    pub interests: Option<Vec<String>>,
    pub location: Option<PreferredLocation>,
    pub notification_settings: Option<NotificationSettings>,
    pub privacy_settings: Option<PrivacySettings>,
}

fn parse_interests(interests: Option<Vec<String>>) -> Result<Vec<String>, Error> {
    let interests: Vec<String> = interests
        .ok_or_else(|| missing_field("interests"))?
        .into_iter()
        .map(|interest| interest.trim().to_owned())
        .filter(|interest| !interest.is_empty())
        .collect();
    if interests.is_empty() {
        return Err(Error::invalid_request("at least one interest is required"));
    }
    Ok(interests)
}

/// Fetch the authenticated user's preferences. Serves a JSON `null` when
/// nothing has been saved yet.
#[utoipa::path(
    get,
    path = "/api/v1/users/me/preferences",
    responses(
        (status = 200, description = "Stored preferences, or null when none are saved", body = UserPreferences),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["preferences"],
    operation_id = "getPreferences"
)]
#[get("/users/me/preferences")]
pub async fn get_preferences(
    state: web::Data<HttpState>,
    auth: AuthContext,
) -> ApiResult<web::Json<Option<UserPreferences>>> {
    let user = auth.require_user()?;
    let preferences = state
        .preferences
        .fetch(&user.id)
        .await
        .map_err(Error::from)?;
    Ok(web::Json(preferences))
}

/// Create or replace the authenticated user's preferences.
#[utoipa::path(
    put,
    path = "/api/v1/users/me/preferences",
    request_body = PreferencesRequest,
    responses(
        (status = 200, description = "Stored preferences", body = UserPreferences),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["preferences"],
    operation_id = "putPreferences"
)]
#[put("/users/me/preferences")]
pub async fn put_preferences(
    state: web::Data<HttpState>,
    auth: AuthContext,
    payload: web::Json<PreferencesRequest>,
) -> ApiResult<web::Json<UserPreferences>> {
    let user = auth.require_user()?;
    let payload = payload.into_inner();
    let upsert = PreferencesUpsert {
        user_id: user.id,
        interests: parse_interests(payload.interests)?,
        location: payload.location,
        notification_settings: payload.notification_settings.unwrap_or_default(),
        privacy_settings: payload.privacy_settings.unwrap_or_default(),
    };
    let stored = state
        .preferences
        .upsert(&upsert)
        .await
        .map_err(Error::from)?;
    Ok(web::Json(stored))
}

/// Delete the authenticated user's preferences.
#[utoipa::path(
    delete,
    path = "/api/v1/users/me/preferences",
    responses(
        (status = 204, description = "Preferences deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "No preferences saved", body = Error)
    ),
    tags = ["preferences"],
    operation_id = "deletePreferences"
)]
#[delete("/users/me/preferences")]
pub async fn delete_preferences(
    state: web::Data<HttpState>,
    auth: AuthContext,
) -> ApiResult<HttpResponse> {
    let user = auth.require_user()?;
    let deleted = state
        .preferences
        .delete(&user.id)
        .await
        .map_err(Error::from)?;
    if deleted {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(Error::not_found("preferences not found"))
    }
}
