//! Registration (RSVP) handlers.
//!
//! ```text
//! POST   /api/v1/events/{id}/register
//! DELETE /api/v1/events/{id}/register
//! GET    /api/v1/events/{id}/attendees
//! GET    /api/v1/events/{id}/registration-status
//! GET    /api/v1/registrations/me
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::event::Event;
use crate::domain::registration::{
    Attendee, AvailabilitySummary, Registration, RegistrationWithEvent,
};
use crate::domain::user::UserSummary;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthContext;
use crate::inbound::http::state::HttpState;

/// A confirmed attendee of an event.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeResponse {
    #[serde(flatten)]
    pub registration: Registration,
    pub user: UserSummary,
}

impl From<Attendee> for AttendeeResponse {
    fn from(value: Attendee) -> Self {
        Self {
            registration: value.registration,
            user: value.user,
        }
    }
}

/// A registration joined with its event for the "my registrations" view.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MyRegistrationResponse {
    #[serde(flatten)]
    pub registration: Registration,
    pub event: EventWithCreatorBody,
}

/// Event payload embedded in registration listings.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventWithCreatorBody {
    #[serde(flatten)]
    pub event: Event,
    pub creator: UserSummary,
}

impl From<RegistrationWithEvent> for MyRegistrationResponse {
    fn from(value: RegistrationWithEvent) -> Self {
        Self {
            registration: value.registration,
            event: EventWithCreatorBody {
                event: value.event,
                creator: value.creator,
            },
        }
    }
}

/// Capacity and registration state for one viewer.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationStatusResponse {
    pub is_registered: bool,
    pub is_full: bool,
    pub confirmed_count: i64,
    pub capacity: Option<i32>,
    pub available_spots: Option<i64>,
}

impl From<AvailabilitySummary> for RegistrationStatusResponse {
    fn from(value: AvailabilitySummary) -> Self {
        Self {
            is_registered: value.is_registered,
            is_full: value.is_full,
            confirmed_count: value.confirmed_count,
            capacity: value.capacity,
            available_spots: value.available_spots,
        }
    }
}

/// Register the authenticated user for an event.
///
/// Reviving a previously cancelled registration returns 200 rather than 201.
#[utoipa::path(
    post,
    path = "/api/v1/events/{id}/register",
    params(("id" = Uuid, Path, description = "Event identifier")),
    responses(
        (status = 201, description = "Registration created", body = Registration),
        (status = 200, description = "Cancelled registration reactivated", body = Registration),
        (status = 400, description = "Event not open, own event, or full", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Unknown event", body = Error),
        (status = 409, description = "Already registered", body = Error)
    ),
    tags = ["registrations"],
    operation_id = "registerForEvent"
)]
#[post("/events/{id}/register")]
pub async fn register(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let user = auth.require_user()?;
    let outcome = state
        .registrations
        .register(path.into_inner(), &user.id)
        .await?;
    let response = if outcome.reactivated {
        HttpResponse::Ok().json(outcome.registration)
    } else {
        HttpResponse::Created().json(outcome.registration)
    };
    Ok(response)
}

/// Cancel the authenticated user's registration.
#[utoipa::path(
    delete,
    path = "/api/v1/events/{id}/register",
    params(("id" = Uuid, Path, description = "Event identifier")),
    responses(
        (status = 200, description = "Registration cancelled", body = Registration),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "No confirmed registration", body = Error)
    ),
    tags = ["registrations"],
    operation_id = "cancelRegistration"
)]
#[delete("/events/{id}/register")]
pub async fn cancel(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<Registration>> {
    let user = auth.require_user()?;
    let cancelled = state
        .registrations
        .cancel(path.into_inner(), &user.id)
        .await?;
    Ok(web::Json(cancelled))
}

/// List confirmed attendees. Creator only.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}/attendees",
    params(("id" = Uuid, Path, description = "Event identifier")),
    responses(
        (status = 200, description = "Confirmed attendees", body = [AttendeeResponse]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not the creator", body = Error),
        (status = 404, description = "Unknown event", body = Error)
    ),
    tags = ["registrations"],
    operation_id = "listAttendees"
)]
#[get("/events/{id}/attendees")]
pub async fn attendees(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<Vec<AttendeeResponse>>> {
    let user = auth.require_user()?;
    let rows = state
        .registrations
        .attendees(path.into_inner(), &user.id)
        .await?;
    Ok(web::Json(rows.into_iter().map(AttendeeResponse::from).collect()))
}

/// Availability and the caller's registration state. Works anonymously.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}/registration-status",
    params(("id" = Uuid, Path, description = "Event identifier")),
    responses(
        (status = 200, description = "Availability summary", body = RegistrationStatusResponse),
        (status = 404, description = "Unknown event", body = Error)
    ),
    tags = ["registrations"],
    operation_id = "registrationStatus"
)]
#[get("/events/{id}/registration-status")]
pub async fn registration_status(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<RegistrationStatusResponse>> {
    let viewer = auth.user_id();
    let summary = state
        .registrations
        .availability(path.into_inner(), viewer.as_ref())
        .await?;
    Ok(web::Json(RegistrationStatusResponse::from(summary)))
}

/// The authenticated user's confirmed registrations, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/registrations/me",
    responses(
        (status = 200, description = "Confirmed registrations", body = [MyRegistrationResponse]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["registrations"],
    operation_id = "myRegistrations"
)]
#[get("/registrations/me")]
pub async fn my_registrations(
    state: web::Data<HttpState>,
    auth: AuthContext,
) -> ApiResult<web::Json<Vec<MyRegistrationResponse>>> {
    let user = auth.require_user()?;
    let rows = state.registrations.registrations_for_user(&user.id).await?;
    Ok(web::Json(
        rows.into_iter().map(MyRegistrationResponse::from).collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::{EventStatus, LocationType};
    use crate::domain::registration::RegistrationStatus;
    use crate::domain::user::UserId;
    use crate::inbound::http::test_utils::{StateBuilder, sample_user};
    use actix_web::http::StatusCode;
    use actix_web::http::header::AUTHORIZATION;
    use actix_web::{App, test};
    use chrono::{Duration, Utc};

    fn published_event(creator: UserId, capacity: Option<i32>) -> Event {
        let now = Utc::now();
        Event {
            id: Uuid::new_v4(),
            creator_id: creator,
            title: "Jazz Night".to_owned(),
            description: "An evening of jazz.".to_owned(),
            categories: vec!["music".to_owned()],
            cover_image: None,
            location_type: LocationType::Physical,
            address: None,
            city: "Porto".to_owned(),
            country: "Portugal".to_owned(),
            coordinates: None,
            virtual_link: None,
            start_time: now + Duration::days(2),
            end_time: now + Duration::days(2) + Duration::hours(3),
            timezone: "Europe/Lisbon".to_owned(),
            capacity,
            ticket_price: 10.0,
            status: EventStatus::Published,
            created_at: now,
            updated_at: now,
        }
    }

    fn confirmed_row(event_id: Uuid, user_id: UserId) -> Registration {
        let now = Utc::now();
        Registration {
            id: Uuid::new_v4(),
            event_id,
            user_id,
            status: RegistrationStatus::Confirmed,
            registered_at: now,
            updated_at: now,
        }
    }

    #[actix_web::test]
    async fn registering_returns_created_for_new_rows() {
        let user = sample_user();
        let event = published_event(UserId::random(), Some(10));
        let event_id = event.id;
        let mut builder = StateBuilder::default();
        builder.allow_user(user.clone());
        builder
            .events
            .expect_fetch_basic()
            .return_once(move |_| Ok(Some(event)));
        builder
            .registrations
            .expect_find()
            .return_once(|_, _| Ok(None));
        builder
            .registrations
            .expect_confirmed_count()
            .return_once(|_| Ok(0));
        let row = confirmed_row(event_id, user.id);
        builder
            .registrations
            .expect_insert_confirmed()
            .return_once(move |_, _| Ok(row));

        let app = test::init_service(
            App::new()
                .app_data(builder.build())
                .service(web::scope("/api/v1").service(register)),
        )
        .await;
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/events/{event_id}/register"))
            .insert_header((AUTHORIZATION, "Bearer token"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    #[actix_web::test]
    async fn duplicate_registration_conflicts() {
        let user = sample_user();
        let event = published_event(UserId::random(), None);
        let event_id = event.id;
        let mut builder = StateBuilder::default();
        builder.allow_user(user.clone());
        builder
            .events
            .expect_fetch_basic()
            .return_once(move |_| Ok(Some(event)));
        let existing = confirmed_row(event_id, user.id);
        builder
            .registrations
            .expect_find()
            .return_once(move |_, _| Ok(Some(existing)));

        let app = test::init_service(
            App::new()
                .app_data(builder.build())
                .service(web::scope("/api/v1").service(register)),
        )
        .await;
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/events/{event_id}/register"))
            .insert_header((AUTHORIZATION, "Bearer token"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn registration_status_serves_anonymous_viewers() {
        let event = published_event(UserId::random(), Some(5));
        let event_id = event.id;
        let mut builder = StateBuilder::default();
        builder
            .events
            .expect_fetch_basic()
            .return_once(move |_| Ok(Some(event)));
        builder
            .registrations
            .expect_confirmed_count()
            .return_once(|_| Ok(5));

        let app = test::init_service(
            App::new()
                .app_data(builder.build())
                .service(web::scope("/api/v1").service(registration_status)),
        )
        .await;
        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/events/{event_id}/registration-status"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body.get("isFull").and_then(|v| v.as_bool()), Some(true));
        assert_eq!(
            body.get("isRegistered").and_then(|v| v.as_bool()),
            Some(false)
        );
        assert_eq!(
            body.get("availableSpots").and_then(|v| v.as_i64()),
            Some(0)
        );
    }

    #[actix_web::test]
    async fn my_registrations_requires_authentication() {
        let app = test::init_service(
            App::new()
                .app_data(StateBuilder::default().build())
                .service(web::scope("/api/v1").service(my_registrations)),
        )
        .await;
        let req = test::TestRequest::get()
            .uri("/api/v1/registrations/me")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
