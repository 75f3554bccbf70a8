//! Event CRUD handlers.
//!
//! ```text
//! POST   /api/v1/events
//! GET    /api/v1/events
//! GET    /api/v1/events/{id}
//! PATCH  /api/v1/events/{id}
//! DELETE /api/v1/events/{id}
//! ```

use std::str::FromStr;

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::event::{
    CoverImage, Event, EventFilter, EventPage, EventPatch, EventSortKey, EventStatus,
    EventWithCreator, LocationType, NewEvent, SortOrder,
};
use crate::domain::user::UserSummary;
use crate::domain::{AuthenticatedUser, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    invalid_value, missing_field, parse_optional_rfc3339, parse_rfc3339, require,
};

/// Request payload for creating an event.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub categories: Option<Vec<String>>,
    pub cover_image: Option<CoverImage>,
    pub location_type: Option<LocationType>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub coordinates: Option<Value>,
    pub virtual_link: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub timezone: Option<String>,
    pub capacity: Option<i32>,
    pub ticket_price: Option<f64>,
    pub status: Option<EventStatus>,
}

/// Request payload for a partial event update.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub categories: Option<Vec<String>>,
    pub cover_image: Option<CoverImage>,
    pub location_type: Option<LocationType>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub coordinates: Option<Value>,
    pub virtual_link: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub timezone: Option<String>,
    pub capacity: Option<i32>,
    pub ticket_price: Option<f64>,
    pub status: Option<EventStatus>,
}

/// Query parameters for event listings.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase", default)]
pub struct ListEventsQuery {
    /// Substring match on title or description.
    pub search: Option<String>,
    /// Comma-separated category list; events sharing any category match.
    pub categories: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    /// RFC 3339 lower bound on start time.
    pub starts_after: Option<String>,
    /// RFC 3339 upper bound on start time.
    pub starts_before: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// physical, virtual, or hybrid.
    pub location_type: Option<String>,
    /// startTime, ticketPrice, or createdAt.
    pub sort_by: Option<String>,
    /// asc or desc.
    pub sort_order: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// An event with its creator's public summary.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventResponse {
    #[serde(flatten)]
    pub event: Event,
    pub creator: UserSummary,
}

impl From<EventWithCreator> for EventResponse {
    fn from(value: EventWithCreator) -> Self {
        Self {
            event: value.event,
            creator: value.creator,
        }
    }
}

impl EventResponse {
    fn with_creator(event: Event, user: &AuthenticatedUser) -> Self {
        Self {
            event,
            creator: UserSummary {
                id: user.id,
                display_name: user.display_name.clone(),
                email: user.email.clone(),
                avatar_url: user.avatar_url.clone(),
            },
        }
    }
}

/// Pagination metadata for listings.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: i64,
    pub has_more: bool,
}

/// One page of events.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventListResponse {
    pub events: Vec<EventResponse>,
    pub pagination: Pagination,
}

impl From<EventPage> for EventListResponse {
    fn from(page: EventPage) -> Self {
        let total_pages = if page.total == 0 {
            0
        } else {
            (page.total + i64::from(page.limit) - 1) / i64::from(page.limit)
        };
        Self {
            events: page.events.into_iter().map(EventResponse::from).collect(),
            pagination: Pagination {
                total: page.total,
                page: page.page,
                limit: page.limit,
                total_pages,
                has_more: i64::from(page.page) < total_pages,
            },
        }
    }
}

fn validate_window(
    start: chrono::DateTime<chrono::Utc>,
    end: chrono::DateTime<chrono::Utc>,
) -> Result<(), Error> {
    if end <= start {
        return Err(invalid_value(
            "endTime",
            &end.to_rfc3339(),
            "endTime must be after startTime",
        ));
    }
    Ok(())
}

fn validate_capacity(capacity: Option<i32>) -> Result<(), Error> {
    if let Some(value) = capacity
        && value <= 0
    {
        return Err(invalid_value(
            "capacity",
            &value.to_string(),
            "capacity must be a positive number",
        ));
    }
    Ok(())
}

fn validate_price(price: Option<f64>) -> Result<(), Error> {
    if let Some(value) = price
        && value < 0.0
    {
        return Err(invalid_value(
            "ticketPrice",
            &value.to_string(),
            "ticketPrice must not be negative",
        ));
    }
    Ok(())
}

fn parse_create(payload: CreateEventRequest, creator: &AuthenticatedUser) -> Result<NewEvent, Error> {
    let title = require(payload.title, "title")?;
    let description = require(payload.description, "description")?;
    let city = require(payload.city, "city")?;
    let country = require(payload.country, "country")?;
    let start_time = parse_rfc3339(
        payload.start_time.ok_or_else(|| missing_field("startTime"))?,
        "startTime",
    )?;
    let end_time = parse_rfc3339(
        payload.end_time.ok_or_else(|| missing_field("endTime"))?,
        "endTime",
    )?;
    validate_window(start_time, end_time)?;
    validate_capacity(payload.capacity)?;
    validate_price(payload.ticket_price)?;

    Ok(NewEvent {
        creator_id: creator.id,
        title,
        description,
        categories: payload.categories.unwrap_or_default(),
        cover_image: payload.cover_image,
        location_type: payload.location_type.unwrap_or_default(),
        address: payload.address,
        city,
        country,
        coordinates: payload.coordinates,
        virtual_link: payload.virtual_link,
        start_time,
        end_time,
        timezone: payload.timezone.unwrap_or_else(|| "UTC".to_owned()),
        capacity: payload.capacity,
        ticket_price: payload.ticket_price.unwrap_or(0.0),
        status: payload.status.unwrap_or_default(),
    })
}

fn parse_update(payload: UpdateEventRequest) -> Result<EventPatch, Error> {
    let start_time = parse_optional_rfc3339(payload.start_time, "startTime")?;
    let end_time = parse_optional_rfc3339(payload.end_time, "endTime")?;
    if let (Some(start), Some(end)) = (start_time, end_time) {
        validate_window(start, end)?;
    }
    validate_capacity(payload.capacity)?;
    validate_price(payload.ticket_price)?;

    Ok(EventPatch {
        title: payload.title,
        description: payload.description,
        categories: payload.categories,
        cover_image: payload.cover_image,
        location_type: payload.location_type,
        address: payload.address,
        city: payload.city,
        country: payload.country,
        coordinates: payload.coordinates,
        virtual_link: payload.virtual_link,
        start_time,
        end_time,
        timezone: payload.timezone,
        capacity: payload.capacity,
        ticket_price: payload.ticket_price,
        status: payload.status,
    })
}

fn parse_sort_key(value: &str) -> Result<EventSortKey, Error> {
    match value {
        "startTime" => Ok(EventSortKey::StartTime),
        "ticketPrice" => Ok(EventSortKey::TicketPrice),
        "createdAt" => Ok(EventSortKey::CreatedAt),
        other => Err(invalid_value(
            "sortBy",
            other,
            "sortBy must be startTime, ticketPrice, or createdAt",
        )),
    }
}

fn parse_sort_order(value: &str) -> Result<SortOrder, Error> {
    match value {
        "asc" => Ok(SortOrder::Asc),
        "desc" => Ok(SortOrder::Desc),
        other => Err(invalid_value("sortOrder", other, "sortOrder must be asc or desc")),
    }
}

fn parse_filter(query: ListEventsQuery) -> Result<EventFilter, Error> {
    let categories = query.categories.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_owned)
            .collect::<Vec<_>>()
    });
    let location_type = query
        .location_type
        .map(|raw| {
            LocationType::from_str(&raw).map_err(|_| {
                invalid_value(
                    "locationType",
                    &raw,
                    "locationType must be physical, virtual, or hybrid",
                )
            })
        })
        .transpose()?;
    let sort_by = query
        .sort_by
        .as_deref()
        .map(parse_sort_key)
        .transpose()?
        .unwrap_or_default();
    let sort_order = query
        .sort_order
        .as_deref()
        .map(parse_sort_order)
        .transpose()?
        .unwrap_or_default();

    let defaults = EventFilter::default();
    Ok(EventFilter {
        search: query.search.filter(|s| !s.trim().is_empty()),
        categories: categories.filter(|c| !c.is_empty()),
        city: query.city,
        country: query.country,
        starts_after: parse_optional_rfc3339(query.starts_after, "startsAfter")?,
        starts_before: parse_optional_rfc3339(query.starts_before, "startsBefore")?,
        min_price: query.min_price,
        max_price: query.max_price,
        location_type,
        status: EventStatus::Published,
        sort_by,
        sort_order,
        page: query.page.unwrap_or(defaults.page),
        limit: query.limit.unwrap_or(defaults.limit),
    })
}

/// Create an event owned by the authenticated user.
#[utoipa::path(
    post,
    path = "/api/v1/events",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = EventResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["events"],
    operation_id = "createEvent"
)]
#[post("/events")]
pub async fn create_event(
    state: web::Data<HttpState>,
    auth: AuthContext,
    payload: web::Json<CreateEventRequest>,
) -> ApiResult<HttpResponse> {
    let user = auth.require_user()?;
    let new_event = parse_create(payload.into_inner(), user)?;
    let created = state.events.create(new_event).await?;
    Ok(HttpResponse::Created().json(EventResponse::with_creator(created, user)))
}

/// List published events with filtering, sorting, and pagination.
#[utoipa::path(
    get,
    path = "/api/v1/events",
    params(ListEventsQuery),
    responses(
        (status = 200, description = "One page of events", body = EventListResponse),
        (status = 400, description = "Invalid filter", body = Error)
    ),
    tags = ["events"],
    operation_id = "listEvents"
)]
#[get("/events")]
pub async fn list_events(
    state: web::Data<HttpState>,
    query: web::Query<ListEventsQuery>,
) -> ApiResult<HttpResponse> {
    let filter = parse_filter(query.into_inner())?;
    let page = state.events.list(filter).await?;
    // Listings are public and cheap to reuse at the edge for a minute.
    Ok(HttpResponse::Ok()
        .insert_header((
            actix_web::http::header::CACHE_CONTROL,
            "public, s-maxage=60, stale-while-revalidate=120",
        ))
        .json(EventListResponse::from(page)))
}

/// Fetch one event with its creator.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}",
    params(("id" = Uuid, Path, description = "Event identifier")),
    responses(
        (status = 200, description = "The event", body = EventResponse),
        (status = 404, description = "Unknown event", body = Error)
    ),
    tags = ["events"],
    operation_id = "getEvent"
)]
#[get("/events/{id}")]
pub async fn get_event(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<EventResponse>> {
    let found = state.events.get(path.into_inner()).await?;
    Ok(web::Json(EventResponse::from(found)))
}

/// Apply a partial update to an event. Creator only.
#[utoipa::path(
    patch,
    path = "/api/v1/events/{id}",
    params(("id" = Uuid, Path, description = "Event identifier")),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Updated event", body = EventResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not the creator", body = Error),
        (status = 404, description = "Unknown event", body = Error)
    ),
    tags = ["events"],
    operation_id = "updateEvent"
)]
#[patch("/events/{id}")]
pub async fn update_event(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
    payload: web::Json<UpdateEventRequest>,
) -> ApiResult<web::Json<EventResponse>> {
    let user = auth.require_user()?;
    let patch = parse_update(payload.into_inner())?;
    let updated = state
        .events
        .update(path.into_inner(), &user.id, patch)
        .await?;
    Ok(web::Json(EventResponse::with_creator(updated, user)))
}

/// Delete an event. Creator only.
#[utoipa::path(
    delete,
    path = "/api/v1/events/{id}",
    params(("id" = Uuid, Path, description = "Event identifier")),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not the creator", body = Error),
        (status = 404, description = "Unknown event", body = Error)
    ),
    tags = ["events"],
    operation_id = "deleteEvent"
)]
#[delete("/events/{id}")]
pub async fn delete_event(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let user = auth.require_user()?;
    state.events.delete(path.into_inner(), &user.id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::user::UserId;
    use crate::inbound::http::test_utils::{StateBuilder, sample_user};
    use actix_web::http::StatusCode;
    use actix_web::http::header::AUTHORIZATION;
    use actix_web::App;
    use chrono::{Duration, Utc};
    use rstest::rstest;
    use serde_json::json;

    fn valid_create() -> CreateEventRequest {
        CreateEventRequest {
            title: Some("Rust Meetup".to_owned()),
            description: Some("Monthly meetup.".to_owned()),
            city: Some("Berlin".to_owned()),
            country: Some("Germany".to_owned()),
            start_time: Some("2026-10-01T18:00:00Z".to_owned()),
            end_time: Some("2026-10-01T20:00:00Z".to_owned()),
            ..CreateEventRequest::default()
        }
    }

    fn stored_event(creator: UserId) -> Event {
        let now = Utc::now();
        Event {
            id: Uuid::new_v4(),
            creator_id: creator,
            title: "Rust Meetup".to_owned(),
            description: "Monthly meetup.".to_owned(),
            categories: vec![],
            cover_image: None,
            location_type: LocationType::Physical,
            address: None,
            city: "Berlin".to_owned(),
            country: "Germany".to_owned(),
            coordinates: None,
            virtual_link: None,
            start_time: now + Duration::days(30),
            end_time: now + Duration::days(30) + Duration::hours(2),
            timezone: "UTC".to_owned(),
            capacity: None,
            ticket_price: 0.0,
            status: EventStatus::Published,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    #[case(CreateEventRequest { title: None, ..Default::default() }, "title")]
    #[case(
        CreateEventRequest {
            title: Some("T".into()),
            description: Some("D".into()),
            city: Some("C".into()),
            country: Some("X".into()),
            start_time: None,
            ..Default::default()
        },
        "startTime"
    )]
    fn create_rejects_missing_required_fields(
        #[case] payload: CreateEventRequest,
        #[case] field: &str,
    ) {
        let error = parse_create(payload, &sample_user()).expect_err("invalid");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            error
                .details()
                .and_then(|d| d.get("field"))
                .and_then(|v| v.as_str()),
            Some(field)
        );
    }

    #[rstest]
    fn create_rejects_inverted_time_windows() {
        let user = sample_user();
        let mut payload = valid_create();
        payload.end_time = Some("2026-10-01T17:00:00Z".to_owned());
        let error = parse_create(payload, &user).expect_err("inverted");
        assert_eq!(error.message(), "endTime must be after startTime");
    }

    #[rstest]
    #[case(Some(0))]
    #[case(Some(-5))]
    fn create_rejects_non_positive_capacity(#[case] capacity: Option<i32>) {
        let user = sample_user();
        let mut payload = valid_create();
        payload.capacity = capacity;
        assert!(parse_create(payload, &user).is_err());
    }

    #[rstest]
    fn create_applies_defaults() {
        let user = sample_user();
        let new_event = parse_create(valid_create(), &user).expect("valid");
        assert_eq!(new_event.location_type, LocationType::Physical);
        assert_eq!(new_event.status, EventStatus::Published);
        assert_eq!(new_event.timezone, "UTC");
        assert_eq!(new_event.ticket_price, 0.0);
    }

    #[rstest]
    fn filter_splits_categories_and_parses_enums() {
        let filter = parse_filter(ListEventsQuery {
            categories: Some("music, technology,,".to_owned()),
            location_type: Some("virtual".to_owned()),
            sort_by: Some("ticketPrice".to_owned()),
            sort_order: Some("desc".to_owned()),
            ..ListEventsQuery::default()
        })
        .expect("filter");
        assert_eq!(
            filter.categories,
            Some(vec!["music".to_owned(), "technology".to_owned()])
        );
        assert_eq!(filter.location_type, Some(LocationType::Virtual));
        assert_eq!(filter.sort_by, EventSortKey::TicketPrice);
        assert_eq!(filter.sort_order, SortOrder::Desc);
    }

    #[rstest]
    #[case(ListEventsQuery { sort_by: Some("price".into()), ..Default::default() })]
    #[case(ListEventsQuery { sort_order: Some("sideways".into()), ..Default::default() })]
    #[case(ListEventsQuery { location_type: Some("astral".into()), ..Default::default() })]
    #[case(ListEventsQuery { starts_after: Some("yesterday".into()), ..Default::default() })]
    fn filter_rejects_unknown_values(#[case] query: ListEventsQuery) {
        assert!(parse_filter(query).is_err());
    }

    #[rstest]
    #[case(0, 1, 6, 0, false)]
    #[case(13, 1, 6, 3, true)]
    #[case(12, 2, 6, 2, false)]
    fn pagination_rounds_total_pages_up(
        #[case] total: i64,
        #[case] page: u32,
        #[case] limit: u32,
        #[case] expected_pages: i64,
        #[case] expected_more: bool,
    ) {
        let response = EventListResponse::from(EventPage {
            events: vec![],
            total,
            page,
            limit,
        });
        assert_eq!(response.pagination.total_pages, expected_pages);
        assert_eq!(response.pagination.has_more, expected_more);
    }

    #[actix_web::test]
    async fn get_event_returns_the_joined_payload() {
        let creator = sample_user();
        let event = stored_event(creator.id);
        let event_id = event.id;
        let joined = EventWithCreator {
            event,
            creator: UserSummary {
                id: creator.id,
                display_name: creator.display_name.clone(),
                email: creator.email.clone(),
                avatar_url: None,
            },
        };
        let mut builder = StateBuilder::default();
        builder
            .events
            .expect_fetch()
            .withf(move |id| *id == event_id)
            .return_once(move |_| Ok(Some(joined)));

        let app = actix_web::test::init_service(
            App::new()
                .app_data(builder.build())
                .service(web::scope("/api/v1").service(get_event)),
        )
        .await;
        let req = actix_web::test::TestRequest::get()
            .uri(&format!("/api/v1/events/{event_id}"))
            .to_request();
        let res = actix_web::test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = actix_web::test::read_body_json(res).await;
        assert_eq!(
            body.get("id").and_then(|v| v.as_str()),
            Some(event_id.to_string().as_str())
        );
        assert!(body.get("creator").is_some());
    }

    #[actix_web::test]
    async fn create_event_requires_authentication() {
        let app = actix_web::test::init_service(
            App::new()
                .app_data(StateBuilder::default().build())
                .service(web::scope("/api/v1").service(create_event)),
        )
        .await;
        let req = actix_web::test::TestRequest::post()
            .uri("/api/v1/events")
            .set_json(json!({ "title": "T" }))
            .to_request();
        let res = actix_web::test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn update_by_a_stranger_is_forbidden() {
        let caller = sample_user();
        let mut builder = StateBuilder::default();
        builder.allow_user(caller);
        let owned_by_other = stored_event(UserId::random());
        let event_id = owned_by_other.id;
        builder
            .events
            .expect_fetch_basic()
            .return_once(move |_| Ok(Some(owned_by_other)));

        let app = actix_web::test::init_service(
            App::new()
                .app_data(builder.build())
                .service(web::scope("/api/v1").service(update_event)),
        )
        .await;
        let req = actix_web::test::TestRequest::patch()
            .uri(&format!("/api/v1/events/{event_id}"))
            .insert_header((AUTHORIZATION, "Bearer token"))
            .set_json(json!({ "title": "Hijacked" }))
            .to_request();
        let res = actix_web::test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
}
