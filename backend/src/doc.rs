//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct generating the OpenAPI specification for
//! the REST API: every HTTP endpoint from the inbound layer, the domain and
//! payload schemas they reference, and the bearer-token security scheme.
//! The generated document backs Swagger UI in debug builds.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::error::{Error, ErrorCode};
use crate::domain::event::{CoverImage, Event, EventStatus, LocationType};
use crate::domain::generation::{
    CandidateImage, GeneratedBanner, GeneratedEvent, GenerationResult, SuggestedLocation,
};
use crate::domain::preferences::{
    NotificationSettings, PreferredLocation, PrivacySettings, ProfileVisibility, UserPreferences,
};
use crate::domain::registration::{Registration, RegistrationStatus};
use crate::domain::user::UserSummary;
use crate::inbound::http::events::{
    CreateEventRequest, EventListResponse, EventResponse, Pagination, UpdateEventRequest,
};
use crate::inbound::http::generation::{GenerateBannerRequest, GenerateEventRequest};
use crate::inbound::http::preferences::PreferencesRequest;
use crate::inbound::http::registrations::{
    AttendeeResponse, EventWithCreatorBody, MyRegistrationResponse, RegistrationStatusResponse,
};
use crate::inbound::http::uploads::UploadResponse;

/// Enrich the generated document with the bearer-token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Identity-provider access token."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Eventora backend API",
        description = "HTTP interface for event management, registrations, user preferences, \
                       and AI-assisted event generation."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::events::create_event,
        crate::inbound::http::events::list_events,
        crate::inbound::http::events::get_event,
        crate::inbound::http::events::update_event,
        crate::inbound::http::events::delete_event,
        crate::inbound::http::registrations::register,
        crate::inbound::http::registrations::cancel,
        crate::inbound::http::registrations::attendees,
        crate::inbound::http::registrations::registration_status,
        crate::inbound::http::registrations::my_registrations,
        crate::inbound::http::preferences::get_preferences,
        crate::inbound::http::preferences::put_preferences,
        crate::inbound::http::preferences::delete_preferences,
        crate::inbound::http::generation::generate_event,
        crate::inbound::http::generation::generate_banner,
        crate::inbound::http::uploads::upload_image,
        crate::inbound::http::uploads::serve_upload,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Event,
        EventStatus,
        LocationType,
        CoverImage,
        UserSummary,
        Registration,
        RegistrationStatus,
        UserPreferences,
        NotificationSettings,
        PrivacySettings,
        ProfileVisibility,
        PreferredLocation,
        GenerationResult,
        GeneratedEvent,
        SuggestedLocation,
        CandidateImage,
        GeneratedBanner,
        CreateEventRequest,
        UpdateEventRequest,
        EventResponse,
        EventListResponse,
        Pagination,
        AttendeeResponse,
        MyRegistrationResponse,
        EventWithCreatorBody,
        RegistrationStatusResponse,
        PreferencesRequest,
        GenerateEventRequest,
        GenerateBannerRequest,
        UploadResponse,
    )),
    tags(
        (name = "events", description = "Event creation, discovery, and management"),
        (name = "registrations", description = "RSVPs and attendee lists"),
        (name = "preferences", description = "Per-user discovery preferences"),
        (name = "ai", description = "AI-assisted event generation"),
        (name = "health", description = "Health probes")
    )
)]
pub struct ApiDoc;
