//! Construction of the shared HTTP state from server configuration.

use std::sync::Arc;

use actix_web::web;

use crate::domain::{EventService, GenerationService, RegistrationService};
use crate::inbound::http::state::HttpState;
use crate::outbound::cache::InMemoryGenerationCache;
use crate::outbound::identity::SupabaseVerifier;
use crate::outbound::images::{HuggingFaceBanner, UnsplashSearch};
use crate::outbound::llm::GroqDrafter;
use crate::outbound::persistence::{
    DieselEventRepository, DieselPreferencesRepository, DieselRegistrationRepository,
    DieselUserDirectory,
};

use super::config::ServerConfig;

fn client_error(adapter: &str) -> impl FnOnce(reqwest::Error) -> std::io::Error + '_ {
    move |error| std::io::Error::other(format!("failed to build {adapter} client: {error}"))
}

/// Wire repositories, provider clients, and domain services into the state
/// shared by every request handler.
///
/// # Errors
///
/// Returns [`std::io::Error`] when an outbound HTTP client cannot be built.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let events: Arc<DieselEventRepository> =
        Arc::new(DieselEventRepository::new(config.pool.clone()));
    let registrations = Arc::new(DieselRegistrationRepository::new(config.pool.clone()));
    let preferences = Arc::new(DieselPreferencesRepository::new(config.pool.clone()));
    let users = Arc::new(DieselUserDirectory::new(config.pool.clone()));

    let providers = &config.providers;
    let drafter = GroqDrafter::new(
        providers.chat_endpoint.clone(),
        providers.chat_api_key.clone(),
    )
    .map_err(client_error("chat completion"))?;
    let images = UnsplashSearch::new(
        providers.photo_base_url.clone(),
        providers.photo_access_key.clone(),
    )
    .map_err(client_error("photo search"))?;
    let banners = HuggingFaceBanner::new(
        providers.banner_endpoint.clone(),
        providers.banner_api_key.clone(),
    )
    .map_err(client_error("banner generation"))?;
    let verifier = SupabaseVerifier::new(
        providers.identity_base_url.clone(),
        providers.identity_service_key.clone(),
    )
    .map_err(client_error("token verification"))?;

    let generation = GenerationService::new(
        Arc::new(drafter),
        Arc::new(images),
        Arc::new(banners),
        Arc::new(InMemoryGenerationCache::new()),
    );

    Ok(web::Data::new(HttpState {
        events: Arc::new(EventService::new(events.clone())),
        registrations: Arc::new(RegistrationService::new(events, registrations)),
        generation: Arc::new(generation),
        preferences,
        users,
        verifier: Arc::new(verifier),
        uploads: Arc::new(config.uploads.clone()),
    }))
}
