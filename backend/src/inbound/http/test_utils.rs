//! Shared fixtures for HTTP handler tests.

use std::sync::Arc;

use actix_web::web;

use crate::domain::ports::{
    EventRepository, MockBannerGenerator, MockEventDrafter, MockEventRepository,
    MockGenerationCache, MockImageSearch, MockPreferencesRepository, MockRegistrationRepository,
    MockTokenVerifier, MockUserDirectory, RegistrationRepository,
};
use crate::domain::{
    AuthenticatedUser, EventService, GenerationService, RegistrationService, UserId,
};
use crate::inbound::http::state::{HttpState, UploadConfig};

/// A verified identity for handler tests.
pub(crate) fn sample_user() -> AuthenticatedUser {
    AuthenticatedUser {
        id: UserId::random(),
        email: "ada@example.com".to_owned(),
        display_name: "Ada".to_owned(),
        avatar_url: None,
    }
}

/// Mock bundle assembled into an [`HttpState`] once expectations are set.
pub(crate) struct StateBuilder {
    pub events: MockEventRepository,
    pub registrations: MockRegistrationRepository,
    pub preferences: MockPreferencesRepository,
    pub users: MockUserDirectory,
    pub verifier: MockTokenVerifier,
    pub drafter: MockEventDrafter,
    pub images: MockImageSearch,
    pub banners: MockBannerGenerator,
    pub cache: MockGenerationCache,
    pub uploads: UploadConfig,
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self {
            events: MockEventRepository::new(),
            registrations: MockRegistrationRepository::new(),
            preferences: MockPreferencesRepository::new(),
            users: MockUserDirectory::new(),
            verifier: MockTokenVerifier::new(),
            drafter: MockEventDrafter::new(),
            images: MockImageSearch::new(),
            banners: MockBannerGenerator::new(),
            cache: MockGenerationCache::new(),
            uploads: UploadConfig::default(),
        }
    }
}

impl StateBuilder {
    /// Accept any bearer token as the given user and mirror it silently.
    pub(crate) fn allow_user(&mut self, user: AuthenticatedUser) {
        self.verifier
            .expect_verify()
            .returning(move |_| Ok(user.clone()));
        self.users.expect_upsert().returning(|_| Ok(()));
    }

    pub(crate) fn build(self) -> web::Data<HttpState> {
        let events: Arc<dyn EventRepository> = Arc::new(self.events);
        let registrations: Arc<dyn RegistrationRepository> = Arc::new(self.registrations);
        web::Data::new(HttpState {
            events: Arc::new(EventService::new(events.clone())),
            registrations: Arc::new(RegistrationService::new(events, registrations)),
            generation: Arc::new(GenerationService::new(
                Arc::new(self.drafter),
                Arc::new(self.images),
                Arc::new(self.banners),
                Arc::new(self.cache),
            )),
            preferences: Arc::new(self.preferences),
            users: Arc::new(self.users),
            verifier: Arc::new(self.verifier),
            uploads: Arc::new(self.uploads),
        })
    }
}
