//! Shared HTTP adapter state.
//!
//! Handlers accept this via `actix_web::web::Data` and depend only on domain
//! services and ports, so they stay testable with mocks and no I/O.

use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::ports::{PreferencesRepository, TokenVerifier, UserDirectory};
use crate::domain::{EventService, GenerationService, RegistrationService};

/// Where uploaded images are written and how they are served back.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Directory uploads are written into.
    pub directory: PathBuf,
    /// URL path prefix the directory is served under.
    pub public_path: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("uploads"),
            public_path: "/uploads".to_owned(),
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub events: Arc<EventService>,
    pub registrations: Arc<RegistrationService>,
    pub generation: Arc<GenerationService>,
    pub preferences: Arc<dyn PreferencesRepository>,
    pub users: Arc<dyn UserDirectory>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub uploads: Arc<UploadConfig>,
}
