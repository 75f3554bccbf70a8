//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use reqwest::Url;
use tracing::warn;

use crate::inbound::http::state::UploadConfig;
use crate::outbound::persistence::DbPool;

const DEFAULT_CHAT_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
const DEFAULT_PHOTO_BASE_URL: &str = "https://api.unsplash.com/";
const DEFAULT_BANNER_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/stabilityai/stable-diffusion-xl-base-1.0";
const DEFAULT_IDENTITY_BASE_URL: &str = "http://localhost:9999/";

/// Endpoints and credentials for the outbound providers.
///
/// Missing credentials are tolerated: provider calls fail and the generation
/// pipeline degrades to fallbacks, while token verification rejects every
/// request.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub chat_endpoint: Url,
    pub chat_api_key: String,
    pub photo_base_url: Url,
    pub photo_access_key: String,
    pub banner_endpoint: Url,
    pub banner_api_key: String,
    pub identity_base_url: Url,
    pub identity_service_key: String,
}

fn env_url(var: &str, default: &str) -> std::io::Result<Url> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_owned());
    Url::parse(&raw).map_err(|error| std::io::Error::other(format!("invalid {var}: {error}")))
}

fn env_key(var: &str) -> String {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => {
            warn!(var, "credential not set, dependent features will degrade");
            String::new()
        }
    }
}

impl ProviderSettings {
    /// Read provider settings from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error when a configured endpoint URL does not parse.
    pub fn from_env() -> std::io::Result<Self> {
        Ok(Self {
            chat_endpoint: env_url("GROQ_API_URL", DEFAULT_CHAT_ENDPOINT)?,
            chat_api_key: env_key("GROQ_API_KEY"),
            photo_base_url: env_url("UNSPLASH_API_URL", DEFAULT_PHOTO_BASE_URL)?,
            photo_access_key: env_key("UNSPLASH_ACCESS_KEY"),
            banner_endpoint: env_url("HUGGINGFACE_API_URL", DEFAULT_BANNER_ENDPOINT)?,
            banner_api_key: env_key("HUGGINGFACE_API_KEY"),
            identity_base_url: env_url("SUPABASE_URL", DEFAULT_IDENTITY_BASE_URL)?,
            identity_service_key: env_key("SUPABASE_SERVICE_KEY"),
        })
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) pool: DbPool,
    pub(crate) providers: ProviderSettings,
    pub(crate) uploads: UploadConfig,
}

impl ServerConfig {
    /// Construct a server configuration.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, pool: DbPool, providers: ProviderSettings) -> Self {
        Self {
            bind_addr,
            pool,
            providers,
            uploads: UploadConfig::default(),
        }
    }

    /// Override where uploaded images are stored and served from.
    #[must_use]
    pub fn with_uploads(mut self, uploads: UploadConfig) -> Self {
        self.uploads = uploads;
        self
    }

    /// The socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
