//! Reqwest-backed text-to-image banner adapter.
//!
//! Posts the banner prompt to a Hugging Face inference endpoint running
//! Stable Diffusion XL and returns the raw image bytes. Base64 encoding is a
//! service concern.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;
use tracing::debug;

use crate::domain::ports::{BannerGenerator, SourceError};

use super::super::http::{map_status_error, map_transport_error};

/// Image generation is slow; allow the model a full minute.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

/// Hugging Face inference client for banner generation.
pub struct HuggingFaceBanner {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl HuggingFaceBanner {
    /// Build a banner client against a model inference endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, api_key: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(DEFAULT_REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl BannerGenerator for HuggingFaceBanner {
    async fn generate(&self, prompt: &str) -> Result<Vec<u8>, SourceError> {
        debug!("requesting banner image generation");
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "image/png")
            .json(&InferenceRequest { inputs: prompt })
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        if body.is_empty() {
            return Err(SourceError::decode("inference returned an empty image"));
        }
        Ok(body.to_vec())
    }
}
