//! Reqwest-backed Unsplash photo search adapter.
//!
//! Queries `/search/photos` with landscape orientation and the high content
//! filter, and maps hits into domain candidate images. Failures surface as
//! [`SourceError`]; the service substitutes placeholders.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use crate::domain::generation::CandidateImage;
use crate::domain::ports::{ImageSearch, SourceError};

use super::super::http::{map_status_error, map_transport_error};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Unsplash search client.
pub struct UnsplashSearch {
    client: Client,
    base_url: Url,
    access_key: String,
}

impl UnsplashSearch {
    /// Build a search client against an Unsplash-compatible API base URL.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, access_key: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(DEFAULT_REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url,
            access_key: access_key.into(),
        })
    }

    fn search_url(&self) -> Result<Url, SourceError> {
        self.base_url
            .join("search/photos")
            .map_err(|error| SourceError::invalid_request(format!("bad search URL: {error}")))
    }
}

#[async_trait]
impl ImageSearch for UnsplashSearch {
    async fn search(&self, query: &str, count: u32) -> Result<Vec<CandidateImage>, SourceError> {
        debug!(query, count, "searching stock photos");
        let per_page = count.to_string();
        let response = self
            .client
            .get(self.search_url()?)
            .query(&[
                ("query", query),
                ("per_page", per_page.as_str()),
                ("orientation", "landscape"),
                ("content_filter", "high"),
            ])
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Client-ID {}", self.access_key),
            )
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        let decoded: SearchResponseDto = serde_json::from_slice(body.as_ref())
            .map_err(|error| SourceError::decode(format!("invalid search payload: {error}")))?;
        Ok(decoded.into_candidates(query))
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponseDto {
    #[serde(default)]
    results: Vec<PhotoDto>,
}

#[derive(Debug, Deserialize)]
struct PhotoDto {
    id: String,
    urls: PhotoUrlsDto,
    user: PhotoUserDto,
    alt_description: Option<String>,
    links: PhotoLinksDto,
}

#[derive(Debug, Deserialize)]
struct PhotoUrlsDto {
    regular: String,
    thumb: String,
}

#[derive(Debug, Deserialize)]
struct PhotoUserDto {
    name: String,
    links: PhotoUserLinksDto,
}

#[derive(Debug, Deserialize)]
struct PhotoUserLinksDto {
    html: String,
}

#[derive(Debug, Deserialize)]
struct PhotoLinksDto {
    download_location: String,
}

impl SearchResponseDto {
    fn into_candidates(self, query: &str) -> Vec<CandidateImage> {
        self.results
            .into_iter()
            .map(|photo| CandidateImage {
                id: photo.id,
                url: photo.urls.regular,
                thumb: photo.urls.thumb,
                photographer: photo.user.name,
                photographer_url: photo.user.links.html,
                alt: photo
                    .alt_description
                    .filter(|alt| !alt.trim().is_empty())
                    .unwrap_or_else(|| format!("Event image related to {query}")),
                download_url: photo.links.download_location,
            })
            .collect()
    }
}
