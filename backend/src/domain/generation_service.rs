//! Orchestration of the AI event-generation pipeline.
//!
//! Flow: cache lookup → LLM draft → concurrent stock-photo search and banner
//! generation → merge → cache write. Every provider failure degrades rather
//! than failing the request: a missing draft becomes a deterministic
//! fallback, failed search becomes placeholder images, and a failed banner
//! becomes `None`. Only the standalone banner endpoint surfaces provider
//! failure to the client.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use tracing::{debug, warn};

use super::error::Error;
use super::generation::{
    BANNER_SOURCE, CandidateImage, GeneratedBanner, GeneratedEvent, GenerationResult, Prompt,
    banner_cache_key, banner_prompt, fallback_draft, parse_draft, placeholder_images,
};
use super::ports::{BannerGenerator, EventDrafter, GenerationCache, ImageSearch};

/// Number of candidate cover images requested per generation.
pub const COVER_IMAGE_COUNT: u32 = 5;

/// The AI generation pipeline service.
pub struct GenerationService {
    drafter: Arc<dyn EventDrafter>,
    images: Arc<dyn ImageSearch>,
    banners: Arc<dyn BannerGenerator>,
    cache: Arc<dyn GenerationCache>,
}

impl GenerationService {
    /// Assemble the pipeline from its provider ports.
    pub fn new(
        drafter: Arc<dyn EventDrafter>,
        images: Arc<dyn ImageSearch>,
        banners: Arc<dyn BannerGenerator>,
        cache: Arc<dyn GenerationCache>,
    ) -> Self {
        Self {
            drafter,
            images,
            banners,
            cache,
        }
    }

    /// Turn a prompt into a draft plus candidate images and optional banner.
    ///
    /// # Errors
    ///
    /// Currently infallible in practice: every provider failure has a
    /// degraded path. The signature stays fallible so callers are already
    /// prepared for stricter policies.
    pub async fn generate_event(&self, prompt: &Prompt) -> Result<GenerationResult, Error> {
        let key = prompt.cache_key();
        if let Some(hit) = self.cache.get_result(&key) {
            debug!(prompt = %prompt, "serving cached generation result");
            return Ok(hit);
        }

        let draft = self.draft_or_fallback(prompt).await;

        let query = draft.keywords.join(" ");
        let banner_text = banner_prompt(&draft.title, &draft.description, &draft.keywords);
        let (search_outcome, banner_outcome) = tokio::join!(
            self.images.search(&query, COVER_IMAGE_COUNT),
            self.banners.generate(&banner_text),
        );

        let cover_images = self.covers_or_placeholders(search_outcome, &draft);
        let ai_generated_banner = match banner_outcome {
            Ok(bytes) => Some(GeneratedBanner {
                image_data: BASE64.encode(bytes),
                prompt: banner_text,
                source: BANNER_SOURCE.to_owned(),
            }),
            Err(error) => {
                warn!(%error, "banner generation failed, continuing without banner");
                None
            }
        };

        let result = GenerationResult {
            draft,
            cover_images,
            ai_generated_banner,
        };
        self.cache.put_result(&key, result.clone());
        Ok(result)
    }

    /// Generate a banner for an already-drafted event.
    ///
    /// # Errors
    ///
    /// Returns a service-unavailable error when the provider fails; unlike
    /// the full pipeline there is nothing useful to degrade to here.
    pub async fn generate_banner(
        &self,
        title: &str,
        description: &str,
        keywords: &[String],
    ) -> Result<GeneratedBanner, Error> {
        let key = banner_cache_key(title);
        if let Some(hit) = self.cache.get_banner(&key) {
            debug!(title, "serving cached banner");
            return Ok(hit);
        }

        let prompt = banner_prompt(title, description, keywords);
        let bytes = self.banners.generate(&prompt).await.map_err(|error| {
            warn!(%error, title, "banner generation failed");
            Error::service_unavailable("banner generation is currently unavailable")
        })?;

        let banner = GeneratedBanner {
            image_data: BASE64.encode(bytes),
            prompt,
            source: BANNER_SOURCE.to_owned(),
        };
        self.cache.put_banner(&key, banner.clone());
        Ok(banner)
    }

    async fn draft_or_fallback(&self, prompt: &Prompt) -> GeneratedEvent {
        let now = Utc::now();
        match self.drafter.complete(prompt).await {
            Ok(text) => match parse_draft(&text, now) {
                Ok(draft) => draft,
                Err(error) => {
                    warn!(%error, "model response unusable, using fallback draft");
                    fallback_draft(prompt, now)
                }
            },
            Err(error) => {
                warn!(%error, "drafting provider failed, using fallback draft");
                fallback_draft(prompt, now)
            }
        }
    }

    fn covers_or_placeholders(
        &self,
        outcome: Result<Vec<CandidateImage>, super::ports::SourceError>,
        draft: &GeneratedEvent,
    ) -> Vec<CandidateImage> {
        let first_keyword = draft.keywords.first().map_or("event", String::as_str);
        match outcome {
            Ok(images) if !images.is_empty() => images,
            Ok(_) => {
                debug!("image search returned no results, using placeholders");
                placeholder_images(first_keyword, COVER_IMAGE_COUNT as usize)
            }
            Err(error) => {
                warn!(%error, "image search failed, using placeholders");
                placeholder_images(first_keyword, COVER_IMAGE_COUNT as usize)
            }
        }
    }
}
