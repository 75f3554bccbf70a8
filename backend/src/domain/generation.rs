//! AI event-generation types and the pure half of the pipeline.
//!
//! The language model returns free text that usually, but not always,
//! contains a JSON object. Everything defensive about that lives here:
//! stripping markdown code fences, extracting the outermost JSON object,
//! lenient deserialisation, and filling missing fields with deterministic
//! defaults. Transport concerns stay in the outbound adapters; the
//! orchestration lives in [`super::generation_service`].

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::event::LocationType;

/// Minimum accepted prompt length after trimming.
pub const MIN_PROMPT_CHARS: usize = 10;
/// Maximum accepted prompt length.
pub const MAX_PROMPT_CHARS: usize = 500;

/// Default categories when the model supplies none.
pub const DEFAULT_CATEGORIES: [&str; 3] = ["technology", "networking", "business"];
/// Default image-search keywords when the model supplies none.
pub const DEFAULT_KEYWORDS: [&str; 5] =
    ["event", "conference", "networking", "professional", "innovation"];
/// Default estimated duration in hours.
pub const DEFAULT_DURATION_HOURS: u32 = 4;
/// Default suggested capacity.
pub const DEFAULT_CAPACITY: u32 = 100;
/// Suggested date offset when the model supplies none.
pub const DEFAULT_DATE_OFFSET_DAYS: i64 = 90;

/// A validated generation prompt.
///
/// # Examples
/// ```
/// use backend::domain::generation::Prompt;
///
/// let prompt = Prompt::new("  Rust meetup in Berlin  ").expect("valid");
/// assert_eq!(prompt.as_str(), "Rust meetup in Berlin");
/// assert_eq!(prompt.cache_key(), "rust meetup in berlin");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt(String);

/// Why a prompt was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PromptError {
    /// Shorter than [`MIN_PROMPT_CHARS`] after trimming.
    #[error("prompt must be at least {MIN_PROMPT_CHARS} characters long")]
    TooShort,
    /// Longer than [`MAX_PROMPT_CHARS`].
    #[error("prompt must be at most {MAX_PROMPT_CHARS} characters long")]
    TooLong,
}

impl Prompt {
    /// Trim and validate a raw prompt.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError`] when the trimmed prompt falls outside
    /// `MIN_PROMPT_CHARS..=MAX_PROMPT_CHARS`.
    pub fn new(raw: &str) -> Result<Self, PromptError> {
        let trimmed = raw.trim();
        let chars = trimmed.chars().count();
        if chars < MIN_PROMPT_CHARS {
            return Err(PromptError::TooShort);
        }
        if chars > MAX_PROMPT_CHARS {
            return Err(PromptError::TooLong);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The validated prompt text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Cache key: the lowercased prompt.
    pub fn cache_key(&self) -> String {
        self.0.to_lowercase()
    }
}

impl std::fmt::Display for Prompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Suggested location for a generated event draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedLocation {
    /// Suggested city.
    pub city: String,
    /// Suggested country.
    pub country: String,
    /// Suggested location type.
    pub location_type: LocationType,
}

impl Default for SuggestedLocation {
    fn default() -> Self {
        Self {
            city: "San Francisco".to_owned(),
            country: "USA".to_owned(),
            location_type: LocationType::Physical,
        }
    }
}

/// A normalised event draft produced by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedEvent {
    /// Draft title.
    pub title: String,
    /// Draft description.
    pub description: String,
    /// Draft categories; never empty after normalisation.
    pub categories: Vec<String>,
    /// Suggested location.
    pub suggested_location: SuggestedLocation,
    /// Suggested start instant.
    pub suggested_date: DateTime<Utc>,
    /// Estimated duration in hours.
    pub estimated_duration_hours: u32,
    /// Suggested capacity.
    pub suggested_capacity: u32,
    /// Visual keywords for image search; never empty after normalisation.
    pub keywords: Vec<String>,
}

/// A candidate cover image from stock-photo search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CandidateImage {
    /// Provider image identifier.
    pub id: String,
    /// Display-quality image URL.
    pub url: String,
    /// Thumbnail URL.
    pub thumb: String,
    /// Photographer attribution name.
    pub photographer: String,
    /// Photographer attribution link.
    pub photographer_url: String,
    /// Accessible alternative text.
    pub alt: String,
    /// Provider download-tracking URL; empty for placeholders.
    pub download_url: String,
}

/// An AI-generated banner image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedBanner {
    /// Base64-encoded image bytes.
    pub image_data: String,
    /// The text-to-image prompt used.
    pub prompt: String,
    /// Provider/model tag for attribution.
    pub source: String,
}

/// Provider/model tag attached to generated banners.
pub const BANNER_SOURCE: &str = "huggingface-sdxl";

/// Full pipeline output: draft, candidate covers, optional banner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    /// Normalised draft.
    #[serde(flatten)]
    pub draft: GeneratedEvent,
    /// Candidate cover images (search results or placeholders).
    pub cover_images: Vec<CandidateImage>,
    /// AI banner, when generation succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_generated_banner: Option<GeneratedBanner>,
}

/// Why a model response could not be turned into a draft.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftParseError {
    /// The response contained no JSON object at all.
    #[error("no JSON object found in model response")]
    NoJsonObject,
    /// The extracted object was not valid JSON.
    #[error("model response contained malformed JSON: {0}")]
    MalformedJson(String),
    /// The object parsed but lacked a usable title or description.
    #[error("model response missing required field: {0}")]
    MissingField(&'static str),
}

/// Lenient wire shape for the model's JSON object. Every field is optional;
/// [`parse_draft`] fills the gaps.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDraft {
    title: Option<String>,
    description: Option<String>,
    #[serde(default)]
    categories: Vec<String>,
    suggested_location: Option<RawLocation>,
    suggested_date: Option<String>,
    estimated_duration: Option<u32>,
    suggested_capacity: Option<u32>,
    #[serde(default)]
    keywords: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLocation {
    city: Option<String>,
    country: Option<String>,
    location_type: Option<String>,
}

/// Strip Markdown code fences (```json ... ```) from a model response.
fn strip_code_fences(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Extract the outermost JSON object from free text.
///
/// Takes the slice between the first `{` and the last `}`. This mirrors the
/// greedy-match recovery the provider responses need when the model wraps
/// its JSON in prose.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    text.get(start..=end)
}

/// Parse a raw model response into a normalised draft.
///
/// `now` anchors the default suggested date so callers (and tests) control
/// the clock.
///
/// # Errors
///
/// Returns [`DraftParseError`] when no JSON object can be recovered or the
/// recovered object lacks a title or description.
pub fn parse_draft(response: &str, now: DateTime<Utc>) -> Result<GeneratedEvent, DraftParseError> {
    let cleaned = strip_code_fences(response);
    let object = extract_json_object(&cleaned).ok_or(DraftParseError::NoJsonObject)?;
    let raw: RawDraft = serde_json::from_str(object)
        .map_err(|err| DraftParseError::MalformedJson(err.to_string()))?;
    normalise_draft(raw, now)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

fn normalise_draft(raw: RawDraft, now: DateTime<Utc>) -> Result<GeneratedEvent, DraftParseError> {
    let title = non_blank(raw.title).ok_or(DraftParseError::MissingField("title"))?;
    let description =
        non_blank(raw.description).ok_or(DraftParseError::MissingField("description"))?;

    let categories = if raw.categories.iter().any(|c| !c.trim().is_empty()) {
        raw.categories
            .into_iter()
            .filter(|c| !c.trim().is_empty())
            .collect()
    } else {
        DEFAULT_CATEGORIES.map(str::to_owned).to_vec()
    };

    let keywords = if raw.keywords.iter().any(|k| !k.trim().is_empty()) {
        raw.keywords
            .into_iter()
            .filter(|k| !k.trim().is_empty())
            .collect()
    } else {
        DEFAULT_KEYWORDS.map(str::to_owned).to_vec()
    };

    let suggested_location = raw
        .suggested_location
        .map(|loc| {
            let defaults = SuggestedLocation::default();
            SuggestedLocation {
                city: non_blank(loc.city).unwrap_or(defaults.city),
                country: non_blank(loc.country).unwrap_or(defaults.country),
                location_type: loc
                    .location_type
                    .and_then(|raw_type| raw_type.parse().ok())
                    .unwrap_or(defaults.location_type),
            }
        })
        .unwrap_or_default();

    let suggested_date = raw
        .suggested_date
        .as_deref()
        .and_then(|raw_date| DateTime::parse_from_rfc3339(raw_date).ok())
        .map(|date| date.with_timezone(&Utc))
        .unwrap_or_else(|| now + Duration::days(DEFAULT_DATE_OFFSET_DAYS));

    Ok(GeneratedEvent {
        title,
        description,
        categories,
        suggested_location,
        suggested_date,
        estimated_duration_hours: raw
            .estimated_duration
            .filter(|&hours| hours > 0)
            .unwrap_or(DEFAULT_DURATION_HOURS),
        suggested_capacity: raw
            .suggested_capacity
            .filter(|&capacity| capacity > 0)
            .unwrap_or(DEFAULT_CAPACITY),
        keywords,
    })
}

/// Deterministic draft used when the language model is unavailable.
///
/// The request still succeeds; the description tells the user the draft is a
/// fallback so they can retry or edit by hand.
pub fn fallback_draft(prompt: &Prompt, now: DateTime<Utc>) -> GeneratedEvent {
    let mut title_source = prompt.as_str().chars().take(50).collect::<String>();
    if prompt.as_str().chars().count() > 50 {
        title_source.push_str("...");
    }
    GeneratedEvent {
        title: format!("Event: {title_source}"),
        description: format!(
            "A draft generated from your prompt: \"{}\". The AI drafting service was \
             unavailable, so these details are placeholders; please review and edit them.",
            prompt.as_str()
        ),
        categories: DEFAULT_CATEGORIES.map(str::to_owned).to_vec(),
        suggested_location: SuggestedLocation::default(),
        suggested_date: now + Duration::days(DEFAULT_DATE_OFFSET_DAYS),
        estimated_duration_hours: DEFAULT_DURATION_HOURS,
        suggested_capacity: DEFAULT_CAPACITY,
        keywords: DEFAULT_KEYWORDS.map(str::to_owned).to_vec(),
    }
}

/// Placeholder cover images used when stock-photo search fails.
///
/// Uses the provider's keyless source URLs so the frontend still renders
/// something visual.
pub fn placeholder_images(keyword: &str, count: usize) -> Vec<CandidateImage> {
    let keyword = if keyword.trim().is_empty() {
        "event"
    } else {
        keyword.trim()
    };
    (0..count)
        .map(|index| CandidateImage {
            id: format!("placeholder-{index}"),
            url: format!("https://source.unsplash.com/1200x600/?{keyword},event"),
            thumb: format!("https://source.unsplash.com/400x300/?{keyword},event"),
            photographer: "Unsplash".to_owned(),
            photographer_url: "https://unsplash.com".to_owned(),
            alt: format!("{keyword} event"),
            download_url: String::new(),
        })
        .collect()
}

/// Build the text-to-image prompt for a banner.
pub fn banner_prompt(title: &str, description: &str, keywords: &[String]) -> String {
    let summary = description.chars().take(100).collect::<String>();
    let themes = keywords
        .iter()
        .take(3)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Professional event banner for \"{title}\". {summary}. Modern, vibrant, high-quality \
         digital art, professional design, {themes}, landscape orientation, no text"
    )
}

/// Cache key for a banner, namespaced away from draft keys.
pub fn banner_cache_key(title: &str) -> String {
    format!("banner:{}", title.trim().to_lowercase())
}
