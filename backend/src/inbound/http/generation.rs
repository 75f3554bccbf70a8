//! AI generation handlers.
//!
//! ```text
//! POST /api/v1/ai/generate-event
//! POST /api/v1/ai/generate-banner
//! ```
//!
//! Both endpoints are usable without authentication so drafts can be
//! composed before signing in; nothing is persisted until the client
//! submits the draft through the events API.

use actix_web::{post, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::generation::{
    GeneratedBanner, GenerationResult, MAX_PROMPT_CHARS, MIN_PROMPT_CHARS, Prompt, PromptError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::missing_field;

/// Request payload for the full generation pipeline.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct GenerateEventRequest {
    /// Free-text description of the desired event.
    pub prompt: Option<String>,
}

/// Request payload for standalone banner generation.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct GenerateBannerRequest {
    /// Event title the banner is for.
    pub title: Option<String>,
    /// Optional event description to colour the image prompt.
    pub description: Option<String>,
    /// Optional style keywords.
    pub keywords: Option<Vec<String>>,
}

fn prompt_error(error: &PromptError, raw: &str) -> Error {
    let message = match error {
        PromptError::TooShort => {
            format!("prompt must be at least {MIN_PROMPT_CHARS} characters")
        }
        PromptError::TooLong => format!("prompt must be at most {MAX_PROMPT_CHARS} characters"),
    };
    Error::invalid_request(message).with_details(json!({
        "field": "prompt",
        "length": raw.trim().chars().count(),
        "code": "invalid_value",
    }))
}

fn parse_prompt(raw: Option<String>) -> Result<Prompt, Error> {
    let raw = raw.ok_or_else(|| missing_field("prompt"))?;
    Prompt::new(&raw).map_err(|error| prompt_error(&error, &raw))
}

/// Run the full pipeline: draft, candidate images, and banner.
#[utoipa::path(
    post,
    path = "/api/v1/ai/generate-event",
    request_body = GenerateEventRequest,
    responses(
        (status = 200, description = "Generated draft with imagery", body = GenerationResult),
        (status = 400, description = "Missing or out-of-range prompt", body = Error)
    ),
    tags = ["ai"],
    operation_id = "generateEvent"
)]
#[post("/ai/generate-event")]
pub async fn generate_event(
    state: web::Data<HttpState>,
    payload: web::Json<GenerateEventRequest>,
) -> ApiResult<web::Json<GenerationResult>> {
    let prompt = parse_prompt(payload.into_inner().prompt)?;
    let result = state.generation.generate_event(&prompt).await?;
    Ok(web::Json(result))
}

/// Generate a banner for an already-drafted event.
#[utoipa::path(
    post,
    path = "/api/v1/ai/generate-banner",
    request_body = GenerateBannerRequest,
    responses(
        (status = 200, description = "Base64-encoded banner image", body = GeneratedBanner),
        (status = 400, description = "Missing title", body = Error),
        (status = 503, description = "Image provider unavailable", body = Error)
    ),
    tags = ["ai"],
    operation_id = "generateBanner"
)]
#[post("/ai/generate-banner")]
pub async fn generate_banner(
    state: web::Data<HttpState>,
    payload: web::Json<GenerateBannerRequest>,
) -> ApiResult<web::Json<GeneratedBanner>> {
    let payload = payload.into_inner();
    let title = payload
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| missing_field("title"))?;
    let banner = state
        .generation
        .generate_banner(
            &title,
            payload.description.as_deref().unwrap_or_default(),
            &payload.keywords.unwrap_or_default(),
        )
        .await?;
    Ok(web::Json(banner))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::SourceError;
    use crate::inbound::http::test_utils::StateBuilder;
    use actix_web::http::StatusCode;
    use actix_web::App;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(None)]
    #[case(Some("too short".to_owned()))]
    #[case(Some("x".repeat(501)))]
    fn prompts_outside_the_limits_are_rejected(#[case] raw: Option<String>) {
        let error = parse_prompt(raw).expect_err("invalid prompt");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    fn prompt_length_is_reported_after_trimming() {
        let error = parse_prompt(Some("   short   ".to_owned())).expect_err("too short");
        assert_eq!(
            error
                .details()
                .and_then(|d| d.get("length"))
                .and_then(|v| v.as_u64()),
            Some(5)
        );
    }

    #[actix_web::test]
    async fn generate_event_serves_a_degraded_result_without_providers() {
        let mut builder = StateBuilder::default();
        builder.cache.expect_get_result().return_const(None);
        builder
            .drafter
            .expect_complete()
            .return_once(|_| Err(SourceError::timeout("down")));
        builder
            .images
            .expect_search()
            .return_once(|_, _| Err(SourceError::timeout("down")));
        builder
            .banners
            .expect_generate()
            .return_once(|_| Err(SourceError::timeout("down")));
        builder.cache.expect_put_result().return_const(());

        let app = actix_web::test::init_service(
            App::new()
                .app_data(builder.build())
                .service(web::scope("/api/v1").service(generate_event)),
        )
        .await;
        let req = actix_web::test::TestRequest::post()
            .uri("/api/v1/ai/generate-event")
            .set_json(json!({ "prompt": "a community hackathon in lisbon" }))
            .to_request();
        let res = actix_web::test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = actix_web::test::read_body_json(res).await;
        assert!(body.get("title").is_some());
        assert!(
            body.get("coverImages")
                .and_then(|v| v.as_array())
                .is_some_and(|images| !images.is_empty())
        );
        // The banner field is skipped entirely when generation failed.
        assert!(body.get("aiGeneratedBanner").is_none_or(|v| v.is_null()));
    }

    #[actix_web::test]
    async fn generate_banner_maps_provider_failure_to_503() {
        let mut builder = StateBuilder::default();
        builder.cache.expect_get_banner().return_const(None);
        builder
            .banners
            .expect_generate()
            .return_once(|_| Err(SourceError::rate_limited("429")));

        let app = actix_web::test::init_service(
            App::new()
                .app_data(builder.build())
                .service(web::scope("/api/v1").service(generate_banner)),
        )
        .await;
        let req = actix_web::test::TestRequest::post()
            .uri("/api/v1/ai/generate-banner")
            .set_json(json!({ "title": "Jazz Night" }))
            .to_request();
        let res = actix_web::test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[actix_web::test]
    async fn generate_banner_requires_a_title() {
        let app = actix_web::test::init_service(
            App::new()
                .app_data(StateBuilder::default().build())
                .service(web::scope("/api/v1").service(generate_banner)),
        )
        .await;
        let req = actix_web::test::TestRequest::post()
            .uri("/api/v1/ai/generate-banner")
            .set_json(json!({ "description": "no title" }))
            .to_request();
        let res = actix_web::test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
