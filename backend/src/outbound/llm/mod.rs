//! Reqwest-backed language-model drafting adapter.
//!
//! Talks to an OpenAI-compatible chat-completions endpoint (Groq in
//! production). The adapter owns transport only: it sends the drafting
//! prompt and returns the model's raw completion text; JSON recovery and
//! normalisation live in the domain.

mod dto;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::debug;

use crate::domain::generation::Prompt;
use crate::domain::ports::{EventDrafter, SourceError};

use super::http::{map_status_error, map_transport_error};
use dto::{ChatMessage, ChatRequest, ChatResponse};

const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 1500;
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Instruction wrapped around the user prompt. Asks for a bare JSON object;
/// the parser still copes when the model wraps it in fences or prose.
fn drafting_instructions(user_prompt: &str) -> String {
    format!(
        r#"You are an expert event planner. Based on the following user input, generate complete event details in JSON format.

User Input: "{user_prompt}"

Generate a JSON object with these fields:
{{
  "title": "Catchy, professional event title (max 80 characters)",
  "description": "Compelling 2-3 paragraph description highlighting what attendees will experience and learn (200-300 words)",
  "categories": ["primary category", "secondary category", "tertiary category"] (choose from: Technology, Business, Health, Education, Arts, Music, Sports, Food, Charity, Networking, Workshop, Conference, Festival, Meetup),
  "suggestedLocation": {{
    "city": "city name from prompt or most relevant city",
    "country": "country name",
    "locationType": "physical or virtual or hybrid based on context"
  }},
  "suggestedDate": "ISO date string 2-3 months from now if not specified",
  "estimatedDuration": number of hours (typical for this event type),
  "suggestedCapacity": realistic number based on event type,
  "keywords": ["5-7 visual keywords for finding relevant images: event type, theme, atmosphere, venue style"]
}}

Important:
- Be creative but professional
- Make descriptions engaging and benefit-focused
- Ensure keywords are specific and visual (for image search)
- If location not specified in prompt, suggest a major city relevant to the event type
- Keep tone professional yet exciting

Return ONLY the JSON object, no markdown formatting or explanations."#
    )
}

/// Chat-completions drafting client.
pub struct GroqDrafter {
    client: Client,
    endpoint: Url,
    api_key: String,
    model: String,
}

impl GroqDrafter {
    /// Build a drafter against a chat-completions endpoint.
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
            model: DEFAULT_MODEL.to_owned(),
        })
    }

    /// Override the model identifier.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl EventDrafter for GroqDrafter {
    async fn complete(&self, prompt: &Prompt) -> Result<String, SourceError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: drafting_instructions(prompt.as_str()),
            }],
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        };

        debug!(model = %self.model, "requesting event draft completion");
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        let decoded: ChatResponse = serde_json::from_slice(body.as_ref())
            .map_err(|error| SourceError::decode(format!("invalid completion payload: {error}")))?;
        decoded
            .first_content()
            .ok_or_else(|| SourceError::decode("completion contained no choices"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn instructions_embed_the_user_prompt() {
        let instructions = drafting_instructions("a rust meetup in Berlin");
        assert!(instructions.contains("User Input: \"a rust meetup in Berlin\""));
        assert!(instructions.contains("Return ONLY the JSON object"));
    }

    #[rstest]
    fn request_serialises_to_the_chat_completions_shape() {
        let request = ChatRequest {
            model: DEFAULT_MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: "hi".to_owned(),
            }],
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        };
        let value = serde_json::to_value(&request).expect("serialise");
        assert_eq!(value["model"], DEFAULT_MODEL);
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["max_tokens"], 1500);
    }

    #[rstest]
    fn response_decoding_extracts_the_first_choice() {
        let body = r#"{
            "choices": [
                { "message": { "role": "assistant", "content": "{\"title\":\"T\"}" } }
            ]
        }"#;
        let decoded: ChatResponse = serde_json::from_str(body).expect("decode");
        assert_eq!(decoded.first_content().as_deref(), Some("{\"title\":\"T\"}"));
    }

    #[rstest]
    fn empty_choice_list_yields_none() {
        let decoded: ChatResponse = serde_json::from_str(r#"{ "choices": [] }"#).expect("decode");
        assert_eq!(decoded.first_content(), None);
    }
}
