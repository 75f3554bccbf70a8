//! Reqwest-backed token verifier for the Supabase identity provider.
//!
//! Verifies a bearer token by asking the provider who it belongs to
//! (`GET /auth/v1/user`). The provider owns accounts; the backend only
//! mirrors the identity it reports.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::ports::{SourceError, TokenVerifier};
use crate::domain::user::{AuthenticatedUser, UserId};

use super::http::{map_status_error, map_transport_error};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Supabase auth client.
pub struct SupabaseVerifier {
    client: Client,
    base_url: Url,
    service_key: String,
}

impl SupabaseVerifier {
    /// Build a verifier against a Supabase project base URL.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, service_key: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(DEFAULT_REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url,
            service_key: service_key.into(),
        })
    }

    fn user_url(&self) -> Result<Url, SourceError> {
        self.base_url
            .join("auth/v1/user")
            .map_err(|error| SourceError::invalid_request(format!("bad auth URL: {error}")))
    }
}

#[async_trait]
impl TokenVerifier for SupabaseVerifier {
    async fn verify(&self, token: &str) -> Result<AuthenticatedUser, SourceError> {
        let response = self
            .client
            .get(self.user_url()?)
            .bearer_auth(token)
            .header("apikey", self.service_key.as_str())
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        let decoded: ProviderUserDto = serde_json::from_slice(body.as_ref())
            .map_err(|error| SourceError::decode(format!("invalid identity payload: {error}")))?;
        decoded.into_domain()
    }
}

#[derive(Debug, Deserialize)]
struct ProviderUserDto {
    id: Uuid,
    email: Option<String>,
    #[serde(default)]
    user_metadata: ProviderMetadataDto,
}

#[derive(Debug, Default, Deserialize)]
struct ProviderMetadataDto {
    name: Option<String>,
    avatar_url: Option<String>,
}

impl ProviderUserDto {
    fn into_domain(self) -> Result<AuthenticatedUser, SourceError> {
        let email = self
            .email
            .filter(|email| !email.trim().is_empty())
            .ok_or_else(|| SourceError::decode("identity payload missing email"))?;
        let display_name =
            AuthenticatedUser::display_name_or_mailbox(self.user_metadata.name, &email);
        Ok(AuthenticatedUser {
            id: UserId::from_uuid(self.id),
            email,
            display_name,
            avatar_url: self.user_metadata.avatar_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn decodes_a_full_identity_payload() {
        let body = r#"{
            "id": "7f6b9f3e-8d5f-4f2a-9a54-01f43a9c2bd1",
            "email": "ada@example.com",
            "user_metadata": { "name": "Ada", "avatar_url": "https://img.example/ada.png" }
        }"#;
        let decoded: ProviderUserDto = serde_json::from_str(body).expect("decode");
        let user = decoded.into_domain().expect("domain");
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.display_name, "Ada");
        assert_eq!(user.avatar_url.as_deref(), Some("https://img.example/ada.png"));
    }

    #[rstest]
    fn missing_metadata_falls_back_to_the_mailbox_name() {
        let body = r#"{
            "id": "7f6b9f3e-8d5f-4f2a-9a54-01f43a9c2bd1",
            "email": "ada@example.com"
        }"#;
        let decoded: ProviderUserDto = serde_json::from_str(body).expect("decode");
        let user = decoded.into_domain().expect("domain");
        assert_eq!(user.display_name, "ada");
        assert_eq!(user.avatar_url, None);
    }

    #[rstest]
    fn missing_email_is_a_decode_error() {
        let body = r#"{ "id": "7f6b9f3e-8d5f-4f2a-9a54-01f43a9c2bd1" }"#;
        let decoded: ProviderUserDto = serde_json::from_str(body).expect("decode");
        assert!(matches!(
            decoded.into_domain(),
            Err(SourceError::Decode { .. })
        ));
    }
}
