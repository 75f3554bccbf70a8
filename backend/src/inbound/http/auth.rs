//! Bearer-token authentication extractor.
//!
//! Verification is delegated to the identity provider through the
//! [`TokenVerifier`] port. A verified identity is mirrored into the local
//! user directory on every authenticated request so event and registration
//! rows always have a user to join against.
//!
//! Extraction itself only fails on infrastructure errors; a missing or
//! rejected token produces an [`AuthContext`] variant, letting handlers with
//! optional authentication keep serving anonymous callers.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::{debug, warn};

use crate::domain::ports::TokenVerifier as _;
use crate::domain::{AuthenticatedUser, Error, UserId};
use crate::inbound::http::state::HttpState;

/// Authentication outcome for one request.
#[derive(Debug, Clone)]
pub enum AuthContext {
    /// No `Authorization: Bearer` header was sent.
    Anonymous,
    /// A token was sent but the provider rejected it.
    Rejected,
    /// The token was verified and the identity mirrored locally.
    User(AuthenticatedUser),
}

impl AuthContext {
    /// The verified identity, or an unauthorised error naming what failed.
    pub fn require_user(&self) -> Result<&AuthenticatedUser, Error> {
        match self {
            Self::User(user) => Ok(user),
            Self::Anonymous => Err(Error::unauthorized("authentication required")),
            Self::Rejected => Err(Error::unauthorized("invalid or expired token")),
        }
    }

    /// The verified user's identifier, if any.
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Self::User(user) => Some(user.id),
            _ => None,
        }
    }
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_owned)
}

impl FromRequest for AuthContext {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let token = bearer_token(req);
        Box::pin(async move {
            let Some(state) = state else {
                warn!("authentication attempted without HTTP state configured");
                return Err(Error::internal("server misconfigured"));
            };
            let Some(token) = token else {
                return Ok(Self::Anonymous);
            };
            match state.verifier.verify(&token).await {
                Ok(user) => {
                    state.users.upsert(&user).await?;
                    Ok(Self::User(user))
                }
                Err(error) => {
                    debug!(%error, "token verification failed");
                    Ok(Self::Rejected)
                }
            }
        })
    }
}
