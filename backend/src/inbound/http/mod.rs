//! HTTP inbound adapter exposing the REST endpoints.

pub mod auth;
pub mod error;
pub mod events;
pub mod generation;
pub mod health;
pub mod preferences;
pub mod registrations;
pub mod state;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod uploads;
pub mod validation;

pub use error::ApiResult;
