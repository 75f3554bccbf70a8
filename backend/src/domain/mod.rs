//! Domain types, ports, and services.
//!
//! Everything here is transport- and storage-agnostic: aggregates and value
//! types, the port traits outbound adapters implement, and the services that
//! apply the business rules over those ports. HTTP handlers call services;
//! services never see actix or diesel types.

pub mod error;
pub mod event;
pub mod event_service;
pub mod generation;
pub mod generation_service;
pub mod ports;
pub mod preferences;
pub mod registration;
pub mod registration_service;
pub mod user;

pub use self::error::{Error, ErrorCode};
pub use self::event_service::EventService;
pub use self::generation_service::GenerationService;
pub use self::registration_service::RegistrationService;
pub use self::user::{AuthenticatedUser, UserId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use backend::domain::{ApiResult, Error};
///
/// fn lookup() -> ApiResult<u32> {
///     Err(Error::not_found("no such thing"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
