//! PostgreSQL persistence adapters using Diesel.
//!
//! Thin adapters only: each repository translates between Diesel row structs
//! and domain types, with no business rules. Row structs and the schema are
//! private to this module. Connections come from a `bb8` pool over
//! `diesel-async`, so queries never block the runtime.

mod diesel_event_repository;
mod diesel_preferences_repository;
mod diesel_registration_repository;
mod diesel_user_directory;
mod error_mapping;
mod models;
mod pool;
mod schema;

pub use diesel_event_repository::DieselEventRepository;
pub use diesel_preferences_repository::DieselPreferencesRepository;
pub use diesel_registration_repository::DieselRegistrationRepository;
pub use diesel_user_directory::DieselUserDirectory;
pub use pool::{DbPool, PoolConfig, PoolError};
