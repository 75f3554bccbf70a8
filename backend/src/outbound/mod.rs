//! Outbound adapters implementing the domain ports.

pub mod cache;
mod http;
pub mod identity;
pub mod images;
pub mod llm;
pub mod persistence;
