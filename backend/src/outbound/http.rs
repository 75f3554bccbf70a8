//! Shared transport and status mapping for provider adapters.
//!
//! Every provider client maps `reqwest` failures and non-success statuses
//! into [`SourceError`] the same way; the helpers live here so the mapping
//! stays consistent across Groq, Unsplash, Hugging Face, and Supabase.

use reqwest::StatusCode;

use crate::domain::ports::SourceError;

pub(crate) fn map_transport_error(error: reqwest::Error) -> SourceError {
    if error.is_timeout() {
        SourceError::timeout(error.to_string())
    } else {
        SourceError::transport(error.to_string())
    }
}

pub(crate) fn map_status_error(status: StatusCode, body: &[u8]) -> SourceError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), preview)
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SourceError::unauthorized(message),
        StatusCode::TOO_MANY_REQUESTS => SourceError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => SourceError::timeout(message),
        _ if status.is_client_error() => SourceError::invalid_request(message),
        _ => SourceError::transport(message),
    }
}

/// Compact a response body into a short single-line preview for error
/// messages and logs.
pub(crate) fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
