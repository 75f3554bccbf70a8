//! Shared request-validation helpers.
//!
//! Every rejection is an `invalid_request` domain error carrying structured
//! details naming the offending field, so clients can map failures onto form
//! inputs.

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::domain::Error;

pub(crate) fn missing_field(field: &'static str) -> Error {
    Error::invalid_request(format!("missing required field: {field}")).with_details(json!({
        "field": field,
        "code": "missing_field",
    }))
}

pub(crate) fn invalid_value(field: &'static str, value: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "value": value,
        "code": "invalid_value",
    }))
}

pub(crate) fn require(value: Option<String>, field: &'static str) -> Result<String, Error> {
    let value = value.ok_or_else(|| missing_field(field))?;
    if value.trim().is_empty() {
        return Err(invalid_value(field, &value, format!("{field} must not be blank")));
    }
    Ok(value)
}

pub(crate) fn parse_rfc3339(value: String, field: &'static str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(&value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| invalid_value(field, &value, format!("{field} must be an RFC 3339 timestamp")))
}

pub(crate) fn parse_optional_rfc3339(
    value: Option<String>,
    field: &'static str,
) -> Result<Option<DateTime<Utc>>, Error> {
    value.map(|raw| parse_rfc3339(raw, field)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    fn missing_field_names_the_field_in_details() {
        let error = missing_field("title");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        let details = error.details().expect("details");
        assert_eq!(details.get("field").and_then(|v| v.as_str()), Some("title"));
        assert_eq!(
            details.get("code").and_then(|v| v.as_str()),
            Some("missing_field")
        );
    }

    #[rstest]
    #[case(None)]
    #[case(Some("   ".to_owned()))]
    fn require_rejects_absent_and_blank_values(#[case] value: Option<String>) {
        assert!(require(value, "city").is_err());
    }

    #[rstest]
    fn parse_rfc3339_accepts_offsets_and_normalises_to_utc() {
        let parsed =
            parse_rfc3339("2026-09-01T18:00:00+02:00".to_owned(), "startTime").expect("parse");
        assert_eq!(parsed.to_rfc3339(), "2026-09-01T16:00:00+00:00");
    }

    #[rstest]
    fn parse_rfc3339_rejects_other_formats() {
        let error = parse_rfc3339("next tuesday".to_owned(), "startTime").expect_err("reject");
        let details = error.details().expect("details");
        assert_eq!(
            details.get("value").and_then(|v| v.as_str()),
            Some("next tuesday")
        );
    }
}
