// Request validation — everything that can be rejected before any model
// gets invoked. Each failure is a complete 400 envelope; the happy path
// hands back a well-typed ModerationRequest.

use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;

use crate::config::Limits;
use crate::moderation::ModerationRequest;
use crate::web::envelope::{self, ErrorCode};

/// Validate a raw request body against the configured limits.
///
/// Checks run in order: JSON well-formedness, `text` presence and type,
/// length bounds (char counts), then full deserialization — so a typo'd
/// feature name is reported as INVALID_REQUEST rather than a serde
/// message leaking out.
pub fn validate_request(body: &[u8], limits: &Limits) -> Result<ModerationRequest, Response> {
    let value: Value = serde_json::from_slice(body).map_err(|_| {
        envelope::error(
            ErrorCode::InvalidRequest,
            "Invalid JSON in request body",
            StatusCode::BAD_REQUEST,
        )
    })?;

    let text = value.get("text").and_then(Value::as_str).ok_or_else(|| {
        envelope::error(
            ErrorCode::MissingText,
            "Text field is required and must be a string",
            StatusCode::BAD_REQUEST,
        )
    })?;

    let length = text.chars().count();

    if length < limits.min_text_length {
        return Err(envelope::error(
            ErrorCode::TextTooShort,
            &format!("Text must be at least {} characters", limits.min_text_length),
            StatusCode::BAD_REQUEST,
        ));
    }

    if length > limits.max_text_length {
        return Err(envelope::error(
            ErrorCode::TextTooLong,
            &format!("Text must not exceed {} characters", limits.max_text_length),
            StatusCode::BAD_REQUEST,
        ));
    }

    serde_json::from_value(value).map_err(|_| {
        envelope::error(
            ErrorCode::InvalidRequest,
            "Invalid request body",
            StatusCode::BAD_REQUEST,
        )
    })
}
