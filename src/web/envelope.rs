// Response envelopes — every caller-visible body is one of two shapes.
//
// Success: {success: true, data, metadata: {timestamp, processingTime, features}}
// Failure: {success: false, error: {code, message, details?}, timestamp}

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::error;

use crate::moderation::Feature;

/// Stable error codes surfaced in failure envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidRequest,
    MissingText,
    TextTooShort,
    TextTooLong,
    AiError,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidRequest => "INVALID_REQUEST",
            ErrorCode::MissingText => "MISSING_TEXT",
            ErrorCode::TextTooShort => "TEXT_TOO_SHORT",
            ErrorCode::TextTooLong => "TEXT_TOO_LONG",
            ErrorCode::AiError => "AI_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

/// Wrap moderation output in a success envelope, stamping the timestamp.
pub fn success(data: impl Serialize, processing_time_ms: u64, features: &[Feature]) -> Response {
    let body = json!({
        "success": true,
        "data": data,
        "metadata": {
            "timestamp": Utc::now().to_rfc3339(),
            "processingTime": processing_time_ms,
            "features": features,
        },
    });

    (
        StatusCode::OK,
        [(header::CACHE_CONTROL, "no-cache")],
        Json(body),
    )
        .into_response()
}

/// Wrap a failure in an error envelope.
pub fn error_with_details(
    code: ErrorCode,
    message: &str,
    status: StatusCode,
    details: Option<Value>,
) -> Response {
    let mut error = json!({
        "code": code.as_str(),
        "message": message,
    });
    if let Some(details) = details {
        error["details"] = details;
    }

    let body = json!({
        "success": false,
        "error": error,
        "timestamp": Utc::now().to_rfc3339(),
    });

    (status, Json(body)).into_response()
}

/// Error envelope without details.
pub fn error(code: ErrorCode, message: &str, status: StatusCode) -> Response {
    error_with_details(code, message, status, None)
}

/// Classify an orchestration failure at the request boundary.
///
/// There is no typed error channel out of the fan-out; inference-path
/// failures are recognized by their rendered message mentioning "AI" or
/// "model", everything else is the catch-all. The original message rides
/// along under details.originalError either way.
pub fn handle_error(err: &anyhow::Error) -> Response {
    let message = format!("{err:#}");
    error!(error = %message, "Moderation request failed");

    if message.contains("AI") || message.contains("model") {
        error_with_details(
            ErrorCode::AiError,
            "AI service temporarily unavailable",
            StatusCode::INTERNAL_SERVER_ERROR,
            Some(json!({ "originalError": message })),
        )
    } else {
        error_with_details(
            ErrorCode::InternalError,
            "An unexpected error occurred",
            StatusCode::INTERNAL_SERVER_ERROR,
            Some(json!({ "originalError": message })),
        )
    }
}
