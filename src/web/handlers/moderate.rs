// POST /api/moderate — the moderation endpoint.
//
// Validation failures come back as 400 envelopes before any model is
// invoked. A failure in any selected feature path fails the whole
// request; partial results never leak into a success body.

use axum::body::Bytes;
use axum::extract::State;
use axum::response::Response;
use serde::Serialize;

use crate::moderation::{resolve_features, ModerationResults};
use crate::web::envelope;
use crate::web::validation::validate_request;
use crate::web::AppState;

/// The success-envelope `data` payload: the input text echoed back plus
/// one key per executed feature.
#[derive(Serialize)]
struct ModerationData {
    text: String,
    #[serde(flatten)]
    results: ModerationResults,
}

/// POST /api/moderate — validate, fan out, wrap.
pub async fn moderate(State(state): State<AppState>, body: Bytes) -> Response {
    let request = match validate_request(&body, &state.config.limits) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let features = resolve_features(request.features.as_deref());
    let options = request.options.clone().unwrap_or_default();

    match state.moderator.run(&request.text, &features, &options).await {
        Ok(outcome) => envelope::success(
            ModerationData {
                text: request.text,
                results: outcome.results,
            },
            outcome.processing_time_ms,
            &features,
        ),
        Err(err) => envelope::handle_error(&err),
    }
}
