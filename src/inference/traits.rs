// Inference backend trait — the swap-ready abstraction.
//
// One implementation talks to the Workers AI REST API; tests inject
// canned responses. The payload and result are deliberately untyped:
// each model family has its own request shape and notoriously loose
// response shape, and normalizing the latter is the moderation layer's
// whole job.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// The opaque capability that runs a named model against a payload.
/// Implementations must be async because providers are remote.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Run `model` with `payload`, returning the raw, unnormalized result.
    async fn invoke(&self, model: &str, payload: Value) -> Result<Value>;
}
