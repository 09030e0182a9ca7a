// Inference backend boundary.
//
// Everything model-shaped happens on the far side of the InferenceBackend
// trait. The moderation code only ever sees `invoke(model, payload)` and a
// raw serde_json::Value back — which model host actually answers is a
// deployment detail.

pub mod traits;
pub mod workers_ai;

pub use traits::InferenceBackend;
pub use workers_ai::WorkersAiBackend;
