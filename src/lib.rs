// Cinder: AI-assisted text moderation API
//
// This is the library root. Each module corresponds to a major subsystem
// of the moderation service: configuration, the inference backend boundary,
// the per-feature moderation logic, and the HTTP surface.

pub mod config;
pub mod inference;
pub mod moderation;
pub mod web;
