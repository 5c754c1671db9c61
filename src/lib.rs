//! Stable Match - stable matching service built on Gale-Shapley deferred acceptance
//!
//! This library provides the preference model, the deferred-acceptance engine,
//! and a stability checker that verifies any candidate matching independently
//! of the engine.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    build_participants, is_stable, seeded_instance, MatchOutcome, MatchingError, PreferenceModel,
    StableMatcher,
};
pub use crate::models::{Matching, Pair, ParticipantId, PreferenceInstance, PreferenceMap};
