use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::{unique_preferences, Pair, PreferenceMap};

/// Request to solve an instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveRequest {
    #[serde(deserialize_with = "unique_preferences")]
    pub proposers: PreferenceMap,
    #[serde(deserialize_with = "unique_preferences")]
    pub reviewers: PreferenceMap,
    /// Return the per-round trace alongside the matching
    #[serde(default)]
    pub verbose: bool,
}

/// Request to check a candidate matching against an instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyRequest {
    #[serde(deserialize_with = "unique_preferences")]
    pub proposers: PreferenceMap,
    #[serde(deserialize_with = "unique_preferences")]
    pub reviewers: PreferenceMap,
    pub pairs: Vec<Pair>,
}

/// Request to list every stable matching of a small instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumerateRequest {
    #[serde(deserialize_with = "unique_preferences")]
    pub proposers: PreferenceMap,
    #[serde(deserialize_with = "unique_preferences")]
    pub reviewers: PreferenceMap,
}

/// Request for a random instance
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GenerateRequest {
    #[validate(range(min = 1))]
    pub size: usize,
    #[serde(default)]
    pub seed: Option<u64>,
}
