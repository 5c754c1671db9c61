use serde::{Deserialize, Serialize};

use crate::models::domain::{Matching, Pair, RoundTrace};

/// Response for the solve endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveResponse {
    pub pairs: Matching,
    pub rounds: usize,
    pub stable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<Vec<RoundTrace>>,
    #[serde(default)]
    pub cached: bool,
}

/// Response for the verify endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub stable: bool,
    #[serde(rename = "roguePair", default, skip_serializing_if = "Option::is_none")]
    pub rogue_pair: Option<Pair>,
}

/// Response for the enumerate endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumerateResponse {
    pub matchings: Vec<Matching>,
    pub count: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
