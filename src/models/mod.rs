// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Matching, Pair, ParticipantId, PreferenceInstance, PreferenceMap, RoundTrace, Side};
pub use requests::{EnumerateRequest, GenerateRequest, SolveRequest, VerifyRequest};
pub use responses::{EnumerateResponse, ErrorResponse, HealthResponse, SolveResponse, VerifyResponse};
