// Core algorithm exports
pub mod assignment;
pub mod engine;
pub mod error;
pub mod generator;
pub mod preferences;
pub mod stability;

pub use assignment::Assignment;
pub use engine::{round_limit, MatchOutcome, StableMatcher};
pub use error::MatchingError;
pub use generator::{random_instance, seeded_instance};
pub use preferences::{build_participants, Participant, PreferenceList, PreferenceModel, Rank};
pub use stability::{
    all_assignments, all_stable_matchings, find_rogue_pair, is_matching_stable, is_proposer_optimal,
    is_stable, rogue_pair, DEFAULT_ENUMERATION_LIMIT,
};
