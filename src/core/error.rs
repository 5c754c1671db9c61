use thiserror::Error;

/// Errors raised while building a preference model or running a match
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchingError {
    #[error("Malformed input: {reason}")]
    MalformedInput { reason: String },

    #[error("Unequal group sizes: {proposers} proposers vs {reviewers} reviewers")]
    UnequalGroupSize { proposers: usize, reviewers: usize },

    #[error("No fixed point after {rounds} rounds (limit {limit})")]
    NonTermination { rounds: usize, limit: usize },

    #[error("Instance of size {size} exceeds the limit of {limit}")]
    InstanceTooLarge { size: usize, limit: usize },
}

impl MatchingError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            reason: reason.into(),
        }
    }
}
