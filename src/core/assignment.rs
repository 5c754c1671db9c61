use crate::core::error::MatchingError;
use crate::core::preferences::PreferenceModel;
use crate::models::{Matching, Pair};

/// Complete one-to-one pairing of proposer indices with reviewer indices
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Assignment {
    reviewer_of: Vec<usize>,
    proposer_of: Vec<usize>,
}

impl Assignment {
    /// Build from a proposer -> reviewer table. Returns `None` unless the
    /// table is a permutation of `0..n`.
    pub fn from_reviewers(reviewer_of: Vec<usize>) -> Option<Self> {
        let n = reviewer_of.len();
        let mut proposer_of = vec![usize::MAX; n];

        for (proposer, &reviewer) in reviewer_of.iter().enumerate() {
            if reviewer >= n || proposer_of[reviewer] != usize::MAX {
                return None;
            }
            proposer_of[reviewer] = proposer;
        }

        Some(Self {
            reviewer_of,
            proposer_of,
        })
    }

    /// Resolve an id-level matching against `model`.
    ///
    /// # Errors
    /// `MalformedInput` unless every proposer and every reviewer of the model
    /// appears in exactly one pair.
    pub fn from_matching(model: &PreferenceModel, matching: &Matching) -> Result<Self, MatchingError> {
        let n = model.size();
        if matching.len() != n {
            return Err(MatchingError::malformed(format!(
                "matching has {} pairs, expected {}",
                matching.len(),
                n
            )));
        }

        let mut reviewer_of = vec![usize::MAX; n];
        for pair in matching.pairs() {
            let proposer = model.proposer_index(&pair.proposer).ok_or_else(|| {
                MatchingError::malformed(format!("unknown proposer {} in matching", pair.proposer))
            })?;
            let reviewer = model.reviewer_index(&pair.reviewer).ok_or_else(|| {
                MatchingError::malformed(format!("unknown reviewer {} in matching", pair.reviewer))
            })?;

            if reviewer_of[proposer] != usize::MAX {
                return Err(MatchingError::malformed(format!(
                    "proposer {} is matched more than once",
                    pair.proposer
                )));
            }
            reviewer_of[proposer] = reviewer;
        }

        Self::from_reviewers(reviewer_of)
            .ok_or_else(|| MatchingError::malformed("a reviewer is matched more than once"))
    }

    pub fn len(&self) -> usize {
        self.reviewer_of.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviewer_of.is_empty()
    }

    #[inline]
    pub fn reviewer_of(&self, proposer: usize) -> usize {
        self.reviewer_of[proposer]
    }

    #[inline]
    pub fn proposer_of(&self, reviewer: usize) -> usize {
        self.proposer_of[reviewer]
    }

    /// `(proposer, reviewer)` index pairs in proposer order
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.reviewer_of.iter().copied().enumerate()
    }

    pub fn to_matching(&self, model: &PreferenceModel) -> Matching {
        Matching::new(
            self.pairs()
                .map(|(proposer, reviewer)| Pair {
                    proposer: model.proposer(proposer).id().clone(),
                    reviewer: model.reviewer(reviewer).id().clone(),
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_reviewers_requires_permutation() {
        assert!(Assignment::from_reviewers(vec![1, 0, 2]).is_some());
        assert!(Assignment::from_reviewers(vec![1, 1, 2]).is_none());
        assert!(Assignment::from_reviewers(vec![0, 3, 1]).is_none());
    }

    #[test]
    fn test_inverse_lookup() {
        let assignment = Assignment::from_reviewers(vec![2, 0, 1]).unwrap();
        for (proposer, reviewer) in assignment.pairs() {
            assert_eq!(assignment.proposer_of(reviewer), proposer);
        }
        assert_eq!(assignment.len(), 3);
    }
}
