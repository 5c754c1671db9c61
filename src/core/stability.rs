use itertools::Itertools;

use crate::core::assignment::Assignment;
use crate::core::error::MatchingError;
use crate::core::preferences::PreferenceModel;
use crate::models::{Matching, Pair};

/// Largest instance the brute-force enumerators accept by default (8! = 40320 bijections)
pub const DEFAULT_ENUMERATION_LIMIT: usize = 8;

/// First rogue pair `(proposer, reviewer)` in proposer order, if any.
///
/// For each proposer only the reviewers it ranks above its own partner are
/// examined; anyone ranked lower cannot tempt it away.
pub fn find_rogue_pair(model: &PreferenceModel, assignment: &Assignment) -> Option<(usize, usize)> {
    for (proposer, partner) in assignment.pairs() {
        let suitor = model.proposer(proposer);
        let better = &suitor.preferences().as_slice()[..suitor.rank_of(partner)];

        for &reviewer in better {
            let current = assignment.proposer_of(reviewer);
            if model.reviewer(reviewer).prefers(proposer, current) {
                return Some((proposer, reviewer));
            }
        }
    }
    None
}

/// True if no rogue pair exists
pub fn is_stable(model: &PreferenceModel, assignment: &Assignment) -> bool {
    find_rogue_pair(model, assignment).is_none()
}

/// Id-level form of [`find_rogue_pair`].
///
/// # Errors
/// `MalformedInput` if `matching` is not a complete bijection over the
/// model's participants.
pub fn rogue_pair(model: &PreferenceModel, matching: &Matching) -> Result<Option<Pair>, MatchingError> {
    let assignment = Assignment::from_matching(model, matching)?;
    Ok(find_rogue_pair(model, &assignment).map(|(proposer, reviewer)| Pair {
        proposer: model.proposer(proposer).id().clone(),
        reviewer: model.reviewer(reviewer).id().clone(),
    }))
}

/// Id-level form of [`is_stable`]
pub fn is_matching_stable(model: &PreferenceModel, matching: &Matching) -> Result<bool, MatchingError> {
    Ok(rogue_pair(model, matching)?.is_none())
}

/// Every bijection of `n` proposers onto `n` reviewers, in lexicographic order
pub fn all_assignments(n: usize) -> impl Iterator<Item = Assignment> {
    (0..n)
        .permutations(n)
        .filter_map(Assignment::from_reviewers)
}

/// Every stable matching of `model`, found by checking all `n!` bijections.
///
/// # Errors
/// `InstanceTooLarge` if the model has more than `limit` participants per side.
pub fn all_stable_matchings(
    model: &PreferenceModel,
    limit: usize,
) -> Result<Vec<Assignment>, MatchingError> {
    if model.size() > limit {
        return Err(MatchingError::InstanceTooLarge {
            size: model.size(),
            limit,
        });
    }

    Ok(all_assignments(model.size())
        .filter(|assignment| is_stable(model, assignment))
        .collect())
}

/// True if `assignment` is stable and no other stable matching gives any
/// proposer a partner it ranks strictly higher.
pub fn is_proposer_optimal(
    model: &PreferenceModel,
    assignment: &Assignment,
    limit: usize,
) -> Result<bool, MatchingError> {
    if !is_stable(model, assignment) {
        return Ok(false);
    }

    let stable = all_stable_matchings(model, limit)?;
    Ok(stable.iter().all(|other| {
        other.pairs().all(|(proposer, reviewer)| {
            let suitor = model.proposer(proposer);
            suitor.rank_of(assignment.reviewer_of(proposer)) <= suitor.rank_of(reviewer)
        })
    }))
}
