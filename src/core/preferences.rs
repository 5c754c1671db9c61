use std::collections::HashMap;

use crate::core::error::MatchingError;
use crate::models::{ParticipantId, PreferenceInstance, PreferenceMap, Side};

/// A participant's ranking of the opposite group, most preferred first.
///
/// Entries are indices into the opposite group of the owning
/// [`PreferenceModel`]. Always an exact permutation of `0..n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceList(Vec<usize>);

impl PreferenceList {
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entry at `position`, 0 being the favourite
    pub fn get(&self, position: usize) -> Option<usize> {
        self.0.get(position).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }
}

/// Inverse of a [`PreferenceList`]: opposite-group index -> position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rank(Vec<usize>);

impl Rank {
    fn from_list(list: &PreferenceList) -> Self {
        let mut positions = vec![0; list.len()];
        for (position, other) in list.iter().enumerate() {
            positions[other] = position;
        }
        Self(positions)
    }

    #[inline]
    pub fn of(&self, other: usize) -> usize {
        self.0[other]
    }

    /// True if `a` is ranked strictly above `b`
    #[inline]
    pub fn prefers(&self, a: usize, b: usize) -> bool {
        self.of(a) < self.of(b)
    }
}

/// A member of either group together with its immutable ranking
#[derive(Debug, Clone)]
pub struct Participant {
    id: ParticipantId,
    side: Side,
    preferences: PreferenceList,
    rank: Rank,
}

impl Participant {
    fn new(id: ParticipantId, side: Side, preferences: PreferenceList) -> Self {
        let rank = Rank::from_list(&preferences);
        Self {
            id,
            side,
            preferences,
            rank,
        }
    }

    pub fn id(&self) -> &ParticipantId {
        &self.id
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn preferences(&self) -> &PreferenceList {
        &self.preferences
    }

    pub fn rank(&self) -> &Rank {
        &self.rank
    }

    /// Position of `other` in this participant's full list
    #[inline]
    pub fn rank_of(&self, other: usize) -> usize {
        self.rank.of(other)
    }

    #[inline]
    pub fn prefers(&self, a: usize, b: usize) -> bool {
        self.rank.prefers(a, b)
    }
}

/// Validated two-sided preference model.
///
/// Participants are indexed in id order on each side, so two models built
/// from the same maps are identical.
#[derive(Debug, Clone)]
pub struct PreferenceModel {
    proposers: Vec<Participant>,
    reviewers: Vec<Participant>,
    proposer_index: HashMap<ParticipantId, usize>,
    reviewer_index: HashMap<ParticipantId, usize>,
}

/// Build both groups from raw preference maps.
///
/// # Errors
/// `UnequalGroupSize` when the maps differ in length, `MalformedInput` when a
/// list is not an exact permutation of the opposite group's keys or an id
/// appears in both groups.
pub fn build_participants(
    proposer_prefs: &PreferenceMap,
    reviewer_prefs: &PreferenceMap,
) -> Result<PreferenceModel, MatchingError> {
    PreferenceModel::build(proposer_prefs, reviewer_prefs)
}

impl PreferenceModel {
    pub fn build(
        proposer_prefs: &PreferenceMap,
        reviewer_prefs: &PreferenceMap,
    ) -> Result<Self, MatchingError> {
        if proposer_prefs.len() != reviewer_prefs.len() {
            return Err(MatchingError::UnequalGroupSize {
                proposers: proposer_prefs.len(),
                reviewers: reviewer_prefs.len(),
            });
        }

        let proposer_index = index_by_id(proposer_prefs);
        let reviewer_index = index_by_id(reviewer_prefs);

        if let Some(shared) = proposer_prefs.keys().find(|id| reviewer_index.contains_key(*id)) {
            return Err(MatchingError::malformed(format!(
                "{} appears as both a proposer and a reviewer",
                shared
            )));
        }

        let proposers = resolve_group(proposer_prefs, Side::Proposer, &reviewer_index)?;
        let reviewers = resolve_group(reviewer_prefs, Side::Reviewer, &proposer_index)?;

        Ok(Self {
            proposers,
            reviewers,
            proposer_index,
            reviewer_index,
        })
    }

    pub fn from_instance(instance: &PreferenceInstance) -> Result<Self, MatchingError> {
        Self::build(&instance.proposers, &instance.reviewers)
    }

    /// Participants per side
    pub fn size(&self) -> usize {
        self.proposers.len()
    }

    pub fn proposers(&self) -> &[Participant] {
        &self.proposers
    }

    pub fn reviewers(&self) -> &[Participant] {
        &self.reviewers
    }

    #[inline]
    pub fn proposer(&self, index: usize) -> &Participant {
        &self.proposers[index]
    }

    #[inline]
    pub fn reviewer(&self, index: usize) -> &Participant {
        &self.reviewers[index]
    }

    pub fn proposer_index(&self, id: &ParticipantId) -> Option<usize> {
        self.proposer_index.get(id).copied()
    }

    pub fn reviewer_index(&self, id: &ParticipantId) -> Option<usize> {
        self.reviewer_index.get(id).copied()
    }

    /// Position of `other` in `participant`'s original preference list.
    ///
    /// `participant` may belong to either group; `other` must belong to the
    /// opposite one.
    pub fn rank(
        &self,
        participant: &ParticipantId,
        other: &ParticipantId,
    ) -> Result<usize, MatchingError> {
        let (owner, opposite) = if let Some(&p) = self.proposer_index.get(participant) {
            (&self.proposers[p], &self.reviewer_index)
        } else if let Some(&r) = self.reviewer_index.get(participant) {
            (&self.reviewers[r], &self.proposer_index)
        } else {
            return Err(MatchingError::malformed(format!(
                "unknown participant {}",
                participant
            )));
        };

        let other_index = opposite.get(other).ok_or_else(|| {
            MatchingError::malformed(format!(
                "{} is not a {} and cannot be ranked by {}",
                other,
                owner.side().opposite(),
                participant
            ))
        })?;

        Ok(owner.rank_of(*other_index))
    }

    /// Turn the model back into raw preference maps
    pub fn instance(&self) -> PreferenceInstance {
        let to_map = |group: &[Participant], opposite: &[Participant]| {
            group
                .iter()
                .map(|participant| {
                    let names: Vec<ParticipantId> = participant
                        .preferences()
                        .iter()
                        .map(|other| opposite[other].id().clone())
                        .collect();
                    (participant.id().clone(), names)
                })
                .collect::<PreferenceMap>()
        };

        PreferenceInstance::new(
            to_map(self.proposers.as_slice(), self.reviewers.as_slice()),
            to_map(self.reviewers.as_slice(), self.proposers.as_slice()),
        )
    }
}

fn index_by_id(prefs: &PreferenceMap) -> HashMap<ParticipantId, usize> {
    prefs
        .keys()
        .enumerate()
        .map(|(index, id)| (id.clone(), index))
        .collect()
}

fn resolve_group(
    prefs: &PreferenceMap,
    side: Side,
    opposite: &HashMap<ParticipantId, usize>,
) -> Result<Vec<Participant>, MatchingError> {
    prefs
        .iter()
        .map(|(id, names)| -> Result<Participant, MatchingError> {
            let list = resolve_list(id, side, names, opposite)?;
            Ok(Participant::new(id.clone(), side, list))
        })
        .collect()
}

/// Map a list of names to opposite-group indices, rejecting anything that
/// is not an exact permutation.
fn resolve_list(
    owner: &ParticipantId,
    side: Side,
    names: &[ParticipantId],
    opposite: &HashMap<ParticipantId, usize>,
) -> Result<PreferenceList, MatchingError> {
    if names.len() != opposite.len() {
        return Err(MatchingError::malformed(format!(
            "{} {} ranks {} participants, expected {}",
            side,
            owner,
            names.len(),
            opposite.len()
        )));
    }

    let mut seen = vec![false; opposite.len()];
    let mut list = Vec::with_capacity(names.len());

    for name in names {
        let index = *opposite.get(name).ok_or_else(|| {
            MatchingError::malformed(format!(
                "{} {} ranks unknown {} {}",
                side,
                owner,
                side.opposite(),
                name
            ))
        })?;

        if seen[index] {
            return Err(MatchingError::malformed(format!(
                "{} {} ranks {} more than once",
                side, owner, name
            )));
        }
        seen[index] = true;
        list.push(index);
    }

    Ok(PreferenceList(list))
}
