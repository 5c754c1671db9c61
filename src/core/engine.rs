use tracing::{debug, info, warn};

use crate::core::assignment::Assignment;
use crate::core::error::MatchingError;
use crate::core::preferences::PreferenceModel;
use crate::models::{Matching, Pair, PreferenceInstance, RoundTrace};

/// Result of a deferred-acceptance run
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub assignment: Assignment,
    pub rounds: usize,
    /// Per-round events, populated only when tracing is enabled
    pub trace: Vec<RoundTrace>,
}

impl MatchOutcome {
    pub fn matching(&self, model: &PreferenceModel) -> Matching {
        self.assignment.to_matching(model)
    }
}

/// Gale-Shapley deferred acceptance, proposers proposing.
///
/// # Rounds
/// 1. Propose: every proposer not currently held proposes to the head of its
///    working list
/// 2. Review: each reviewer keeps the best of its new proposers and its
///    current choice, by its full ranking
/// 3. Reject: everyone else advances past the reviewer that refused them
///
/// Rounds repeat until every reviewer holds a choice.
#[derive(Debug, Clone, Copy, Default)]
pub struct StableMatcher {
    verbose: bool,
}

impl StableMatcher {
    pub fn new() -> Self {
        Self { verbose: false }
    }

    /// Record and log a [`RoundTrace`] for every round. Does not change the result.
    pub fn with_trace(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Run deferred acceptance to a fixed point.
    ///
    /// # Errors
    /// `UnequalGroupSize` if the model's groups differ in size, and
    /// `NonTermination` if no fixed point is reached within `n²` rounds.
    pub fn solve(&self, model: &PreferenceModel) -> Result<MatchOutcome, MatchingError> {
        let n = model.size();
        if model.reviewers().len() != n {
            return Err(MatchingError::UnequalGroupSize {
                proposers: n,
                reviewers: model.reviewers().len(),
            });
        }

        let limit = round_limit(n);
        let mut state = RoundState::initial(n);
        let mut rounds = 0;
        let mut trace = Vec::new();

        while !state.is_complete() {
            if rounds == limit {
                warn!("Deferred acceptance did not settle within {} rounds", limit);
                return Err(MatchingError::NonTermination { rounds, limit });
            }
            rounds += 1;

            // Morning
            let proposals = match propose(model, &state) {
                Some(proposals) => proposals,
                None => {
                    warn!("A proposer exhausted its preference list in round {}", rounds);
                    return Err(MatchingError::NonTermination { rounds, limit });
                }
            };

            // Afternoon
            let verdicts = review(model, &state, &proposals);

            debug!(
                round = rounds,
                proposals = proposals.made.len(),
                accepted = verdicts.accepted.len(),
                rejected = verdicts.rejected.len(),
                "round reviewed"
            );

            if self.verbose {
                let record = round_trace(model, rounds, &proposals, &verdicts);
                info!(
                    "Round {}: proposals {:?}, accepted {:?}, rejected {:?}",
                    record.round,
                    record.proposals.iter().map(Pair::to_string).collect::<Vec<_>>(),
                    record.accepted.iter().map(Pair::to_string).collect::<Vec<_>>(),
                    record.rejected.iter().map(Pair::to_string).collect::<Vec<_>>(),
                );
                trace.push(record);
            }

            // Evening
            state = reject(model, state, verdicts);
        }

        let assignment = state
            .into_assignment()
            .ok_or(MatchingError::NonTermination { rounds, limit })?;

        if self.verbose {
            info!("Stable matching: {}", assignment.to_matching(model));
            info!("Solution found in {} rounds", rounds);
        }

        Ok(MatchOutcome {
            assignment,
            rounds,
            trace,
        })
    }

    /// Convenience wrapper: build the model, solve, and return id pairs
    pub fn solve_instance(
        &self,
        instance: &PreferenceInstance,
    ) -> Result<(Matching, usize), MatchingError> {
        let model = PreferenceModel::from_instance(instance)?;
        let outcome = self.solve(&model)?;
        Ok((outcome.matching(&model), outcome.rounds))
    }
}

/// Upper bound on rounds for `n` participants per side.
///
/// Every unfinished round either fills an empty reviewer (at most `n` times)
/// or advances some proposer's working list (at most `n(n-1)` times).
pub fn round_limit(n: usize) -> usize {
    (n * n).max(1)
}

/// Engine-owned state between rounds
#[derive(Debug, Clone)]
struct RoundState {
    /// Position, in each proposer's full list, of the head of its working list
    cursor: Vec<usize>,
    /// Proposer currently held by each reviewer
    choice: Vec<Option<usize>>,
    /// Whether each proposer is currently held
    held: Vec<bool>,
}

impl RoundState {
    fn initial(n: usize) -> Self {
        Self {
            cursor: vec![0; n],
            choice: vec![None; n],
            held: vec![false; n],
        }
    }

    fn is_complete(&self) -> bool {
        self.choice.iter().all(Option::is_some)
    }

    fn into_assignment(self) -> Option<Assignment> {
        let mut reviewer_of = vec![usize::MAX; self.choice.len()];
        for (reviewer, choice) in self.choice.into_iter().enumerate() {
            reviewer_of[choice?] = reviewer;
        }
        Assignment::from_reviewers(reviewer_of)
    }
}

/// ProposalSet for every reviewer
#[derive(Debug)]
struct Proposals {
    by_reviewer: Vec<Vec<usize>>,
    /// `(proposer, reviewer)` in proposer order
    made: Vec<(usize, usize)>,
}

#[derive(Debug)]
struct Verdicts {
    choice: Vec<Option<usize>>,
    /// `(proposer, reviewer)` for choices that changed this round
    accepted: Vec<(usize, usize)>,
    /// `(proposer, reviewer)` for every refusal this round
    rejected: Vec<(usize, usize)>,
}

fn propose(model: &PreferenceModel, state: &RoundState) -> Option<Proposals> {
    let n = model.size();
    let mut by_reviewer = vec![Vec::new(); n];
    let mut made = Vec::new();

    for proposer in 0..n {
        if state.held[proposer] {
            continue;
        }
        let reviewer = model
            .proposer(proposer)
            .preferences()
            .get(state.cursor[proposer])?;
        by_reviewer[reviewer].push(proposer);
        made.push((proposer, reviewer));
    }

    Some(Proposals { by_reviewer, made })
}

fn review(model: &PreferenceModel, state: &RoundState, proposals: &Proposals) -> Verdicts {
    let mut choice = state.choice.clone();
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();

    for (reviewer, suitors) in proposals.by_reviewer.iter().enumerate() {
        if suitors.is_empty() {
            continue;
        }
        let judge = model.reviewer(reviewer);
        let current = state.choice[reviewer];

        let best = suitors
            .iter()
            .copied()
            .chain(current)
            .min_by_key(|&proposer| judge.rank_of(proposer))
            .unwrap_or(suitors[0]);

        for proposer in suitors.iter().copied().chain(current) {
            if proposer != best {
                rejected.push((proposer, reviewer));
            }
        }

        if current != Some(best) {
            accepted.push((best, reviewer));
        }
        choice[reviewer] = Some(best);
    }

    Verdicts {
        choice,
        accepted,
        rejected,
    }
}

fn reject(model: &PreferenceModel, mut state: RoundState, verdicts: Verdicts) -> RoundState {
    for (proposer, reviewer) in verdicts.rejected {
        debug_assert_eq!(
            model.proposer(proposer).preferences().get(state.cursor[proposer]),
            Some(reviewer),
            "rejected by a reviewer that is not the head of the working list"
        );
        state.cursor[proposer] += 1;
        state.held[proposer] = false;
    }
    for (proposer, _) in verdicts.accepted {
        state.held[proposer] = true;
    }
    state.choice = verdicts.choice;
    state
}

fn round_trace(
    model: &PreferenceModel,
    round: usize,
    proposals: &Proposals,
    verdicts: &Verdicts,
) -> RoundTrace {
    let to_pairs = |pairs: &[(usize, usize)]| -> Vec<Pair> {
        pairs
            .iter()
            .map(|&(proposer, reviewer)| Pair {
                proposer: model.proposer(proposer).id().clone(),
                reviewer: model.reviewer(reviewer).id().clone(),
            })
            .collect()
    };

    RoundTrace {
        round,
        proposals: to_pairs(&proposals.made),
        accepted: to_pairs(&verdicts.accepted),
        rejected: to_pairs(&verdicts.rejected),
    }
}
