//! Random instance generation for property tests, benchmarks and the
//! `/matching/generate` endpoint.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::models::{ParticipantId, PreferenceInstance, PreferenceMap};

/// Proposers are numbered from 1
pub fn proposer_names(n: usize) -> Vec<ParticipantId> {
    (1..=n).map(|i| ParticipantId::new(i.to_string())).collect()
}

/// Reviewers are lettered: a..z, then aa, ab, ..
pub fn reviewer_names(n: usize) -> Vec<ParticipantId> {
    (0..n).map(|i| ParticipantId::new(letters(i))).collect()
}

fn letters(mut index: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'a' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

/// Uniformly random complete preferences for `n` proposers and `n` reviewers
pub fn random_instance<R: Rng + ?Sized>(n: usize, rng: &mut R) -> PreferenceInstance {
    let proposers = proposer_names(n);
    let reviewers = reviewer_names(n);

    PreferenceInstance::new(
        shuffled_preferences(&proposers, &reviewers, rng),
        shuffled_preferences(&reviewers, &proposers, rng),
    )
}

/// Reproducible [`random_instance`] driven by ChaCha8 seeded with `seed`
pub fn seeded_instance(n: usize, seed: u64) -> PreferenceInstance {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    random_instance(n, &mut rng)
}

fn shuffled_preferences<R: Rng + ?Sized>(
    group: &[ParticipantId],
    opposite: &[ParticipantId],
    rng: &mut R,
) -> PreferenceMap {
    group
        .iter()
        .map(|id| {
            let mut list = opposite.to_vec();
            list.shuffle(rng);
            (id.clone(), list)
        })
        .collect()
}
