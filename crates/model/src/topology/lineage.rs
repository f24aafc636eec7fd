//! Optional admixture and bottleneck events.

use crate::errors::GenerationError;
use crate::model::{Deme, DemeList, HistoricalEvent};
use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::debug;

/// Cap for every retry-until-valid sampling loop.
pub const MAX_SAMPLING_ATTEMPTS: usize = 1_000;

/// Sample an admixture event between two distinct demes.
///
/// Candidate sources and sinks are drawn without replacement (a random
/// number of each, the ghost being offered to one side only) and redrawn
/// until they admit at least one pair with distinct demes. The migrant
/// fraction is uniform on `[0, 1]`.
///
/// Returns `Ok(None)` when the model has fewer than two demes.
pub fn admixture_event<R: Rng + ?Sized>(
    demes: &DemeList,
    rng: &mut R,
) -> Result<Option<HistoricalEvent>, GenerationError> {
    sample_admixture(demes, MAX_SAMPLING_ATTEMPTS, rng)
}

fn sample_admixture<R: Rng + ?Sized>(
    demes: &DemeList,
    max_attempts: usize,
    rng: &mut R,
) -> Result<Option<HistoricalEvent>, GenerationError> {
    if demes.len() < 2 {
        return Ok(None);
    }

    for attempt in 1..=max_attempts {
        let mut possible_sources: Vec<Deme> = demes.sampled().collect();
        let mut possible_sinks = possible_sources.clone();
        if demes.has_ghost() {
            if rng.random_bool(0.5) {
                possible_sources.push(Deme::Ghost);
            } else {
                possible_sinks.push(Deme::Ghost);
            }
        }

        let sources = candidates(&possible_sources, demes.len(), rng);
        let sinks = candidates(&possible_sinks, demes.len(), rng);

        let pairs: Vec<(Deme, Deme)> = sources
            .iter()
            .flat_map(|&s| sinks.iter().map(move |&k| (s, k)))
            .filter(|(s, k)| s != k)
            .collect();

        if let Some(&(source, sink)) = pairs.choose(rng) {
            let migrants = rng.random_range(0.0..=1.0);
            debug!(%source, %sink, migrants, attempt, "Sampled admixture");
            return Ok(Some(HistoricalEvent::admixture(source, sink, migrants)));
        }
    }

    Err(GenerationError::RetryLimit {
        what: "admixture source/sink pair",
        attempts: max_attempts,
    })
}

/// Between 1 and `max` distinct demes from `pool`.
fn candidates<R: Rng + ?Sized>(pool: &[Deme], max: usize, rng: &mut R) -> Vec<Deme> {
    let wanted = rng.random_range(1..=max.max(1));
    pool.choose_multiple(rng, wanted.min(pool.len()))
        .copied()
        .collect()
}

/// Start/end pair of a bottleneck on a random deme (possibly the ghost).
pub fn bottleneck_events<R: Rng + ?Sized>(demes: &DemeList, rng: &mut R) -> Option<[HistoricalEvent; 2]> {
    if demes.is_empty() {
        return None;
    }
    let deme = demes.get(rng.random_range(0..demes.len()))?;
    debug!(%deme, "Sampled bottleneck");
    Some(HistoricalEvent::bottleneck(deme))
}
