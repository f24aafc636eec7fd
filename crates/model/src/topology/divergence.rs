//! Random population-merger tree.

use crate::model::{Deme, DemeList, HistoricalEvent};
use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::debug;

/// Build the divergence events of a random binary merger tree, most recent
/// first.
///
/// Sampled demes are split into a random, non-empty set of sinks and the
/// remaining sources; the ghost joins either side with equal probability.
/// Each step removes one source (or, once sources are exhausted, one sink)
/// and merges it into a random surviving sink, until a single lineage is
/// left. A deme therefore acts as a source at most once and never appears
/// again after it has been merged away.
///
/// `rescale` pins whether mergers carry an ancestral resize variable; when
/// `None` each merger decides with probability 1/2.
pub fn divergence_events<R: Rng + ?Sized>(
    demes: &DemeList,
    rescale: Option<bool>,
    rng: &mut R,
) -> Vec<HistoricalEvent> {
    let nodes: Vec<Deme> = demes.sampled().collect();
    if nodes.is_empty() {
        return Vec::new();
    }

    let sink_count = rng.random_range(1..=nodes.len());
    let mut sinks: Vec<Deme> = nodes.choose_multiple(rng, sink_count).copied().collect();
    let mut sources: Vec<Deme> = nodes.iter().copied().filter(|d| !sinks.contains(d)).collect();

    if demes.has_ghost() {
        if rng.random_bool(0.5) {
            sources.push(Deme::Ghost);
        } else {
            sinks.push(Deme::Ghost);
        }
    }
    debug!(?sources, ?sinks, "Initial divergence roles");

    let mut events = Vec::with_capacity(demes.len().saturating_sub(1));
    while !sources.is_empty() || sinks.len() > 1 {
        let source = if sources.is_empty() {
            take_random(&mut sinks, rng)
        } else {
            take_random(&mut sources, rng)
        };
        let Some(source) = source else { break };
        let Some(&sink) = sinks.choose(rng) else { break };

        let resize = rescale.unwrap_or_else(|| rng.random_bool(0.5));
        events.push(HistoricalEvent::divergence(source, sink, resize));
    }
    events
}

fn take_random<R: Rng + ?Sized>(pool: &mut Vec<Deme>, rng: &mut R) -> Option<Deme> {
    if pool.is_empty() {
        return None;
    }
    let i = rng.random_range(0..pool.len());
    Some(pool.remove(i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;
    use std::collections::HashSet;

    fn check_tree(demes: &DemeList, events: &[HistoricalEvent]) {
        assert_eq!(events.len(), demes.len() - 1);

        let mut dead = HashSet::new();
        for event in events {
            let source = event.source.unwrap();
            let sink = event.sink.unwrap();
            assert_ne!(source, sink);
            assert!(!dead.contains(&source), "{source} merged twice");
            assert!(!dead.contains(&sink), "{sink} used after merging");
            dead.insert(source);
        }
        let survivors: Vec<Deme> = demes.iter().filter(|d| !dead.contains(d)).collect();
        assert_eq!(survivors.len(), 1);
    }

    #[test]
    fn test_tree_is_binary_and_complete() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        for sampled in 1..=7 {
            for ghost in [false, true] {
                let demes = DemeList::new(sampled, ghost);
                for _ in 0..50 {
                    let events = divergence_events(&demes, None, &mut rng);
                    check_tree(&demes, &events);
                }
            }
        }
    }

    #[test]
    fn test_single_population_has_no_divergence() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let demes = DemeList::new(1, false);
        assert!(divergence_events(&demes, None, &mut rng).is_empty());
    }

    #[test]
    fn test_single_population_with_ghost_merges_once() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
        let demes = DemeList::new(1, true);
        let events = divergence_events(&demes, Some(false), &mut rng);
        assert_eq!(events.len(), 1);
        let pair: HashSet<Deme> = events[0].lineages().collect();
        assert_eq!(pair, HashSet::from([Deme::Sampled(0), Deme::Ghost]));
    }

    #[test]
    fn test_rescale_can_be_pinned() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let demes = DemeList::new(5, false);
        let events = divergence_events(&demes, Some(true), &mut rng);
        assert!(events.iter().all(|e| e.resize.variable().is_some()));
        let events = divergence_events(&demes, Some(false), &mut rng);
        assert!(events.iter().all(|e| e.resize.variable().is_none()));
    }
}
