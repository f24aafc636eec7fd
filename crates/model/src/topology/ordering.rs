//! Chronological ordering of historical events.
//!
//! Every event is its own placement unit. Ordering constraints are an
//! explicit "must come before" relation over units:
//!
//! - divergences keep the order in which the merger tree produced them;
//! - a unit touching lineage `d` must precede the first divergence that
//!   merges `d` away as its source, since `d` no longer exists after it;
//! - explicitly required pairs, such as pulse start before pulse end or a
//!   bottleneck start before its end.
//!
//! The divergence chain is laid out first. Every other unit is then inserted
//! at a position drawn uniformly from the window its already-placed
//! predecessors and successors leave open, except followers, which go right
//! behind their anchor. Units placed later (migration switches) may still
//! fall between an anchor and its follower.

use crate::model::{Deme, EventKind, HistoricalEvent};
use rand::Rng;
use tracing::{debug, warn};

/// Identifier of a placement unit within a [`Schedule`].
pub type UnitId = usize;

/// Events under construction together with their precedence relation.
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    units: Vec<Vec<HistoricalEvent>>,
    /// `(earlier, later)` pairs: `earlier` must be strictly more recent.
    edges: Vec<(UnitId, UnitId)>,
    /// Placed units, most recent first.
    order: Vec<UnitId>,
}

impl Schedule {
    /// Start from divergence events in tree-construction order.
    pub fn new(divergences: Vec<HistoricalEvent>) -> Self {
        let mut schedule = Self::default();
        let mut previous = None;
        for event in divergences {
            let id = schedule.push_unit(vec![event]);
            if let Some(prev) = previous {
                schedule.require(prev, id);
            }
            schedule.order.push(id);
            previous = Some(id);
        }
        schedule
    }

    fn push_unit(&mut self, events: Vec<HistoricalEvent>) -> UnitId {
        self.units.push(events);
        self.units.len() - 1
    }

    /// Add a unit whose events act on lineages. It is constrained to precede
    /// the first divergence that consumes any of those lineages.
    pub fn add_lineage_unit(&mut self, events: Vec<HistoricalEvent>) -> UnitId {
        let lineages: Vec<Deme> = events.iter().flat_map(|e| e.lineages()).collect();
        let consumer = self
            .order
            .iter()
            .copied()
            .find(|&unit| self.consumes_any(unit, &lineages));
        let id = self.push_unit(events);
        if let Some(consumer) = consumer {
            self.require(id, consumer);
        }
        id
    }

    /// Add a lineage unit and insert it directly after the placed `anchor`.
    ///
    /// The follower inherits the anchor's lineage constraint, so it still
    /// precedes the divergence that consumes its lineages.
    pub fn add_follower(&mut self, anchor: UnitId, events: Vec<HistoricalEvent>) -> UnitId {
        let id = self.add_lineage_unit(events);
        self.require(anchor, id);
        let slot = self.position(anchor).map_or(0, |p| p + 1);
        debug!(unit = id, anchor, slot, "Placed follower");
        self.order.insert(slot, id);
        id
    }

    /// Add a unit with no lineage constraint (migration-regime switches).
    pub fn add_free_unit(&mut self, events: Vec<HistoricalEvent>) -> UnitId {
        self.push_unit(events)
    }

    /// Record that `earlier` must be placed strictly before `later`.
    pub fn require(&mut self, earlier: UnitId, later: UnitId) {
        self.edges.push((earlier, later));
    }

    fn consumes_any(&self, unit: UnitId, lineages: &[Deme]) -> bool {
        self.units[unit].iter().any(|e| {
            e.kind() == EventKind::Divergence
                && e.source.is_some_and(|source| lineages.contains(&source))
        })
    }

    fn position(&self, unit: UnitId) -> Option<usize> {
        self.order.iter().position(|&u| u == unit)
    }

    /// Slots `lo..=hi` in which `unit` may be inserted given the units placed
    /// so far.
    pub fn window(&self, unit: UnitId) -> (usize, usize) {
        let lo = self
            .edges
            .iter()
            .filter(|(_, later)| *later == unit)
            .filter_map(|(earlier, _)| self.position(*earlier))
            .map(|p| p + 1)
            .max()
            .unwrap_or(0);
        let hi = self
            .edges
            .iter()
            .filter(|(earlier, _)| *earlier == unit)
            .filter_map(|(_, later)| self.position(*later))
            .min()
            .unwrap_or(self.order.len());
        (lo, hi)
    }

    /// Insert `unit` uniformly at random inside its window.
    ///
    /// An empty window cannot arise from the lineage rule; should it happen
    /// the unit goes to the front.
    pub fn place<R: Rng + ?Sized>(&mut self, unit: UnitId, rng: &mut R) {
        let (lo, hi) = self.window(unit);
        let slot = if lo <= hi {
            rng.random_range(lo..=hi)
        } else {
            warn!(unit, lo, hi, "No valid slot for event; inserting first");
            0
        };
        debug!(unit, slot, lo, hi, "Placed event");
        self.order.insert(slot, unit);
    }

    /// Whether the current order honours every recorded constraint.
    pub fn is_consistent(&self) -> bool {
        self.edges
            .iter()
            .all(|(earlier, later)| match (self.position(*earlier), self.position(*later)) {
                (Some(a), Some(b)) => a < b,
                _ => true,
            })
    }

    /// Flatten placed units into the final event sequence, most recent first.
    pub fn into_events(mut self) -> Vec<HistoricalEvent> {
        let mut events = Vec::new();
        for unit in self.order {
            events.append(&mut self.units[unit]);
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DemeList, TimeVar};
    use crate::topology::divergence::divergence_events;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn d(i: usize) -> Deme {
        Deme::Sampled(i)
    }

    #[test]
    fn test_lineage_unit_precedes_consuming_divergence() {
        // 0 -> 1, then 1 -> 2: an event on deme 1 must precede the second merger.
        let chain = vec![
            HistoricalEvent::divergence(d(0), d(1), false),
            HistoricalEvent::divergence(d(1), d(2), false),
        ];
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        for _ in 0..50 {
            let mut schedule = Schedule::new(chain.clone());
            let [start, end] = HistoricalEvent::bottleneck(d(1));
            let unit = schedule.add_lineage_unit(vec![start]);
            assert_eq!(schedule.window(unit), (0, 1));
            schedule.place(unit, &mut rng);
            schedule.add_follower(unit, vec![end]);
            assert!(schedule.is_consistent());

            let events = schedule.into_events();
            let bot = events
                .iter()
                .position(|e| e.kind() == EventKind::BottleneckStart)
                .unwrap();
            assert_eq!(events[bot + 1].kind(), EventKind::BottleneckEnd);
            assert!(bot <= 1);
        }
    }

    #[test]
    fn test_switch_may_fall_inside_bottleneck() {
        let chain = vec![HistoricalEvent::divergence(d(0), d(1), false)];
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(4);
        let mut inside = 0;
        for _ in 0..200 {
            let mut schedule = Schedule::new(chain.clone());
            let [start, end] = HistoricalEvent::bottleneck(d(0));
            let unit = schedule.add_lineage_unit(vec![start]);
            schedule.place(unit, &mut rng);
            schedule.add_follower(unit, vec![end]);
            let switch = schedule.add_free_unit(vec![HistoricalEvent::switch(TimeVar::Contact, 1)]);
            schedule.place(switch, &mut rng);
            assert!(schedule.is_consistent());

            let kinds: Vec<EventKind> = schedule.into_events().iter().map(|e| e.kind()).collect();
            let bot = kinds.iter().position(|k| *k == EventKind::BottleneckStart).unwrap();
            let end = kinds.iter().position(|k| *k == EventKind::BottleneckEnd).unwrap();
            let div = kinds.iter().position(|k| *k == EventKind::Divergence).unwrap();
            assert!(bot < end && end < div);
            if end == bot + 2 {
                assert_eq!(kinds[bot + 1], EventKind::Switch);
                inside += 1;
            }
        }
        // Four slots for the switch, one of them inside the bottleneck.
        assert!(inside > 20, "{inside}");
    }

    #[test]
    fn test_unconsumed_lineage_may_go_anywhere() {
        let chain = vec![HistoricalEvent::divergence(d(0), d(1), false)];
        let mut schedule = Schedule::new(chain);
        let unit = schedule.add_lineage_unit(vec![HistoricalEvent::admixture(d(1), d(2), 0.5)]);
        assert_eq!(schedule.window(unit), (0, 1));
    }

    #[test]
    fn test_required_pair_is_strictly_ordered() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(9);
        let demes = DemeList::new(4, false);
        for _ in 0..50 {
            let mut schedule = Schedule::new(divergence_events(&demes, None, &mut rng));
            let start = schedule.add_free_unit(vec![HistoricalEvent::switch(TimeVar::PulseStart, 1)]);
            let end = schedule.add_free_unit(vec![HistoricalEvent::switch(TimeVar::PulseEnd, 2)]);
            schedule.require(start, end);
            schedule.place(start, &mut rng);
            schedule.place(end, &mut rng);
            assert!(schedule.is_consistent());

            let events = schedule.into_events();
            let s = events.iter().position(|e| e.time_var() == Some(TimeVar::PulseStart));
            let e = events.iter().position(|e| e.time_var() == Some(TimeVar::PulseEnd));
            assert!(s.unwrap() < e.unwrap());
        }
    }

    #[test]
    fn test_divergence_chain_is_preserved() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let demes = DemeList::new(5, true);
        let chain = divergence_events(&demes, None, &mut rng);
        let mut schedule = Schedule::new(chain.clone());
        let unit = schedule.add_lineage_unit(vec![HistoricalEvent::admixture(d(0), d(1), 0.1)]);
        schedule.place(unit, &mut rng);

        let divergences: Vec<HistoricalEvent> = schedule
            .into_events()
            .into_iter()
            .filter(|e| e.kind() == EventKind::Divergence)
            .collect();
        assert_eq!(divergences, chain);
    }
}
