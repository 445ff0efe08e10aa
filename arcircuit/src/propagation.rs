//! Pairwise Power-Propagation Rule
//!
//! Decides, for two tracked components and the distance between their
//! markers, whether power flows between them. The rule only looks at the two
//! components' current flags, so it is not transitive within a single
//! evaluation: a chain of conductors energizes one hop per frame. Losing
//! power is not delayed the same way: once a source leaves, everything that
//! only reached it through the gap goes dark in the same sweep.

use serde::Serialize;
use std::collections::VecDeque;

use crate::component::CircuitComponent;
use crate::registry::Role;

/// Default maximum marker distance treated as an electrical connection.
pub const PROXIMITY_THRESHOLD: f32 = 0.1;

/// The inputs of the rule for one side of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerInput {
    pub role: Role,
    pub powered: bool,
}

impl PowerInput {
    pub fn new(role: Role, powered: bool) -> Self {
        Self { role, powered }
    }

    /// Whether this side can feed power into a neighbor.
    pub fn energizes(&self) -> bool {
        match self.role {
            Role::Source => true,
            Role::Conductor | Role::Sink => self.powered,
        }
    }
}

impl From<&CircuitComponent> for PowerInput {
    fn from(component: &CircuitComponent) -> Self {
        Self::new(component.role(), component.powered())
    }
}

/// Result of evaluating one pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PairOutcome {
    /// In range and power flows; both sides become powered.
    Connected,
    /// In range but neither side carries power.
    Isolated,
    /// Too far apart; both sides lose power.
    OutOfRange,
}

impl PairOutcome {
    pub fn is_connected(self) -> bool {
        matches!(self, PairOutcome::Connected)
    }
}

pub fn evaluate_pair(a: PowerInput, b: PowerInput, distance: f32, threshold: f32) -> PairOutcome {
    // NaN distances count as out of range.
    if !(distance <= threshold) {
        return PairOutcome::OutOfRange;
    }
    if a.energizes() || b.energizes() {
        PairOutcome::Connected
    } else {
        PairOutcome::Isolated
    }
}

/// True when power flows between `a` and `b`.
pub fn connects(a: PowerInput, b: PowerInput, distance: f32, threshold: f32) -> bool {
    evaluate_pair(a, b, distance, threshold).is_connected()
}

/// One evaluated pair of a sweep, indexed into the sweep's component list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SweptPair {
    pub a: usize,
    pub b: usize,
    pub outcome: PairOutcome,
}

impl SweptPair {
    /// A connected pair only carries power when one side is grounded.
    pub(crate) fn carries_power(&self, grounded: &[bool]) -> bool {
        self.outcome.is_connected() && (grounded[self.a] || grounded[self.b])
    }
}

/// Marks the components that can hand power on this frame.
///
/// Sources are always grounded. A component that was powered before the sweep
/// stays grounded only while it reaches a source through in-range components
/// that were also powered before the sweep. Unpowered components are never
/// crossed, so power still spreads one hop per frame, but a ring of powered
/// components cut off from every source can no longer feed itself.
pub(crate) fn grounded(sides: &[PowerInput], pairs: &[SweptPair]) -> Vec<bool> {
    let mut grounded: Vec<bool> = sides.iter().map(|p| p.role == Role::Source).collect();
    let mut queue: VecDeque<usize> = (0..sides.len()).filter(|&i| grounded[i]).collect();

    while let Some(from) = queue.pop_front() {
        for pair in pairs.iter().filter(|p| p.outcome != PairOutcome::OutOfRange) {
            let to = if pair.a == from {
                pair.b
            } else if pair.b == from {
                pair.a
            } else {
                continue;
            };
            if !grounded[to] && sides[to].powered {
                grounded[to] = true;
                queue.push_back(to);
            }
        }
    }

    grounded
}

/// Outcomes seen by one component over a whole sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct PowerTally {
    supplied: bool,
    out_of_range: bool,
}

impl PowerTally {
    pub(crate) fn record(&mut self, outcome: PairOutcome, carries_power: bool) {
        match outcome {
            PairOutcome::Connected if carries_power => self.supplied = true,
            PairOutcome::OutOfRange => self.out_of_range = true,
            PairOutcome::Connected | PairOutcome::Isolated => {}
        }
    }

    /// A grounded connection wins over any out-of-range pair; with neither,
    /// the previous value stands.
    pub(crate) fn resolve(self, previous: bool) -> bool {
        if self.supplied {
            true
        } else if self.out_of_range {
            false
        } else {
            previous
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ROLES: [Role; 3] = [Role::Source, Role::Conductor, Role::Sink];

    fn side() -> impl Strategy<Value = PowerInput> {
        (0..3usize, any::<bool>()).prop_map(|(i, powered)| PowerInput::new(ROLES[i], powered))
    }

    proptest! {
        #[test]
        fn prop_out_of_range_never_connects(
            a in side(),
            b in side(),
            excess in 0.0001f32..100.0,
        ) {
            let d = PROXIMITY_THRESHOLD + excess;
            prop_assert_eq!(evaluate_pair(a, b, d, PROXIMITY_THRESHOLD), PairOutcome::OutOfRange);
            prop_assert!(!connects(a, b, d, PROXIMITY_THRESHOLD));
        }

        #[test]
        fn prop_source_in_range_always_connects(
            other in side(),
            powered in any::<bool>(),
            d in 0.0f32..=PROXIMITY_THRESHOLD,
        ) {
            let source = PowerInput::new(Role::Source, powered);
            prop_assert!(connects(source, other, d, PROXIMITY_THRESHOLD));
            prop_assert!(connects(other, source, d, PROXIMITY_THRESHOLD));
        }

        #[test]
        fn prop_rule_is_symmetric(a in side(), b in side(), d in 0.0f32..1.0) {
            prop_assert_eq!(
                evaluate_pair(a, b, d, PROXIMITY_THRESHOLD),
                evaluate_pair(b, a, d, PROXIMITY_THRESHOLD)
            );
        }
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let battery = PowerInput::new(Role::Source, false);
        let led = PowerInput::new(Role::Sink, false);
        assert!(connects(battery, led, PROXIMITY_THRESHOLD, PROXIMITY_THRESHOLD));
    }

    #[test]
    fn test_unpowered_conductor_and_sink_are_isolated() {
        let usb = PowerInput::new(Role::Conductor, false);
        let led = PowerInput::new(Role::Sink, false);
        assert_eq!(evaluate_pair(usb, led, 0.05, PROXIMITY_THRESHOLD), PairOutcome::Isolated);
    }

    #[test]
    fn test_powered_conductor_feeds_sink() {
        let usb = PowerInput::new(Role::Conductor, true);
        let led = PowerInput::new(Role::Sink, false);
        assert!(connects(usb, led, 0.05, PROXIMITY_THRESHOLD));
    }

    #[test]
    fn test_powered_sink_feeds_neighbor() {
        let motor = PowerInput::new(Role::Sink, true);
        let dimmer = PowerInput::new(Role::Conductor, false);
        assert!(connects(dimmer, motor, 0.02, PROXIMITY_THRESHOLD));
    }

    #[test]
    fn test_nan_distance_is_out_of_range() {
        let battery = PowerInput::new(Role::Source, true);
        let led = PowerInput::new(Role::Sink, false);
        assert_eq!(evaluate_pair(battery, led, f32::NAN, PROXIMITY_THRESHOLD), PairOutcome::OutOfRange);
    }

    #[test]
    fn test_tally_resolution() {
        let mut tally = PowerTally::default();
        assert!(tally.resolve(true));
        assert!(!tally.resolve(false));

        tally.record(PairOutcome::Connected, false);
        assert!(!tally.resolve(false), "Ungrounded connection supplies nothing");

        tally.record(PairOutcome::OutOfRange, false);
        assert!(!tally.resolve(true));

        tally.record(PairOutcome::Connected, true);
        assert!(tally.resolve(false));
    }

    fn pair(a: usize, b: usize, outcome: PairOutcome) -> SweptPair {
        SweptPair { a, b, outcome }
    }

    #[test]
    fn test_grounding_follows_powered_neighbors_only() {
        // Battery - USB (powered) - Dimmer (unpowered) - LED (powered)
        let sides = [
            PowerInput::new(Role::Source, false),
            PowerInput::new(Role::Conductor, true),
            PowerInput::new(Role::Conductor, false),
            PowerInput::new(Role::Sink, true),
        ];
        let pairs = [
            pair(0, 1, PairOutcome::Connected),
            pair(1, 2, PairOutcome::Connected),
            pair(2, 3, PairOutcome::Connected),
            pair(0, 3, PairOutcome::OutOfRange),
        ];

        assert_eq!(grounded(&sides, &pairs), vec![true, true, false, false]);
    }

    #[test]
    fn test_powered_ring_without_source_goes_dark() {
        // USB, Dimmer and LED still touch each other but the battery left.
        let sides = [
            PowerInput::new(Role::Source, true),
            PowerInput::new(Role::Conductor, true),
            PowerInput::new(Role::Conductor, true),
            PowerInput::new(Role::Sink, true),
        ];
        let pairs = [
            pair(0, 1, PairOutcome::OutOfRange),
            pair(0, 2, PairOutcome::OutOfRange),
            pair(0, 3, PairOutcome::OutOfRange),
            pair(1, 2, PairOutcome::Connected),
            pair(1, 3, PairOutcome::Connected),
            pair(2, 3, PairOutcome::Connected),
        ];
        let grounded = grounded(&sides, &pairs);
        assert_eq!(grounded, vec![true, false, false, false]);

        let mut tallies = vec![PowerTally::default(); sides.len()];
        for p in &pairs {
            let carries = p.carries_power(&grounded);
            assert!(!carries);
            tallies[p.a].record(p.outcome, carries);
            tallies[p.b].record(p.outcome, carries);
        }
        assert!(tallies.iter().all(|t| !t.resolve(true)));
    }

    #[test]
    fn test_unpowered_conductor_is_not_crossed() {
        let sides = [
            PowerInput::new(Role::Source, false),
            PowerInput::new(Role::Conductor, false),
            PowerInput::new(Role::Sink, false),
        ];
        let pairs = [
            pair(0, 1, PairOutcome::Connected),
            pair(1, 2, PairOutcome::Isolated),
        ];
        let grounded = grounded(&sides, &pairs);

        assert!(pairs[0].carries_power(&grounded));
        assert!(!pairs[1].carries_power(&grounded));
    }
}
