//! Update Orchestrator
//!
//! Owns the live set of circuit components and drives the per-frame pass:
//!
//! 1. **Added**: instantiate a hidden, unpowered component per new marker.
//! 2. **Updated**: show and move tracked components, hide the rest, then sweep
//!    every unordered pair of tracked components through the propagation rule
//!    and resolve each one's on/off state.
//! 3. **Removed**: hide and release the component's visuals.
//!
//! The sweep reads every component's power flag as it stood before the sweep
//! and accumulates outcomes per component, so pair ordering never matters. A
//! connected pair only supplies power when one side is grounded, i.e. is a
//! source or still reaches one through components powered last frame.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::component::CircuitComponent;
use crate::core::ArCircuitError;
use crate::propagation::{
    evaluate_pair, grounded, PairOutcome, PowerInput, PowerTally, SweptPair, PROXIMITY_THRESHOLD,
};
use crate::registry::{ComponentRegistry, Role};
use crate::render::RenderPort;
use crate::tracking::{FrameEvents, Pose, TrackedMarker, TrackingStatus};

/// Which batch an event arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Added,
    Updated,
    Removed,
}

/// Recoverable conditions met while applying a frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrameDiagnostic {
    /// Updated/Removed event for a name with no live component.
    StaleEventReference { name: String, event: EventKind },
    /// Added event for a name that already has a live component.
    AlreadyLive { name: String },
    /// Component was updated without a usable pose and sat out the sweep.
    MissingTrackingData { name: String, status: TrackingStatus },
}

/// Summary of one applied frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameReport {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    /// Components that took part in the power sweep.
    pub swept: Vec<String>,
    pub pairs_evaluated: usize,
    /// Pairs through which power flowed this frame.
    pub connections: Vec<(String, String)>,
    pub diagnostics: Vec<FrameDiagnostic>,
}

impl FrameReport {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Serializable view of one live component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentState {
    pub name: String,
    pub role: Role,
    pub powered: bool,
    pub enabled: bool,
    pub visible: bool,
    pub pose: Pose,
}

impl From<&CircuitComponent> for ComponentState {
    fn from(c: &CircuitComponent) -> Self {
        Self {
            name: c.name().to_string(),
            role: c.role(),
            powered: c.powered(),
            enabled: c.enabled(),
            visible: c.is_visible(),
            pose: *c.pose(),
        }
    }
}

pub struct CircuitOrchestrator {
    registry: ComponentRegistry,
    threshold: f32,
    live: HashMap<String, CircuitComponent>,
}

impl CircuitOrchestrator {
    /// Orchestrator using the default proximity threshold.
    pub fn new(registry: ComponentRegistry) -> Self {
        Self {
            registry,
            threshold: PROXIMITY_THRESHOLD,
            live: HashMap::new(),
        }
    }

    pub fn with_threshold(
        registry: ComponentRegistry,
        threshold: f32,
    ) -> Result<Self, ArCircuitError> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(ArCircuitError::InvalidThreshold(threshold));
        }
        Ok(Self {
            threshold,
            ..Self::new(registry)
        })
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn component(&self, name: &str) -> Option<&CircuitComponent> {
        self.live.get(name)
    }

    pub fn live_components(&self) -> impl Iterator<Item = &CircuitComponent> {
        self.live.values()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// States of every live component, sorted by name.
    pub fn snapshot(&self) -> Vec<ComponentState> {
        let mut states: Vec<ComponentState> = self.live.values().map(ComponentState::from).collect();
        states.sort_by(|a, b| a.name.cmp(&b.name));
        states
    }

    /// Apply one frame of tracker events.
    ///
    /// An added marker missing from the registry rejects the whole frame
    /// before any component is touched.
    pub fn apply<P: RenderPort + ?Sized>(
        &mut self,
        events: &FrameEvents,
        port: &mut P,
    ) -> Result<FrameReport, ArCircuitError> {
        for marker in &events.added {
            if let Err(e) = self.registry.lookup(&marker.name) {
                tracing::warn!(component = %marker.name, "Frame rejected: marker not registered");
                return Err(e);
            }
        }

        let mut report = FrameReport::default();

        for marker in &events.added {
            self.add(marker, port, &mut report)?;
        }

        let swept = self.update(&events.updated, port, &mut report);
        self.sweep(&swept, port, &mut report);

        for marker in &events.removed {
            self.remove(&marker.name, port, &mut report);
        }

        tracing::debug!(
            added = report.added.len(),
            swept = report.swept.len(),
            pairs = report.pairs_evaluated,
            removed = report.removed.len(),
            "Frame applied"
        );
        Ok(report)
    }

    /// Release every live component.
    pub fn teardown<P: RenderPort + ?Sized>(&mut self, port: &mut P) {
        for (name, component) in self.live.drain() {
            tracing::debug!(component = %name, "Releasing on teardown");
            component.release(port);
        }
    }

    fn add<P: RenderPort + ?Sized>(
        &mut self,
        marker: &TrackedMarker,
        port: &mut P,
        report: &mut FrameReport,
    ) -> Result<(), ArCircuitError> {
        if self.live.contains_key(&marker.name) {
            tracing::warn!(component = %marker.name, "Added event for live component ignored");
            report.diagnostics.push(FrameDiagnostic::AlreadyLive {
                name: marker.name.clone(),
            });
            return Ok(());
        }

        let entry = self.registry.lookup(&marker.name)?;
        let component = CircuitComponent::spawn(entry, marker.pose, port);
        tracing::info!(component = %marker.name, role = %entry.role, "Component added");
        self.live.insert(marker.name.clone(), component);
        report.added.push(marker.name.clone());
        Ok(())
    }

    /// Returns the names of components eligible for the power sweep.
    fn update<P: RenderPort + ?Sized>(
        &mut self,
        markers: &[TrackedMarker],
        port: &mut P,
        report: &mut FrameReport,
    ) -> Vec<String> {
        // The tracker's last word on a name wins.
        let mut seen = HashSet::new();
        let mut latest: Vec<&TrackedMarker> = markers
            .iter()
            .rev()
            .filter(|m| seen.insert(m.name.as_str()))
            .collect();
        latest.reverse();

        let mut swept = Vec::new();

        for marker in latest {
            let Some(component) = self.live.get_mut(&marker.name) else {
                tracing::debug!(component = %marker.name, "Stale update ignored");
                report.diagnostics.push(FrameDiagnostic::StaleEventReference {
                    name: marker.name.clone(),
                    event: EventKind::Updated,
                });
                continue;
            };

            if marker.status.is_tracking() {
                component.show(port);
                component.set_pose(marker.pose, port);
                swept.push(marker.name.clone());
            } else {
                component.hide(port);
                report.diagnostics.push(FrameDiagnostic::MissingTrackingData {
                    name: marker.name.clone(),
                    status: marker.status,
                });
            }
        }

        swept
    }

    fn sweep<P: RenderPort + ?Sized>(
        &mut self,
        names: &[String],
        port: &mut P,
        report: &mut FrameReport,
    ) {
        let inputs: Vec<(&str, PowerInput, Pose)> = names
            .iter()
            .filter_map(|name| self.live.get(name))
            .map(|c| (c.name(), PowerInput::from(c), *c.pose()))
            .collect();
        let sides: Vec<PowerInput> = inputs.iter().map(|(_, side, _)| *side).collect();

        let mut pairs = Vec::new();
        for i in 0..inputs.len() {
            for j in (i + 1)..inputs.len() {
                let (name_a, a, pose_a) = inputs[i];
                let (name_b, b, pose_b) = inputs[j];
                let distance = pose_a.distance_to(&pose_b);
                let outcome = evaluate_pair(a, b, distance, self.threshold);
                tracing::debug!(a = %name_a, b = %name_b, distance, ?outcome, "Pair evaluated");
                pairs.push(SweptPair { a: i, b: j, outcome });
            }
        }
        report.pairs_evaluated += pairs.len();

        let grounded = grounded(&sides, &pairs);
        let mut tallies = vec![PowerTally::default(); inputs.len()];
        for pair in &pairs {
            let carries = pair.carries_power(&grounded);
            tallies[pair.a].record(pair.outcome, carries);
            tallies[pair.b].record(pair.outcome, carries);
            if carries {
                report
                    .connections
                    .push((inputs[pair.a].0.to_string(), inputs[pair.b].0.to_string()));
            } else if pair.outcome == PairOutcome::Connected {
                tracing::debug!(
                    a = %inputs[pair.a].0,
                    b = %inputs[pair.b].0,
                    "Pair cut off from every source"
                );
            }
        }

        let resolved: Vec<(String, PowerTally)> = inputs
            .iter()
            .map(|(name, _, _)| name.to_string())
            .zip(tallies)
            .collect();
        for (name, tally) in &resolved {
            if let Some(component) = self.live.get_mut(name) {
                let powered = tally.resolve(component.powered());
                component.set_powered(powered);
                component.set_power(powered, port);
            }
        }

        report.swept = resolved.into_iter().map(|(name, _)| name).collect();
    }

    fn remove<P: RenderPort + ?Sized>(
        &mut self,
        name: &str,
        port: &mut P,
        report: &mut FrameReport,
    ) {
        match self.live.remove(name) {
            Some(component) => {
                component.release(port);
                tracing::info!(component = %name, "Component removed");
                report.removed.push(name.to_string());
            }
            None => {
                tracing::debug!(component = %name, "Stale removal ignored");
                report.diagnostics.push(FrameDiagnostic::StaleEventReference {
                    name: name.to_string(),
                    event: EventKind::Removed,
                });
            }
        }
    }
}
