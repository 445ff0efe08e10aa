//! ArCircuit - power propagation for marker-tracked circuit components
//!
//! Each physical marker the tracker recognizes stands for one circuit
//! component (battery, switch, LED, ...). Once per frame the host feeds the
//! tracker's added/updated/removed batches into the orchestrator, which
//! decides from marker proximity which components receive power and drives
//! the on/off visuals through a render port.
//!
//! # Quick Start
//!
//! ```
//! use arcircuit::prelude::*;
//! use glam::Vec3;
//!
//! let mut sim = Simulation::builtin().unwrap();
//! let frame = FrameEvents::new()
//!     .added(TrackedMarker::tracking("Battery", Vec3::ZERO))
//!     .added(TrackedMarker::tracking("LED", Vec3::new(0.05, 0.0, 0.0)))
//!     .updated(TrackedMarker::tracking("Battery", Vec3::ZERO))
//!     .updated(TrackedMarker::tracking("LED", Vec3::new(0.05, 0.0, 0.0)));
//!
//! let output = sim.step(&frame).unwrap();
//! let led = output.components.iter().find(|c| c.name == "LED").unwrap();
//! assert!(led.enabled);
//! ```
//!
//! # Features
//!
//! - **Registry**: fixed name → role/template table, JSON configurable
//! - **Propagation**: pairwise proximity rule (source, conductor, sink)
//! - **Orchestrator**: per-frame add/update/sweep/remove pass
//! - **Render port**: backend-agnostic show/hide/reposition interface

pub mod component;
pub mod config;
pub mod core;
pub mod orchestrator;
pub mod propagation;
pub mod registry;
pub mod render;
pub mod tracking;

// Re-export main types
pub use crate::core::{replay_session_file, ArCircuitError, FrameOutput, Simulation};
pub use component::{CircuitComponent, Depiction};
pub use config::CircuitConfig;
pub use orchestrator::{
    CircuitOrchestrator, ComponentState, EventKind, FrameDiagnostic, FrameReport,
};
pub use propagation::{connects, evaluate_pair, PairOutcome, PowerInput, PROXIMITY_THRESHOLD};
pub use registry::{ComponentRegistry, RegistryEntry, Role, TemplateId};
pub use render::{CommandBuffer, RenderCommand, RenderPort, VisualHandle};
pub use tracking::{FrameEvents, Pose, Session, TrackedMarker, TrackingStatus};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        ArCircuitError, CircuitConfig, CircuitOrchestrator, CommandBuffer, ComponentRegistry,
        FrameEvents, FrameOutput, Pose, RegistryEntry, RenderPort, Role, Simulation,
        TrackedMarker, TrackingStatus,
    };
}
