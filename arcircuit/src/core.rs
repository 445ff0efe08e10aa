//! Core simulation API shared by the CLI and embedding hosts.
//! No tracker or renderer dependencies.

use serde::Serialize;
use std::path::Path;

use crate::config::CircuitConfig;
use crate::orchestrator::{CircuitOrchestrator, ComponentState, FrameReport};
use crate::render::{CommandBuffer, RenderCommand};
use crate::tracking::{FrameEvents, Session};

#[derive(Debug, thiserror::Error)]
pub enum ArCircuitError {
    #[error("Unknown component: {0}")]
    UnknownComponent(String),
    #[error("Duplicate component in registry: {0}")]
    DuplicateComponent(String),
    #[error("Invalid proximity threshold: {0}")]
    InvalidThreshold(f32),
    #[error("Config error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ArCircuitError {
    fn from(e: serde_json::Error) -> Self {
        ArCircuitError::Config(e.to_string())
    }
}

/// Everything produced by one simulated frame.
#[derive(Debug, Clone, Serialize)]
pub struct FrameOutput {
    pub frame: usize,
    pub report: FrameReport,
    pub commands: Vec<RenderCommand>,
    pub components: Vec<ComponentState>,
}

/// An orchestrator paired with a recording render port, turning frame events
/// into render commands.
pub struct Simulation {
    orchestrator: CircuitOrchestrator,
    buffer: CommandBuffer,
    frame: usize,
}

impl Simulation {
    pub fn new(orchestrator: CircuitOrchestrator) -> Self {
        Self {
            orchestrator,
            buffer: CommandBuffer::new(),
            frame: 0,
        }
    }

    pub fn from_config(config: CircuitConfig) -> Result<Self, ArCircuitError> {
        Ok(Self::new(config.into_orchestrator()?))
    }

    /// Simulation over the built-in component set.
    pub fn builtin() -> Result<Self, ArCircuitError> {
        Self::from_config(CircuitConfig::builtin()?)
    }

    pub fn orchestrator(&self) -> &CircuitOrchestrator {
        &self.orchestrator
    }

    /// Number of frames applied so far.
    pub fn frames_applied(&self) -> usize {
        self.frame
    }

    /// Apply one frame and collect the render commands it produced.
    pub fn step(&mut self, events: &FrameEvents) -> Result<FrameOutput, ArCircuitError> {
        let report = self.orchestrator.apply(events, &mut self.buffer)?;
        let output = FrameOutput {
            frame: self.frame,
            report,
            commands: self.buffer.drain(),
            components: self.orchestrator.snapshot(),
        };
        self.frame += 1;
        Ok(output)
    }

    /// Replay every frame of a session, stopping at the first fatal error.
    pub fn replay(&mut self, session: &Session) -> Result<Vec<FrameOutput>, ArCircuitError> {
        session.frames.iter().map(|frame| self.step(frame)).collect()
    }

    /// Release every live component and return the teardown commands.
    pub fn teardown(&mut self) -> Vec<RenderCommand> {
        self.orchestrator.teardown(&mut self.buffer);
        self.buffer.drain()
    }
}

/// Load a config file (or the built-in one) and replay a session file.
pub fn replay_session_file(
    session_path: &Path,
    config: Option<&Path>,
) -> Result<Vec<FrameOutput>, ArCircuitError> {
    let config = match config {
        Some(path) => CircuitConfig::from_file(path)?,
        None => CircuitConfig::builtin()?,
    };
    let session = Session::from_file(session_path)?;
    Simulation::from_config(config)?.replay(&session)
}
