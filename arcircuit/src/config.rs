//! Circuit Configuration
//!
//! Load-time configuration: the registry table and the proximity threshold.
//! Loaded from:
//! 1. A user JSON file passed by the host
//! 2. The embedded default set compiled into the binary (fallback)

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::ArCircuitError;
use crate::orchestrator::CircuitOrchestrator;
use crate::propagation::PROXIMITY_THRESHOLD;
use crate::registry::{ComponentRegistry, RegistryEntry};

const EMBEDDED_BUILTIN: &str = include_str!("../circuits/builtin.json");

fn default_threshold() -> f32 {
    PROXIMITY_THRESHOLD
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitConfig {
    #[serde(default = "default_threshold")]
    pub proximity_threshold: f32,
    #[serde(default)]
    pub components: Vec<RegistryEntry>,
}

impl Default for CircuitConfig {
    fn default() -> Self {
        Self {
            proximity_threshold: PROXIMITY_THRESHOLD,
            components: Vec::new(),
        }
    }
}

impl CircuitConfig {
    /// The component set of the physical marker kit: battery, USB stick,
    /// dimmer, switch, LED and motor.
    pub fn builtin() -> Result<Self, ArCircuitError> {
        Self::from_json_str(EMBEDDED_BUILTIN)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ArCircuitError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ArCircuitError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&content)?;
        tracing::info!(
            path = %path.display(),
            components = config.components.len(),
            "Loaded circuit config"
        );
        Ok(config)
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.proximity_threshold = threshold;
        self
    }

    pub fn registry(&self) -> Result<ComponentRegistry, ArCircuitError> {
        ComponentRegistry::new(self.components.iter().cloned())
    }

    /// Validate the config and build an orchestrator from it.
    pub fn into_orchestrator(self) -> Result<CircuitOrchestrator, ArCircuitError> {
        let registry = ComponentRegistry::new(self.components)?;
        CircuitOrchestrator::with_threshold(registry, self.proximity_threshold)
    }
}
