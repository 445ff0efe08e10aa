//! Component Registry
//!
//! Fixed mapping from marker name to the component's power role and the pair
//! of visual templates used to depict it. Built once at startup and read-only
//! afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::core::ArCircuitError;

/// Power behavior of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Energizes anything touching it.
    Source,
    /// Energizes neighbors only while itself powered.
    Conductor,
    /// Consumes power; switches on only while powered.
    Sink,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Source => write!(f, "source"),
            Role::Conductor => write!(f, "conductor"),
            Role::Sink => write!(f, "sink"),
        }
    }
}

/// Identifier of a visual template owned by the rendering collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(String);

impl TemplateId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One registered component type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub name: String,
    pub role: Role,
    pub on_template: TemplateId,
    /// Falls back to `on_template` when a component has a single depiction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub off_template: Option<TemplateId>,
}

impl RegistryEntry {
    pub fn new(
        name: impl Into<String>,
        role: Role,
        on_template: impl Into<String>,
        off_template: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            role,
            on_template: TemplateId::new(on_template),
            off_template: Some(TemplateId::new(off_template)),
        }
    }

    pub fn off_template(&self) -> &TemplateId {
        self.off_template.as_ref().unwrap_or(&self.on_template)
    }
}

/// Read-only lookup table of every component the tracker can recognize.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    entries: Vec<RegistryEntry>,
    index: HashMap<String, usize>,
}

impl ComponentRegistry {
    /// Build a registry, rejecting duplicate names.
    pub fn new(
        entries: impl IntoIterator<Item = RegistryEntry>,
    ) -> Result<Self, ArCircuitError> {
        let mut registry = Self::default();
        for entry in entries {
            if registry.index.contains_key(&entry.name) {
                return Err(ArCircuitError::DuplicateComponent(entry.name));
            }
            registry
                .index
                .insert(entry.name.clone(), registry.entries.len());
            registry.entries.push(entry);
        }
        tracing::debug!(count = registry.entries.len(), "Component registry built");
        Ok(registry)
    }

    pub fn lookup(&self, name: &str) -> Result<&RegistryEntry, ArCircuitError> {
        self.get(name)
            .ok_or_else(|| ArCircuitError::UnknownComponent(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&RegistryEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Entries in registration order.
    pub fn entries(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
