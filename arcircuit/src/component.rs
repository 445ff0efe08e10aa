//! Circuit Component Entity
//!
//! Per-instance state of a recognized marker: its power flags, last known
//! pose and the two visuals (on/off depiction) it owns on the render port.
//!
//! Visual invariants:
//! - at most one of the two handles is shown at any time;
//! - while visible, exactly the handle matching the depiction is shown;
//! - while hidden, both handles are hidden.

use serde::Serialize;

use crate::registry::{RegistryEntry, Role};
use crate::render::{RenderPort, VisualHandle};
use crate::tracking::Pose;

/// Which of the two visuals represents the component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Depiction {
    On,
    Off,
}

impl Depiction {
    pub fn is_on(self) -> bool {
        matches!(self, Depiction::On)
    }

    fn opposite(self) -> Self {
        match self {
            Depiction::On => Depiction::Off,
            Depiction::Off => Depiction::On,
        }
    }
}

impl From<bool> for Depiction {
    fn from(on: bool) -> Self {
        if on {
            Depiction::On
        } else {
            Depiction::Off
        }
    }
}

#[derive(Debug, Clone)]
pub struct CircuitComponent {
    name: String,
    role: Role,
    powered: bool,
    depiction: Depiction,
    visible: bool,
    pose: Pose,
    on_handle: VisualHandle,
    off_handle: VisualHandle,
}

impl CircuitComponent {
    /// Instantiate both visuals at `pose`, hidden, with power off.
    pub fn spawn<P: RenderPort + ?Sized>(entry: &RegistryEntry, pose: Pose, port: &mut P) -> Self {
        let on_handle = port.instantiate(&entry.on_template, &pose);
        let off_handle = port.instantiate(entry.off_template(), &pose);
        port.set_visible(on_handle, false);
        port.set_visible(off_handle, false);

        Self {
            name: entry.name.clone(),
            role: entry.role,
            powered: false,
            depiction: Depiction::Off,
            visible: false,
            pose,
            on_handle,
            off_handle,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn powered(&self) -> bool {
        self.powered
    }

    pub fn enabled(&self) -> bool {
        self.depiction.is_on()
    }

    pub fn depiction(&self) -> Depiction {
        self.depiction
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn handle(&self, depiction: Depiction) -> VisualHandle {
        match depiction {
            Depiction::On => self.on_handle,
            Depiction::Off => self.off_handle,
        }
    }

    pub(crate) fn set_powered(&mut self, powered: bool) {
        self.powered = powered;
    }

    /// Store the pose and move both visuals, shown or not.
    pub fn set_pose<P: RenderPort + ?Sized>(&mut self, pose: Pose, port: &mut P) {
        self.pose = pose;
        port.reposition(self.on_handle, &pose);
        port.reposition(self.off_handle, &pose);
    }

    /// Resolve the on/off state. A sink asked to switch on without power
    /// stays off.
    pub fn set_power<P: RenderPort + ?Sized>(&mut self, has_power: bool, port: &mut P) {
        let on = if has_power && self.role == Role::Sink && !self.powered {
            tracing::debug!(component = %self.name, "Sink needs power but has none");
            false
        } else {
            has_power
        };

        if self.depiction.is_on() != on {
            tracing::debug!(component = %self.name, on, "Component switched");
        }
        self.depiction = Depiction::from(on);

        if self.visible {
            self.present(port);
        }
    }

    /// Show the visual matching the current depiction.
    pub fn show<P: RenderPort + ?Sized>(&mut self, port: &mut P) {
        self.visible = true;
        self.present(port);
    }

    pub fn hide<P: RenderPort + ?Sized>(&mut self, port: &mut P) {
        self.visible = false;
        port.set_visible(self.on_handle, false);
        port.set_visible(self.off_handle, false);
    }

    /// Hide and destroy both visuals.
    pub fn release<P: RenderPort + ?Sized>(mut self, port: &mut P) {
        self.hide(port);
        port.destroy(self.on_handle);
        port.destroy(self.off_handle);
    }

    fn present<P: RenderPort + ?Sized>(&self, port: &mut P) {
        port.set_visible(self.handle(self.depiction.opposite()), false);
        port.set_visible(self.handle(self.depiction), true);
    }
}
