//! Render Port
//!
//! The capability interface the core uses to drive the rendering collaborator.
//! Visual handles are opaque identifiers minted by the port; the core only
//! ever shows, hides, moves and destroys them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::registry::TemplateId;
use crate::tracking::Pose;

/// Opaque reference to an instantiated visual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisualHandle(pub u64);

impl fmt::Display for VisualHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Implemented once per rendering backend.
pub trait RenderPort {
    /// Instantiate a visual from `template` at `pose`.
    fn instantiate(&mut self, template: &TemplateId, pose: &Pose) -> VisualHandle;

    fn set_visible(&mut self, handle: VisualHandle, visible: bool);

    fn reposition(&mut self, handle: VisualHandle, pose: &Pose);

    /// The handle must not be used afterwards.
    fn destroy(&mut self, handle: VisualHandle);
}

/// A render call recorded by [`CommandBuffer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RenderCommand {
    Instantiate {
        handle: VisualHandle,
        template: TemplateId,
        pose: Pose,
    },
    Show {
        handle: VisualHandle,
    },
    Hide {
        handle: VisualHandle,
    },
    Reposition {
        handle: VisualHandle,
        pose: Pose,
    },
    Destroy {
        handle: VisualHandle,
    },
}

impl RenderCommand {
    pub fn handle(&self) -> VisualHandle {
        match self {
            RenderCommand::Instantiate { handle, .. }
            | RenderCommand::Show { handle }
            | RenderCommand::Hide { handle }
            | RenderCommand::Reposition { handle, .. }
            | RenderCommand::Destroy { handle } => *handle,
        }
    }
}

/// Render port that records every call as a [`RenderCommand`].
///
/// Handles are numbered sequentially and never reused, so one buffer should
/// live as long as the orchestrator it serves.
#[derive(Debug, Default)]
pub struct CommandBuffer {
    next_handle: u64,
    commands: Vec<RenderCommand>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Take the recorded commands, keeping the handle counter.
    pub fn drain(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl RenderPort for CommandBuffer {
    fn instantiate(&mut self, template: &TemplateId, pose: &Pose) -> VisualHandle {
        let handle = VisualHandle(self.next_handle);
        self.next_handle += 1;
        self.commands.push(RenderCommand::Instantiate {
            handle,
            template: template.clone(),
            pose: *pose,
        });
        handle
    }

    fn set_visible(&mut self, handle: VisualHandle, visible: bool) {
        self.commands.push(if visible {
            RenderCommand::Show { handle }
        } else {
            RenderCommand::Hide { handle }
        });
    }

    fn reposition(&mut self, handle: VisualHandle, pose: &Pose) {
        self.commands.push(RenderCommand::Reposition {
            handle,
            pose: *pose,
        });
    }

    fn destroy(&mut self, handle: VisualHandle) {
        self.commands.push(RenderCommand::Destroy { handle });
    }
}
