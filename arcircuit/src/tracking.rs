//! Marker Tracking Input
//!
//! Types delivered by the marker-tracking collaborator once per frame. A frame
//! carries three ordered batches (added, updated, removed); each entry names
//! the recognized marker, its pose and its tracking status.
//!
//! Recorded sessions are plain JSON:
//!
//! ```json
//! {
//!   "frames": [
//!     {
//!       "added":   [{ "name": "Battery", "position": [0.0, 0.0, 0.0] }],
//!       "updated": [{ "name": "Battery", "position": [0.0, 0.0, 0.0], "status": "tracking" }],
//!       "removed": []
//!     }
//!   ]
//! }
//! ```

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::ArCircuitError;

/// Position and orientation of a marker in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    #[serde(default)]
    pub position: Vec3,
    #[serde(default)]
    pub orientation: Quat,
}

impl Pose {
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Pose at `position` with identity orientation.
    pub fn at(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    pub fn distance_to(&self, other: &Pose) -> f32 {
        self.position.distance(other.position)
    }
}

/// Tracking quality reported for a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingStatus {
    /// Marker is fully tracked; pose is trustworthy.
    #[default]
    Tracking,
    /// Marker is known but its pose is stale or degraded.
    Limited,
    /// Marker is no longer tracked at all.
    Stopped,
}

impl TrackingStatus {
    pub fn is_tracking(self) -> bool {
        matches!(self, TrackingStatus::Tracking)
    }
}

/// One recognized marker as reported in a frame batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedMarker {
    pub name: String,
    #[serde(flatten)]
    pub pose: Pose,
    #[serde(default)]
    pub status: TrackingStatus,
}

impl TrackedMarker {
    pub fn new(name: impl Into<String>, pose: Pose, status: TrackingStatus) -> Self {
        Self {
            name: name.into(),
            pose,
            status,
        }
    }

    /// A fully tracked marker at `position`.
    pub fn tracking(name: impl Into<String>, position: Vec3) -> Self {
        Self::new(name, Pose::at(position), TrackingStatus::Tracking)
    }

    pub fn with_status(mut self, status: TrackingStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.pose.orientation = orientation;
        self
    }
}

/// The three batches delivered by the tracker for a single frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameEvents {
    #[serde(default)]
    pub added: Vec<TrackedMarker>,
    #[serde(default)]
    pub updated: Vec<TrackedMarker>,
    #[serde(default)]
    pub removed: Vec<TrackedMarker>,
}

impl FrameEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn added(mut self, marker: TrackedMarker) -> Self {
        self.added.push(marker);
        self
    }

    pub fn updated(mut self, marker: TrackedMarker) -> Self {
        self.updated.push(marker);
        self
    }

    pub fn removed(mut self, marker: TrackedMarker) -> Self {
        self.removed.push(marker);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

/// A recorded sequence of tracker frames, replayed in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub frames: Vec<FrameEvents>,
}

impl Session {
    pub fn from_json_str(content: &str) -> Result<Self, ArCircuitError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ArCircuitError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
