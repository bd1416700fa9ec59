//! Controller input for mixed-reality sessions.
//!
//! The XR runtime is an external collaborator: it owns device sessions and
//! delivers two discrete events per controller, *activate* (select pressed)
//! and *release* (select let go), plus a continuously updated pose. This
//! module buffers those between frames so the session can resolve raycasts
//! and dispatch events at a well-defined point in the frame.
//!
//! # Usage
//!
//! ```ignore
//! session.input_mut().set_pose(ControllerId(0), pose);
//! session.input_mut().activate(ControllerId(0));
//! session.step();
//! ```

use std::collections::HashMap;

use glam::{Quat, Vec3};

/// Identifies one pointing controller for the duration of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControllerId(pub u32);

/// A controller's position and orientation in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Pose {
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// The direction the controller points: local -Z rotated into the world.
    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
        }
    }
}

/// A discrete controller event, queued until the next frame step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControllerEvent {
    /// Select pressed while pointing somewhere.
    Activate { controller: ControllerId },
    /// Select released.
    Release { controller: ControllerId },
}

/// Buffers controller poses and discrete events between frames.
#[derive(Debug, Default)]
pub struct ControllerInput {
    poses: HashMap<ControllerId, Pose>,
    queue: Vec<ControllerEvent>,
}

impl ControllerInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the latest pose for a controller. Expected once per frame per
    /// tracked controller, but any cadence works.
    pub fn set_pose(&mut self, controller: ControllerId, pose: Pose) {
        self.poses.insert(controller, pose);
    }

    /// The most recent pose of a controller, if it has reported one.
    pub fn pose(&self, controller: ControllerId) -> Option<Pose> {
        self.poses.get(&controller).copied()
    }

    /// Queue an activate event for the next step.
    pub fn activate(&mut self, controller: ControllerId) {
        self.queue.push(ControllerEvent::Activate { controller });
    }

    /// Queue a release event for the next step.
    pub fn release(&mut self, controller: ControllerId) {
        self.queue.push(ControllerEvent::Release { controller });
    }

    /// Events queued so far this frame.
    pub fn pending(&self) -> &[ControllerEvent] {
        &self.queue
    }

    /// Drain the queued events in arrival order. Called once per step,
    /// before lifecycle and shadow updates read the results.
    pub(crate) fn drain_events(&mut self) -> Vec<ControllerEvent> {
        std::mem::take(&mut self.queue)
    }
}
