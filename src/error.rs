//! Error types for mrbox.
//!
//! The interaction core itself never fails: malformed hits, stale cores, and
//! missing shadow receivers all degrade silently into no-ops. Errors only
//! exist at the scene-graph seam, where a caller can hold a handle to a node
//! that no longer exists or request a reparent that would create a cycle.

use std::fmt;

use crate::scene::NodeId;

/// Errors that can occur when manipulating the scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneError {
    /// The node handle refers to a node that has been removed.
    StaleNode(NodeId),
    /// Reparenting the node under the given parent would create a cycle.
    WouldCycle { node: NodeId, parent: NodeId },
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::StaleNode(id) => write!(f, "Scene node {:?} no longer exists", id),
            SceneError::WouldCycle { node, parent } => write!(
                f,
                "Attaching node {:?} under {:?} would create a cycle",
                node, parent
            ),
        }
    }
}

impl std::error::Error for SceneError {}
