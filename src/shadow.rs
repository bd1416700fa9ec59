//! Ground-contact shadow projector.
//!
//! Every core owns one shadow: a stylized circular decal that hugs whatever
//! real-world surface lies directly beneath the core. This is not a shadow
//! map; it is a continuous downward raycast that repositions, fades, and
//! shrinks a decal each frame. Contact within 0.1 units renders it fully
//! opaque at full size; by 0.35 units it has faded and shrunk to nothing.
//!
//! When no surface lies below (scanning has not found one yet, or the core
//! drifted past the room bounds), the decal keeps its last appearance rather
//! than vanishing; the set of receivers can grow at any frame boundary and
//! the decal picks back up on the next hit.

use glam::Vec3;

use crate::raycast::{self, Ray};
use crate::scene::{NodeId, NodeKind, Scene};
use crate::surface::SurfaceSet;

/// Decal radius before distance scaling.
pub const DECAL_RADIUS: f32 = 0.15;

/// Vertical lift above the hit point, avoiding z-fighting with the receiver.
pub const DECAL_LIFT: f32 = 0.002;

/// Contact distance at which the decal is fully opaque and full-size.
const NEAR_DISTANCE: f32 = 0.1;

/// Distance at which the decal has faded and shrunk to nothing.
const FAR_DISTANCE: f32 = 0.35;

/// A core's shadow decal, parented at the scene root.
#[derive(Debug, Clone, Copy)]
pub struct Shadow {
    node: NodeId,
}

impl Shadow {
    /// Create the decal node at the scene root, fully opaque.
    pub fn new(scene: &mut Scene) -> Self {
        let node = scene.add_at_root(NodeKind::Decal { opacity: 1.0 });
        Self { node }
    }

    /// The decal's scene node.
    #[inline]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Map a downward hit distance into the decal's opacity/scale value.
    ///
    /// `1.0` at contact, falling linearly to `0.0` at [`FAR_DISTANCE`].
    pub fn contact_strength(distance: f32) -> f32 {
        let factor = (distance.clamp(NEAR_DISTANCE, FAR_DISTANCE) - NEAR_DISTANCE)
            / (FAR_DISTANCE - NEAR_DISTANCE);
        1.0 - factor
    }

    /// Reproject the decal beneath `anchor_world` against the current
    /// surface set. A miss leaves the decal exactly as it was.
    pub fn update(&self, scene: &mut Scene, surfaces: &SurfaceSet, anchor_world: Vec3) {
        let ray = Ray::new(anchor_world, Vec3::NEG_Y);
        let Some(hit) = raycast::nearest_hit(&ray, surfaces) else {
            return;
        };
        let strength = Self::contact_strength(hit.distance);
        if let Some(node) = scene.get_mut(self.node) {
            node.position = hit.point + Vec3::Y * DECAL_LIFT;
            node.scale = strength;
            if let NodeKind::Decal { opacity } = &mut node.kind {
                *opacity = strength;
            }
        }
    }
}
