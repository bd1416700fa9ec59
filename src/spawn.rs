//! Surface spawner: face classification and container construction.
//!
//! Activating on a bare `Screen` surface spawns a container: an anchored,
//! roughly six-sided open volume recessed into the struck face. Which face
//! was struck is recovered purely from the hit triangle's geometry: surface
//! proxies are axis-aligned boxes in their own frame, so exactly one axis of
//! the triangle's bounding box collapses to zero extent, and that axis (plus
//! the sign of the coordinate on it) names the face.
//!
//! Classification is a pure function so it can be tested without a scene;
//! hits that fail to classify (skewed or degenerate triangles) are a silent
//! no-op per the interaction core's degrade-don't-fail policy.

use glam::{Quat, Vec3};
use rand::rngs::SmallRng;
use std::f32::consts::FRAC_PI_2;

use crate::error::SceneError;
use crate::scene::{NodeId, NodeKind, Scene};
use crate::visuals::Matcap;

/// Tolerance for an axis extent to count as collapsed.
pub const FACE_EPSILON: f32 = 1e-5;

/// Margin subtracted from the struck face's extents to get the inner panel
/// size, so the container sits just inside the face it spawned on.
pub const PANEL_MARGIN: f32 = 0.02;

/// How deep the container recesses into the surface.
pub const CONTAINER_DEPTH: f32 = 0.4;

/// The six faces of an axis-aligned surface proxy volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Left,
    Right,
    Top,
    Bottom,
    Front,
    Back,
}

impl Face {
    /// Orientation a container takes so its opening looks out of this face.
    pub(crate) fn orientation(&self) -> Quat {
        match self {
            Face::Front | Face::Back => Quat::IDENTITY,
            Face::Left => Quat::from_rotation_y(-FRAC_PI_2),
            Face::Right => Quat::from_rotation_y(FRAC_PI_2),
            Face::Top => Quat::from_rotation_x(-FRAC_PI_2),
            Face::Bottom => Quat::from_rotation_x(FRAC_PI_2),
        }
    }
}

/// A classified hit: the struck face plus the extents that size a container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceExtents {
    pub face: Face,
    /// Extent of the face along its horizontal axis.
    pub width: f32,
    /// Extent of the face along its vertical axis.
    pub height: f32,
    /// Center of the hit triangle's bounding box, used as the container anchor.
    pub center: Vec3,
}

/// Classify which box face a hit triangle lies on.
///
/// Computes the triangle's axis-aligned bounding box and looks for an axis
/// whose extent collapses below [`FACE_EPSILON`]; the sign of the collapsed
/// coordinate picks between the axis' two faces. Returns `None` when no axis
/// collapses, meaning a skewed or non-axis-aligned hit that spawns nothing.
pub fn classify_face(triangle: &[Vec3; 3]) -> Option<FaceExtents> {
    let mut min = triangle[0];
    let mut max = triangle[0];
    for vertex in &triangle[1..] {
        min = min.min(*vertex);
        max = max.max(*vertex);
    }
    let extent = max - min;
    let center = (min + max) * 0.5;

    let (face, width, height) = if extent.x < FACE_EPSILON {
        let face = if min.x < 0.0 { Face::Left } else { Face::Right };
        (face, extent.z, extent.y)
    } else if extent.y < FACE_EPSILON {
        let face = if min.y < 0.0 { Face::Bottom } else { Face::Top };
        (face, extent.x, extent.z)
    } else if extent.z < FACE_EPSILON {
        let face = if min.z < 0.0 { Face::Back } else { Face::Front };
        (face, extent.x, extent.y)
    } else {
        return None;
    };

    Some(FaceExtents {
        face,
        width,
        height,
        center,
    })
}

/// Build the container's node tree: an oriented group at the face center
/// holding a back panel and four side panels, each doubled by an occlusion
/// mask so the real-world surface appears cut open.
///
/// Returns the container group node, parented to `surface_node`.
pub(crate) fn build_container(
    scene: &mut Scene,
    rng: &mut SmallRng,
    extents: &FaceExtents,
    surface_node: NodeId,
) -> Result<NodeId, SceneError> {
    let width = extents.width - PANEL_MARGIN;
    let height = extents.height - PANEL_MARGIN;
    let material = Matcap::random(rng);
    let half_depth = CONTAINER_DEPTH / 2.0;

    let group = scene.add(NodeKind::Group, surface_node)?;
    {
        let node = scene.get_mut(group).expect("group just added");
        node.position = extents.center;
        node.rotation = extents.face.orientation();
    }

    let mut panel = |scene: &mut Scene,
                     w: f32,
                     h: f32,
                     position: Vec3,
                     rotation: Quat|
     -> Result<(), SceneError> {
        let opaque = scene.add(
            NodeKind::Panel {
                material,
                width: w,
                height: h,
            },
            group,
        )?;
        let node = scene.get_mut(opaque).expect("panel just added");
        node.position = position;
        node.rotation = rotation;

        let mask = scene.add(NodeKind::Mask { width: w, height: h }, group)?;
        let node = scene.get_mut(mask).expect("mask just added");
        node.position = position;
        node.rotation = rotation;
        Ok(())
    };

    // Back wall, then left/right/top/bottom sides at half depth.
    panel(
        scene,
        width,
        height,
        Vec3::new(0.0, 0.0, -CONTAINER_DEPTH),
        Quat::IDENTITY,
    )?;
    panel(
        scene,
        CONTAINER_DEPTH,
        height,
        Vec3::new(-width / 2.0, 0.0, -half_depth),
        Quat::from_rotation_y(FRAC_PI_2),
    )?;
    panel(
        scene,
        CONTAINER_DEPTH,
        height,
        Vec3::new(width / 2.0, 0.0, -half_depth),
        Quat::from_rotation_y(-FRAC_PI_2),
    )?;
    panel(
        scene,
        width,
        CONTAINER_DEPTH,
        Vec3::new(0.0, height / 2.0, -half_depth),
        Quat::from_rotation_x(FRAC_PI_2),
    )?;
    panel(
        scene,
        width,
        CONTAINER_DEPTH,
        Vec3::new(0.0, -height / 2.0, -half_depth),
        Quat::from_rotation_x(-FRAC_PI_2),
    )?;

    Ok(group)
}
