//! Detected real-world surfaces usable as raycast targets.
//!
//! An external scanning collaborator discovers planar and mesh surfaces in
//! the user's room and feeds them into a [`SurfaceSet`]. The set may grow or
//! shrink between frames as scanning progresses; everything in this crate
//! re-reads it each frame and tolerates additions and removals at any frame
//! boundary.
//!
//! Surfaces are triangle soups expressed in world space, each carrying a
//! semantic label. Only `Screen`-labeled surfaces accept spawned containers;
//! every surface acts as a shadow receiver.

use glam::Vec3;

use crate::lifecycle::ContainerId;
use crate::scene::NodeId;

/// Semantic label attached to a detected surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceLabel {
    /// A wall-mounted screen; the only label containers spawn on.
    Screen,
    Wall,
    Floor,
    Ceiling,
    Table,
    /// Anything the scanner could not classify.
    Other,
}

impl SurfaceLabel {
    /// Whether activating on this surface may spawn a container.
    #[inline]
    pub fn is_spawnable(&self) -> bool {
        matches!(self, SurfaceLabel::Screen)
    }
}

/// Handle to a surface in a [`SurfaceSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId {
    index: u32,
    generation: u32,
}

/// A detected surface proxy: world-space triangles plus a semantic label.
#[derive(Debug)]
pub struct Surface {
    label: SurfaceLabel,
    triangles: Vec<[Vec3; 3]>,
    node: NodeId,
    container: Option<ContainerId>,
}

impl Surface {
    /// Create a surface proxy anchored at the given scene node.
    ///
    /// Triangles are expected in world space; the anchor node lives at the
    /// scene root so spawned containers inherit no extra transform.
    pub fn new(label: SurfaceLabel, triangles: Vec<[Vec3; 3]>, node: NodeId) -> Self {
        Self {
            label,
            triangles,
            node,
            container: None,
        }
    }

    #[inline]
    pub fn label(&self) -> SurfaceLabel {
        self.label
    }

    #[inline]
    pub fn triangles(&self) -> &[[Vec3; 3]] {
        &self.triangles
    }

    /// The scene node containers on this surface are parented to.
    #[inline]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The container anchored on this surface, if one has been spawned.
    /// At most one container exists per surface for the whole session.
    #[inline]
    pub fn container(&self) -> Option<ContainerId> {
        self.container
    }

    pub(crate) fn set_container(&mut self, container: ContainerId) {
        self.container = Some(container);
    }
}

/// The dynamically-sized collection of detected surfaces.
#[derive(Default)]
pub struct SurfaceSet {
    slots: Vec<(u32, Option<Surface>)>,
    free: Vec<u32>,
}

impl SurfaceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a newly detected surface.
    pub fn add(&mut self, surface: Surface) -> SurfaceId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.1 = Some(surface);
            SurfaceId {
                index,
                generation: slot.0,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push((0, Some(surface)));
            SurfaceId {
                index,
                generation: 0,
            }
        }
    }

    /// Drop a surface the scanner no longer tracks. Stale handles are a
    /// silent no-op; the scanner may race a removal against this core.
    pub fn remove(&mut self, id: SurfaceId) {
        if let Some(slot) = self.slots.get_mut(id.index as usize) {
            if slot.0 == id.generation && slot.1.is_some() {
                slot.1 = None;
                slot.0 = slot.0.wrapping_add(1);
                self.free.push(id.index);
            }
        }
    }

    pub fn get(&self, id: SurfaceId) -> Option<&Surface> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.0 == id.generation)
            .and_then(|slot| slot.1.as_ref())
    }

    pub fn get_mut(&mut self, id: SurfaceId) -> Option<&mut Surface> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.0 == id.generation)
            .and_then(|slot| slot.1.as_mut())
    }

    /// Iterate over all live surfaces.
    pub fn iter(&self) -> impl Iterator<Item = (SurfaceId, &Surface)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.1.as_ref().map(|surface| {
                (
                    SurfaceId {
                        index: index as u32,
                        generation: slot.0,
                    },
                    surface,
                )
            })
        })
    }

    /// Number of live surfaces.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.1.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build the two world-space triangles of an axis-aligned rectangle.
///
/// Convenience for feeding quads (screens, floors, tables) into a
/// [`SurfaceSet`]; `axis_u` and `axis_v` span the rectangle from `center`.
pub fn quad_triangles(center: Vec3, axis_u: Vec3, axis_v: Vec3) -> Vec<[Vec3; 3]> {
    let a = center - axis_u - axis_v;
    let b = center + axis_u - axis_v;
    let c = center + axis_u + axis_v;
    let d = center - axis_u + axis_v;
    vec![[a, b, c], [a, c, d]]
}
