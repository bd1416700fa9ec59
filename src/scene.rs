//! Arena-backed scene graph of renderable nodes.
//!
//! The interaction core both reads world transforms and issues add, remove,
//! and reparent operations; an external renderer walks the same graph to draw
//! it. Nodes carry a local TRS transform, a visibility flag, and a
//! [`NodeKind`] payload describing what should be drawn.
//!
//! Two reparenting operations exist:
//!
//! - [`Scene::set_parent`] keeps the node's *local* transform, so the node
//!   jumps to wherever that transform lands under the new parent.
//! - [`Scene::attach`] keeps the node's *world* transform, recomputing the
//!   local one. This is what the core lifecycle uses when a core leaves its
//!   container mid-flight: the handoff must not visibly teleport the node.
//!
//! Node handles are index + generation pairs, so a handle to a removed node
//! is detectable rather than silently aliasing a recycled slot.

use glam::{Mat4, Quat, Vec3};

use crate::error::SceneError;
use crate::visuals::{CoreGeometry, Matcap};

/// Handle to a node in the scene graph.
///
/// Copyable and stable: once the node is removed the handle goes stale and
/// every operation on it reports [`SceneError::StaleNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

/// What an external renderer should draw for a node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Pure transform node with no geometry of its own.
    Group,
    /// Opaque quad panel using a matcap material slot.
    Panel {
        material: Matcap,
        width: f32,
        height: f32,
    },
    /// Invisible occlusion quad that writes depth but no color.
    Mask { width: f32, height: f32 },
    /// A core: small decorative solid with a random geometry/material pair.
    Core {
        geometry: CoreGeometry,
        material: Matcap,
    },
    /// Ground-contact shadow decal. Opacity is driven per frame by the
    /// shadow projector; the decal's size rides on the node's scale.
    Decal { opacity: f32 },
    /// Anchor for a flame effect; particle instances are fetched separately.
    Flame,
}

/// A node in the scene graph.
#[derive(Debug)]
pub struct Node {
    /// Local position relative to the parent.
    pub position: Vec3,
    /// Local rotation relative to the parent.
    pub rotation: Quat,
    /// Uniform local scale.
    pub scale: f32,
    /// Whether the node (and its subtree) should be drawn.
    pub visible: bool,
    /// Render payload.
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: 1.0,
            visible: true,
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    /// The node's parent, if any. The root has none.
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The node's children.
    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// The node's local transform as a matrix.
    #[inline]
    pub fn local_transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), self.rotation, self.position)
    }
}

struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// The scene graph.
pub struct Scene {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
}

impl Scene {
    /// Create a scene containing a single root group node.
    pub fn new() -> Self {
        let mut scene = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
        };
        scene.root = scene.insert(Node::new(NodeKind::Group));
        scene
    }

    /// Handle of the root node.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, including the root.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.node.is_some()).count()
    }

    /// Whether the scene holds only the root node.
    pub fn is_empty(&self) -> bool {
        self.len() == 1
    }

    /// Add a node under the given parent. The node starts at the parent's
    /// origin with identity rotation and unit scale.
    pub fn add(&mut self, kind: NodeKind, parent: NodeId) -> Result<NodeId, SceneError> {
        if self.get(parent).is_none() {
            return Err(SceneError::StaleNode(parent));
        }
        let id = self.insert(Node::new(kind));
        self.node_mut(id).parent = Some(parent);
        self.node_mut(parent).children.push(id);
        Ok(id)
    }

    /// Add a node at the scene root.
    pub fn add_at_root(&mut self, kind: NodeKind) -> NodeId {
        let root = self.root;
        self.add(kind, root).expect("root node always exists")
    }

    /// Remove a node and its entire subtree. Removing the root is not
    /// allowed and reports the root as stale.
    pub fn remove(&mut self, id: NodeId) -> Result<(), SceneError> {
        if id == self.root || self.get(id).is_none() {
            return Err(SceneError::StaleNode(id));
        }
        if let Some(parent) = self.node_mut(id).parent.take() {
            self.node_mut(parent).children.retain(|&c| c != id);
        }
        self.free_subtree(id);
        Ok(())
    }

    /// Borrow a node. `None` if the handle is stale.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    /// Mutably borrow a node. `None` if the handle is stale.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    /// Whether the handle still refers to a live node.
    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// World transform of a node, composed down from the root.
    pub fn world_transform(&self, id: NodeId) -> Option<Mat4> {
        let node = self.get(id)?;
        let local = node.local_transform();
        match node.parent() {
            Some(parent) => Some(self.world_transform(parent)? * local),
            None => Some(local),
        }
    }

    /// World-space position of a node's origin.
    pub fn world_position(&self, id: NodeId) -> Option<Vec3> {
        self.world_transform(id)
            .map(|m| m.transform_point3(Vec3::ZERO))
    }

    /// Reparent a node, keeping its local transform.
    pub fn set_parent(&mut self, id: NodeId, parent: NodeId) -> Result<(), SceneError> {
        self.check_reparent(id, parent)?;
        self.unlink(id);
        self.node_mut(id).parent = Some(parent);
        self.node_mut(parent).children.push(id);
        Ok(())
    }

    /// Reparent a node, keeping its *world* transform.
    ///
    /// The node's local TRS is recomputed against the new parent so the node
    /// does not move on screen. Mirrors `Object3D.attach` semantics.
    pub fn attach(&mut self, id: NodeId, parent: NodeId) -> Result<(), SceneError> {
        self.check_reparent(id, parent)?;
        let world = self.world_transform(id).ok_or(SceneError::StaleNode(id))?;
        let parent_world = self
            .world_transform(parent)
            .ok_or(SceneError::StaleNode(parent))?;
        let local = parent_world.inverse() * world;
        let (scale, rotation, position) = local.to_scale_rotation_translation();

        self.unlink(id);
        let node = self.node_mut(id);
        node.parent = Some(parent);
        node.position = position;
        node.rotation = rotation;
        node.scale = scale.x;
        self.node_mut(parent).children.push(id);
        Ok(())
    }

    fn check_reparent(&self, id: NodeId, parent: NodeId) -> Result<(), SceneError> {
        if self.get(id).is_none() || id == self.root {
            return Err(SceneError::StaleNode(id));
        }
        if self.get(parent).is_none() {
            return Err(SceneError::StaleNode(parent));
        }
        // Walk up from the new parent; finding the node means a cycle.
        let mut cursor = Some(parent);
        while let Some(current) = cursor {
            if current == id {
                return Err(SceneError::WouldCycle { node: id, parent });
            }
            cursor = self.get(current).and_then(Node::parent);
        }
        Ok(())
    }

    fn unlink(&mut self, id: NodeId) {
        if let Some(parent) = self.node_mut(id).parent.take() {
            self.node_mut(parent).children.retain(|&c| c != id);
        }
    }

    fn insert(&mut self, node: Node) -> NodeId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            NodeId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            NodeId {
                index,
                generation: 0,
            }
        }
    }

    fn free_subtree(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.node_mut(id).children);
        for child in children {
            self.free_subtree(child);
        }
        let slot = &mut self.slots[id.index as usize];
        slot.node = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
    }

    /// Internal accessor for handles known to be live.
    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.get_mut(id).expect("node handle validated by caller")
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
