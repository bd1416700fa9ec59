//! Core lifecycle state machine.
//!
//! Each container owns one resident core at a time. Pointing at a core and
//! activating grabs it; the core chases the controller until release.
//! Releasing never puts a core back: the container immediately grows a
//! fresh replacement and the released core turns toward its own shadow,
//! closing in until it is near enough to hide and hand off to a flame
//! effect. The state machine per core is:
//!
//! ```text
//! Resident -> Grabbed -> Destructing -> Hidden (terminal)
//! ```
//!
//! with `Grabbed -> Resident` reserved for callers that drop a grab without
//! a release event (the core drifts home on its own whenever it has no
//! target). A core's target is non-null exactly while it is Grabbed or
//! Destructing; this invariant is checked every update.
//!
//! Events referencing stale or already-hidden cores are ignored without
//! error: the correctness bar here is visual plausibility, and degrading
//! silently beats halting an interactive session.

use std::collections::HashMap;

use glam::{Quat, Vec3};
use rand::rngs::SmallRng;
use rand::Rng;

use crate::error::SceneError;
use crate::input::{ControllerId, ControllerInput};
use crate::raycast::{self, Ray};
use crate::scene::{Node, NodeId, NodeKind, Scene};
use crate::shadow::Shadow;
use crate::spawn::{self, Face};
use crate::surface::{SurfaceId, SurfaceSet};
use crate::visuals::{CoreGeometry, Matcap};

/// Radius of the grab sphere around a core's center.
pub const GRAB_RADIUS: f32 = 0.1;

/// A destructing core within this distance of its shadow hides and hands
/// off to a flame.
pub const HIDE_DISTANCE: f32 = 0.05;

/// Core spin rate about its random axis, radians per second.
const SPIN_RATE: f32 = 1.0;

/// A resident core's position relative to its container.
const CORE_HOME: Vec3 = Vec3::new(0.0, 0.0, -0.2);

/// Handle to a container. Containers live for the whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerId(u32);

/// Handle to a core. Cores are never deallocated; a hidden core stays in
/// the table so outstanding handles remain valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoreId(u32);

/// Lifecycle state of a core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreState {
    /// Attached to its container, drifting toward its home position.
    Resident,
    /// Chasing the controller that grabbed it.
    Grabbed,
    /// Released; closing in on its own shadow.
    Destructing,
    /// Terminal: invisible, retained for handle stability.
    Hidden,
}

/// What a core in transit is moving toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreTarget {
    /// The controller that grabbed it.
    Controller(ControllerId),
    /// Its own shadow decal, during destruction.
    Shadow,
}

/// A core: a small decorative solid owned by a container while resident, or
/// by the scene root while in transit.
#[derive(Debug)]
pub struct Core {
    node: NodeId,
    container: ContainerId,
    shadow: Shadow,
    rotation_axis: Vec3,
    home: Vec3,
    state: CoreState,
    target: Option<CoreTarget>,
}

impl Core {
    #[inline]
    pub fn node(&self) -> NodeId {
        self.node
    }

    #[inline]
    pub fn container(&self) -> ContainerId {
        self.container
    }

    #[inline]
    pub fn shadow(&self) -> &Shadow {
        &self.shadow
    }

    #[inline]
    pub fn state(&self) -> CoreState {
        self.state
    }

    #[inline]
    pub fn target(&self) -> Option<CoreTarget> {
        self.target
    }
}

/// An anchored container spawned on a surface. Never destroyed.
#[derive(Debug)]
pub struct Container {
    node: NodeId,
    surface: SurfaceId,
    face: Face,
    width: f32,
    height: f32,
    core: CoreId,
}

impl Container {
    #[inline]
    pub fn node(&self) -> NodeId {
        self.node
    }

    #[inline]
    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    #[inline]
    pub fn face(&self) -> Face {
        self.face
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    /// The core currently owned by (or most recently generated for) this
    /// container.
    #[inline]
    pub fn core(&self) -> CoreId {
        self.core
    }
}

/// A completed destruction, reported so the owner can ignite a flame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Destruction {
    /// The core that just hid.
    pub core: CoreId,
    /// World position where the flame should ignite.
    pub position: Vec3,
}

/// Owns every container and core in the session and drives their motion.
#[derive(Default)]
pub struct LifecycleController {
    containers: Vec<Container>,
    cores: Vec<Core>,
    held: HashMap<ControllerId, CoreId>,
}

impl LifecycleController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    pub fn cores(&self) -> &[Core] {
        &self.cores
    }

    pub fn container(&self, id: ContainerId) -> Option<&Container> {
        self.containers.get(id.0 as usize)
    }

    pub fn core(&self, id: CoreId) -> Option<&Core> {
        self.cores.get(id.0 as usize)
    }

    /// The core a controller is currently holding.
    pub fn held_by(&self, controller: ControllerId) -> Option<CoreId> {
        self.held.get(&controller).copied()
    }

    /// Handle an activate event from a pointing controller.
    ///
    /// Grabbing wins over spawning: if the ray passes through a resident
    /// core's grab sphere the nearest such core is grabbed. Otherwise, a hit
    /// on a bare spawnable surface whose triangle classifies to a face
    /// spawns a new container there. Anything else is a no-op.
    pub fn activate(
        &mut self,
        controller: ControllerId,
        ray: Ray,
        scene: &mut Scene,
        surfaces: &mut SurfaceSet,
        rng: &mut SmallRng,
    ) {
        if self.held.contains_key(&controller) {
            return;
        }
        if let Some(core_id) = self.nearest_grabbable(&ray, scene) {
            let core = &mut self.cores[core_id.0 as usize];
            core.state = CoreState::Grabbed;
            core.target = Some(CoreTarget::Controller(controller));
            self.held.insert(controller, core_id);
            return;
        }
        self.try_spawn(&ray, scene, surfaces, rng);
    }

    /// Handle a release event from a controller.
    ///
    /// If the controller holds a core, the owning container first generates
    /// a replacement (a container is never left without a core), then the
    /// released core enters destruction, targeting its own shadow.
    /// Grab-and-release always destroys. Release without a grab is ignored.
    pub fn release(&mut self, controller: ControllerId, scene: &mut Scene, rng: &mut SmallRng) {
        let Some(core_id) = self.held.remove(&controller) else {
            return;
        };
        let core = &self.cores[core_id.0 as usize];
        if core.state != CoreState::Grabbed {
            return;
        }
        let container_id = core.container;
        let container_node = self.containers[container_id.0 as usize].node;
        if let Ok(replacement) = self.add_core(container_node, container_id, scene, rng) {
            self.containers[container_id.0 as usize].core = replacement;
        }

        let core = &mut self.cores[core_id.0 as usize];
        core.state = CoreState::Destructing;
        core.target = Some(CoreTarget::Shadow);
    }

    /// Advance every core's motion by `delta` seconds.
    ///
    /// Cores with a target fly at scene root toward it (three times faster
    /// while destructing); cores without drift back into their container
    /// toward home. Destructing cores close enough to their shadow hide and
    /// are reported as [`Destruction`]s, exactly once each.
    pub fn update(
        &mut self,
        delta: f32,
        scene: &mut Scene,
        input: &ControllerInput,
    ) -> Vec<Destruction> {
        let mut destroyed = Vec::new();
        let root = scene.root();

        for index in 0..self.cores.len() {
            let core = &self.cores[index];
            debug_assert_eq!(
                matches!(core.state, CoreState::Grabbed | CoreState::Destructing),
                core.target.is_some(),
                "core target must exist exactly while grabbed or destructing",
            );
            if core.state == CoreState::Hidden {
                continue;
            }
            let node = core.node;
            let shadow_node = core.shadow.node();
            let target = core.target;
            let home = core.home;
            let axis = core.rotation_axis;
            let container_node = self.containers[core.container.0 as usize].node;

            {
                let Some(n) = scene.get_mut(node) else {
                    continue;
                };
                if !n.visible {
                    continue;
                }
                n.rotation *= Quat::from_axis_angle(axis, delta * SPIN_RATE);
            }

            match target {
                Some(CoreTarget::Controller(controller)) => {
                    Self::ensure_parent(scene, node, root);
                    if let Some(pose) = input.pose(controller) {
                        Self::lerp_node(scene, node, pose.position, delta);
                    }
                }
                Some(CoreTarget::Shadow) => {
                    Self::ensure_parent(scene, node, root);
                    let Some(goal) = scene.world_position(shadow_node) else {
                        continue;
                    };
                    Self::lerp_node(scene, node, goal, delta * 3.0);
                    let reached = scene
                        .get(node)
                        .map_or(false, |n| n.position.distance(goal) < HIDE_DISTANCE);
                    if reached {
                        if let Some(n) = scene.get_mut(node) {
                            n.visible = false;
                        }
                        let core = &mut self.cores[index];
                        core.state = CoreState::Hidden;
                        core.target = None;
                        destroyed.push(Destruction {
                            core: CoreId(index as u32),
                            position: goal,
                        });
                    }
                }
                None => {
                    Self::ensure_parent(scene, node, container_node);
                    Self::lerp_node(scene, node, home, delta * 2.0);
                }
            }
        }
        destroyed
    }

    /// Reproject every core's shadow. Runs regardless of lifecycle state,
    /// as long as the core exists.
    pub fn update_shadows(&self, scene: &mut Scene, surfaces: &SurfaceSet) {
        for core in &self.cores {
            if let Some(anchor) = scene.world_position(core.node) {
                core.shadow.update(scene, surfaces, anchor);
            }
        }
    }

    /// Nearest resident core whose grab sphere the ray passes through.
    fn nearest_grabbable(&self, ray: &Ray, scene: &Scene) -> Option<CoreId> {
        let mut best: Option<(CoreId, f32)> = None;
        for (index, core) in self.cores.iter().enumerate() {
            if core.state != CoreState::Resident {
                continue;
            }
            let Some(center) = scene.world_position(core.node) else {
                continue;
            };
            if let Some(t) = ray.passes_within(center, GRAB_RADIUS) {
                if best.map_or(true, |(_, bt)| t < bt) {
                    best = Some((CoreId(index as u32), t));
                }
            }
        }
        best.map(|(id, _)| id)
    }

    /// Spawn a container from a surface hit, if the hit qualifies: the
    /// surface must be spawnable and bare, and the struck triangle must
    /// classify to a box face. Every disqualifier is a silent no-op.
    fn try_spawn(
        &mut self,
        ray: &Ray,
        scene: &mut Scene,
        surfaces: &mut SurfaceSet,
        rng: &mut SmallRng,
    ) {
        let Some(hit) = raycast::nearest_hit(ray, surfaces) else {
            return;
        };
        let Some(surface) = surfaces.get(hit.surface) else {
            return;
        };
        if !surface.label().is_spawnable() || surface.container().is_some() {
            return;
        }
        let Some(extents) = spawn::classify_face(&hit.triangle) else {
            return;
        };
        let surface_node = surface.node();
        let Ok(group) = spawn::build_container(scene, rng, &extents, surface_node) else {
            return;
        };

        let container_id = ContainerId(self.containers.len() as u32);
        let Ok(core_id) = self.add_core(group, container_id, scene, rng) else {
            return;
        };
        self.containers.push(Container {
            node: group,
            surface: hit.surface,
            face: extents.face,
            width: extents.width,
            height: extents.height,
            core: core_id,
        });
        if let Some(surface) = surfaces.get_mut(hit.surface) {
            surface.set_container(container_id);
        }
    }

    /// Create a fresh resident core inside a container: random geometry and
    /// material pairing, random rotation axis, a shadow of its own.
    fn add_core(
        &mut self,
        container_node: NodeId,
        container: ContainerId,
        scene: &mut Scene,
        rng: &mut SmallRng,
    ) -> Result<CoreId, SceneError> {
        let node = scene.add(
            NodeKind::Core {
                geometry: CoreGeometry::random(rng),
                material: Matcap::random(rng),
            },
            container_node,
        )?;
        if let Some(n) = scene.get_mut(node) {
            n.position = CORE_HOME;
        }
        let rotation_axis = Vec3::new(rng.gen::<f32>(), rng.gen::<f32>(), rng.gen::<f32>())
            .normalize_or_zero();
        let shadow = Shadow::new(scene);

        let id = CoreId(self.cores.len() as u32);
        self.cores.push(Core {
            node,
            container,
            shadow,
            rotation_axis,
            home: CORE_HOME,
            state: CoreState::Resident,
            target: None,
        });
        Ok(id)
    }

    fn ensure_parent(scene: &mut Scene, node: NodeId, parent: NodeId) {
        let current = scene.get(node).and_then(Node::parent);
        if current != Some(parent) {
            let _ = scene.attach(node, parent);
        }
    }

    fn lerp_node(scene: &mut Scene, node: NodeId, goal: Vec3, t: f32) {
        if let Some(n) = scene.get_mut(node) {
            n.position = n.position.lerp(goal, t.min(1.0));
        }
    }
}
