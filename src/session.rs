//! Session orchestrator: one instance per running mixed-reality session.
//!
//! The session owns the scene graph, the detected surfaces, the controller
//! input buffers, the core lifecycle, and every live flame effect, and
//! advances them all in a fixed order once per frame:
//!
//! 1. drain queued controller events and dispatch them to the lifecycle,
//! 2. advance core motion, collecting completed destructions,
//! 3. ignite a flame at each destruction,
//! 4. reproject every core's shadow,
//! 5. tick flames and their decay tasks, tearing down the finished ones.
//!
//! External collaborators sit on both sides: an XR runtime feeds poses and
//! events in through [`Session::input_mut`], a scanner feeds surfaces in
//! through [`Session::add_surface`], and a renderer reads the scene graph
//! and flame instance arrays back out after each [`Session::step`].

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::decay::{DecayState, DecayTask, INITIAL_STRENGTH};
use crate::flame::Flame;
use crate::input::{ControllerEvent, ControllerInput};
use crate::lifecycle::{Destruction, LifecycleController};
use crate::raycast::Ray;
use crate::scene::{NodeKind, Scene};
use crate::surface::{Surface, SurfaceId, SurfaceLabel, SurfaceSet};
use crate::time::{FrameClock, FrameTick};

/// A flame paired with the decay task that will eventually tear it down.
struct ActiveFlame {
    flame: Flame,
    decay: DecayTask,
}

/// The top-level state of an interactive session.
pub struct Session {
    scene: Scene,
    surfaces: SurfaceSet,
    input: ControllerInput,
    lifecycle: LifecycleController,
    flames: Vec<ActiveFlame>,
    clock: FrameClock,
    rng: SmallRng,
}

impl Session {
    /// Create a session with entropy-seeded randomness.
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// Create a session with a fixed seed, for reproducible runs.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            scene: Scene::new(),
            surfaces: SurfaceSet::new(),
            input: ControllerInput::new(),
            lifecycle: LifecycleController::new(),
            flames: Vec::new(),
            clock: FrameClock::new(),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// The scene graph, for the renderer.
    #[inline]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The detected surfaces.
    #[inline]
    pub fn surfaces(&self) -> &SurfaceSet {
        &self.surfaces
    }

    /// Controller input buffers; the XR runtime writes poses and events here.
    #[inline]
    pub fn input_mut(&mut self) -> &mut ControllerInput {
        &mut self.input
    }

    /// The core lifecycle state, for inspection.
    #[inline]
    pub fn lifecycle(&self) -> &LifecycleController {
        &self.lifecycle
    }

    /// Live flame effects; each exposes an instance array for the renderer.
    pub fn flames(&self) -> impl Iterator<Item = &Flame> {
        self.flames.iter().map(|active| &active.flame)
    }

    /// Install a fixed per-frame delta for deterministic stepping.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.clock.set_fixed_delta(delta);
    }

    /// Register a surface the scanner just detected. An anchor node is
    /// created at the scene root; triangles are world-space.
    pub fn add_surface(&mut self, label: SurfaceLabel, triangles: Vec<[Vec3; 3]>) -> SurfaceId {
        let node = self.scene.add_at_root(NodeKind::Group);
        self.surfaces.add(Surface::new(label, triangles, node))
    }

    /// Drop a surface the scanner no longer tracks.
    ///
    /// A container anchored on the surface outlives it: it is re-attached at
    /// the scene root, keeping its world transform, before the surface's
    /// anchor node goes away. Stale handles are a silent no-op.
    pub fn remove_surface(&mut self, id: SurfaceId) {
        if let Some(surface) = self.surfaces.get(id) {
            let node = surface.node();
            if let Some(container) = surface
                .container()
                .and_then(|c| self.lifecycle.container(c))
            {
                let root = self.scene.root();
                let _ = self.scene.attach(container.node(), root);
            }
            let _ = self.scene.remove(node);
        }
        self.surfaces.remove(id);
    }

    /// Advance the session by one frame.
    pub fn step(&mut self) -> FrameTick {
        let tick = self.clock.tick();

        for event in self.input.drain_events() {
            match event {
                ControllerEvent::Activate { controller } => {
                    if let Some(pose) = self.input.pose(controller) {
                        self.lifecycle.activate(
                            controller,
                            Ray::from_pose(&pose),
                            &mut self.scene,
                            &mut self.surfaces,
                            &mut self.rng,
                        );
                    }
                }
                ControllerEvent::Release { controller } => {
                    self.lifecycle
                        .release(controller, &mut self.scene, &mut self.rng);
                }
            }
        }

        let destroyed = self
            .lifecycle
            .update(tick.delta_secs, &mut self.scene, &self.input);
        for destruction in destroyed {
            self.ignite(destruction, tick.now_ms);
        }

        self.lifecycle.update_shadows(&mut self.scene, &self.surfaces);
        self.update_flames(tick.now_ms);
        tick
    }

    /// Start a flame where a core just hid, with its decay already running.
    fn ignite(&mut self, destruction: Destruction, now_ms: f64) {
        let mut flame = Flame::new(&mut self.scene, destruction.position, now_ms, self.rng.gen());
        flame.set_strength(INITIAL_STRENGTH);
        self.flames.push(ActiveFlame {
            flame,
            decay: DecayTask::new(INITIAL_STRENGTH),
        });
    }

    fn update_flames(&mut self, now_ms: f64) {
        let mut index = 0;
        while index < self.flames.len() {
            let active = &mut self.flames[index];
            match active.decay.tick(now_ms) {
                DecayState::Active => {
                    active.flame.set_strength(active.decay.strength());
                    active.flame.update(now_ms);
                    index += 1;
                }
                DecayState::Finished => {
                    // Cancel before removal so the task can never apply
                    // another step to a torn-down flame.
                    active.decay.cancel();
                    let _ = self.scene.remove(active.flame.node());
                    self.flames.swap_remove(index);
                }
            }
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
