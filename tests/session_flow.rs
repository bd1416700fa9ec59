//! End-to-end tests for a full interactive session.
//!
//! These drive a [`Session`] the way the external collaborators would: the
//! scanner adds surfaces, the XR runtime writes poses and events, and every
//! frame the state visible to a renderer is checked against the lifecycle
//! rules: one container per surface, one resident core per container, a
//! target exactly while grabbed or destructing, flames torn down on their
//! own.

use glam::{Quat, Vec3};
use mrbox::{
    quad_triangles, ControllerId, CoreState, Pose, Session, SurfaceLabel,
};

const DELTA: f32 = 1.0 / 60.0;

/// A room with a screen on the far wall and a floor underneath.
fn room() -> Session {
    let mut session = Session::with_seed(2024);
    session.set_fixed_delta(Some(DELTA));
    session.add_surface(
        SurfaceLabel::Screen,
        quad_triangles(Vec3::new(0.0, 1.2, -2.0), Vec3::X * 0.8, Vec3::Y * 0.45),
    );
    session.add_surface(
        SurfaceLabel::Floor,
        quad_triangles(Vec3::ZERO, Vec3::X * 10.0, Vec3::Z * 10.0),
    );
    session
}

fn aim_at_screen(session: &mut Session, controller: ControllerId) {
    session
        .input_mut()
        .set_pose(controller, Pose::new(Vec3::new(0.0, 1.2, 0.0), Quat::IDENTITY));
}

fn check_lifecycle_rules(session: &Session) {
    for container in session.lifecycle().containers() {
        let core = session.lifecycle().core(container.core()).unwrap();
        // The container's current core is never mid-destruction: a fresh
        // one is generated before a release completes.
        assert_ne!(core.state(), CoreState::Destructing);
        assert_ne!(core.state(), CoreState::Hidden);
    }
    for core in session.lifecycle().cores() {
        assert_eq!(
            matches!(core.state(), CoreState::Grabbed | CoreState::Destructing),
            core.target().is_some()
        );
        if core.state() == CoreState::Hidden {
            assert!(!session.scene().get(core.node()).unwrap().visible);
        }
    }
}

#[test]
fn test_full_session_flow() {
    let mut session = room();
    let controller = ControllerId(0);
    aim_at_screen(&mut session, controller);

    // Activate on the bare screen: a container spawns with a resident core.
    session.input_mut().activate(controller);
    session.step();
    check_lifecycle_rules(&session);
    assert_eq!(session.lifecycle().containers().len(), 1);
    let first_core = session.lifecycle().containers()[0].core();

    // A second activate grabs the core out of the container.
    session.input_mut().activate(controller);
    session.step();
    assert_eq!(session.lifecycle().held_by(controller), Some(first_core));
    assert_eq!(
        session.lifecycle().core(first_core).unwrap().state(),
        CoreState::Grabbed
    );

    // Drag the hand around for a while; the core chases it.
    for frame in 0..30 {
        let t = frame as f32 / 30.0;
        session.input_mut().set_pose(
            controller,
            Pose::new(Vec3::new(t * 0.5, 1.2 - t * 0.3, -0.5), Quat::IDENTITY),
        );
        session.step();
        check_lifecycle_rules(&session);
    }
    let hand = Vec3::new(0.5, 0.9, -0.5);
    let home = Vec3::new(0.0, 1.2, -2.2);
    let core_node = session.lifecycle().core(first_core).unwrap().node();
    let core_pos = session.scene().world_position(core_node).unwrap();
    assert!(core_pos.distance(hand) < home.distance(hand) * 0.8);

    // Release: the container regrows, the grabbed core starts destructing.
    session.input_mut().release(controller);
    session.step();
    check_lifecycle_rules(&session);
    assert_eq!(session.lifecycle().cores().len(), 2);
    let replacement = session.lifecycle().containers()[0].core();
    assert_ne!(replacement, first_core);
    assert_eq!(
        session.lifecycle().core(first_core).unwrap().state(),
        CoreState::Destructing
    );

    // The destruction runs to completion and ignites exactly one flame.
    let mut flame_node = None;
    for _ in 0..2000 {
        session.step();
        check_lifecycle_rules(&session);
        if let Some(flame) = session.flames().next() {
            flame_node = Some(flame.node());
            break;
        }
    }
    let flame_node = flame_node.expect("destruction never ignited a flame");
    assert_eq!(
        session.lifecycle().core(first_core).unwrap().state(),
        CoreState::Hidden
    );

    // While burning, the flame publishes renderable particle instances.
    session.step();
    let flame = session.flames().next().unwrap();
    assert!(flame.instances().iter().any(|i| i.scale != 0.0));

    // The decay ramp tears the flame and its scene node down by itself.
    for _ in 0..120 {
        session.step();
        check_lifecycle_rules(&session);
    }
    assert_eq!(session.flames().count(), 0);
    assert!(!session.scene().contains(flame_node));

    // The container survives the whole exchange and is grabbable again.
    aim_at_screen(&mut session, controller);
    // Let the replacement settle back home on the pointing axis.
    for _ in 0..300 {
        session.step();
    }
    session.input_mut().activate(controller);
    session.step();
    assert_eq!(session.lifecycle().held_by(controller), Some(replacement));
}

#[test]
fn test_one_container_per_surface() {
    let mut session = room();
    let controller = ControllerId(0);
    aim_at_screen(&mut session, controller);

    session.input_mut().activate(controller);
    session.step();
    assert_eq!(session.lifecycle().containers().len(), 1);

    // Aim at a corner of the same screen, away from the resident core, and
    // activate again: the surface already has its container.
    session.input_mut().set_pose(
        controller,
        Pose::new(Vec3::new(0.6, 1.5, 0.0), Quat::IDENTITY),
    );
    session.input_mut().activate(controller);
    session.step();
    assert_eq!(session.lifecycle().containers().len(), 1);
    assert_eq!(session.lifecycle().cores().len(), 1);
}

#[test]
fn test_two_controllers_interleaved() {
    let mut session = room();
    let left = ControllerId(0);
    let right = ControllerId(1);
    aim_at_screen(&mut session, left);
    session
        .input_mut()
        .set_pose(right, Pose::new(Vec3::new(0.3, 1.0, 0.0), Quat::IDENTITY));

    // Left spawns, then grabs the core.
    session.input_mut().activate(left);
    session.step();
    session.input_mut().activate(left);
    session.step();
    let held = session.lifecycle().held_by(left).unwrap();

    // Right releases without holding anything: nothing happens.
    session.input_mut().release(right);
    session.step();
    assert_eq!(session.lifecycle().held_by(left), Some(held));
    assert_eq!(session.lifecycle().cores().len(), 1);

    // Left releases for real.
    session.input_mut().release(left);
    session.step();
    assert_eq!(session.lifecycle().held_by(left), None);
    assert_eq!(session.lifecycle().cores().len(), 2);
    check_lifecycle_rules(&session);
}

#[test]
fn test_surface_removal_mid_destruction() {
    let mut session = room();
    let controller = ControllerId(0);
    aim_at_screen(&mut session, controller);

    session.input_mut().activate(controller);
    session.step();
    session.input_mut().activate(controller);
    session.step();
    session.input_mut().release(controller);
    session.step();

    // The scanner drops the screen while a core is still falling. The
    // container stays in the world and the session keeps stepping.
    let screen = session.lifecycle().containers()[0].surface();
    session.remove_surface(screen);

    let mut ignited = false;
    for _ in 0..2000 {
        session.step();
        check_lifecycle_rules(&session);
        if session.flames().count() > 0 {
            ignited = true;
            break;
        }
    }
    assert!(ignited);
    assert!(session
        .scene()
        .contains(session.lifecycle().containers()[0].node()));
}
