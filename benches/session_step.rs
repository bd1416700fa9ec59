//! Benchmarks for per-frame CPU cost of a running session.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;

use mrbox::{quad_triangles, ControllerId, Pose, Quat, Session, SurfaceLabel};

const DELTA: f32 = 1.0 / 60.0;

fn session_with_room() -> Session {
    let mut session = Session::with_seed(1234);
    session.set_fixed_delta(Some(DELTA));
    session.add_surface(
        SurfaceLabel::Screen,
        quad_triangles(Vec3::new(0.0, 1.2, -2.0), Vec3::X * 0.8, Vec3::Y * 0.45),
    );
    session.add_surface(
        SurfaceLabel::Floor,
        quad_triangles(Vec3::ZERO, Vec3::X * 5.0, Vec3::Z * 5.0),
    );
    session.add_surface(
        SurfaceLabel::Wall,
        quad_triangles(Vec3::new(0.0, 1.5, -2.5), Vec3::X * 5.0, Vec3::Y * 1.5),
    );
    session
}

/// Spawn a container, then grab and release the core so a flame is burning.
fn ignite_one_flame(session: &mut Session) {
    let controller = ControllerId(0);
    let aim = Pose::new(
        Vec3::new(0.0, 1.2, 0.0),
        Quat::IDENTITY,
    );
    session.input_mut().set_pose(controller, aim);

    session.input_mut().activate(controller);
    session.step();
    session.input_mut().activate(controller);
    session.step();
    session.input_mut().release(controller);
    session.step();

    // Run the destruction to completion; the flame ignites on the way.
    for _ in 0..600 {
        session.step();
        if session.flames().count() > 0 {
            return;
        }
    }
}

fn bench_idle_step(c: &mut Criterion) {
    c.bench_function("step_idle", |b| {
        let mut session = session_with_room();
        b.iter(|| black_box(session.step()))
    });
}

fn bench_step_with_flame(c: &mut Criterion) {
    c.bench_function("step_with_flame", |b| {
        let mut session = session_with_room();
        ignite_one_flame(&mut session);
        // The flame burns out a few frames in; the measurement covers the
        // mixed tail of motion, shadows, and particle updates.
        b.iter(|| black_box(session.step()))
    });
}

fn bench_step_many_cores(c: &mut Criterion) {
    let mut group = c.benchmark_group("step_cores");
    for surfaces in [1u32, 4, 16] {
        group.bench_with_input(
            BenchmarkId::new("screens", surfaces),
            &surfaces,
            |b, &surfaces| {
                let mut session = Session::with_seed(99);
                session.set_fixed_delta(Some(DELTA));
                session.add_surface(
                    SurfaceLabel::Floor,
                    quad_triangles(Vec3::ZERO, Vec3::X * 20.0, Vec3::Z * 20.0),
                );
                let controller = ControllerId(0);
                for i in 0..surfaces {
                    let x = i as f32 * 2.0;
                    session.add_surface(
                        SurfaceLabel::Screen,
                        quad_triangles(
                            Vec3::new(x, 1.2, -2.0),
                            Vec3::X * 0.8,
                            Vec3::Y * 0.45,
                        ),
                    );
                    session
                        .input_mut()
                        .set_pose(controller, Pose::new(Vec3::new(x, 1.2, 0.0), Quat::IDENTITY));
                    session.input_mut().activate(controller);
                    session.step();
                }
                b.iter(|| black_box(session.step()))
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_idle_step,
    bench_step_with_flame,
    bench_step_many_cores,
);
criterion_main!(benches);
