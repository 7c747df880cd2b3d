use std::f32::consts::PI;

use cgmath::{Deg, InnerSpace, MetricSpace, Point3, Rad};
use instant::Duration;
use layer_cake::camera::{Camera, OrbitController, Projection, orbit_angles};

const FRAME: Duration = Duration::from_micros(16_667);

fn camera() -> Camera {
    Camera::new([4.2, 4.0, 4.2], [0.0, 0.0, 0.0])
}

fn fovy() -> Rad<f32> {
    Deg(40.0).into()
}

fn undamped() -> OrbitController {
    let mut controller = OrbitController::default();
    controller.enable_damping = false;
    controller.set_viewport_height(600);
    controller
}

fn damped() -> OrbitController {
    let mut controller = OrbitController::new(0.05);
    controller.set_viewport_height(600);
    controller
}

#[test]
fn should_not_move_without_input() {
    let mut cam = camera();
    let start = cam;
    let mut controller = damped();
    assert!(controller.is_idle());
    for _ in 0..120 {
        controller.update(&mut cam, fovy(), FRAME);
    }
    assert!(cam.position.distance(start.position) < 1e-4);
    assert_eq!(cam.target, start.target);
}

#[test]
fn should_converge_to_undamped_rotation() {
    let mut expected = camera();
    let mut controller = undamped();
    controller.rotate(120.0, -40.0);
    controller.update(&mut expected, fovy(), FRAME);

    let mut cam = camera();
    let mut controller = damped();
    controller.rotate(120.0, -40.0);
    controller.update(&mut cam, fovy(), FRAME);
    let after_one_frame = cam.position.distance(camera().position);
    assert!(after_one_frame > 0.0);
    assert!(after_one_frame < expected.position.distance(camera().position));

    for _ in 0..600 {
        controller.update(&mut cam, fovy(), FRAME);
    }
    assert!(cam.position.distance(expected.position) < 1e-3);
    assert!(controller.is_idle());
}

#[test]
fn should_damp_independently_of_frame_rate() {
    let mut at_60 = camera();
    let mut controller = damped();
    controller.rotate(200.0, 0.0);
    for _ in 0..60 {
        controller.update(&mut at_60, fovy(), FRAME);
    }

    let mut at_30 = camera();
    let mut controller = damped();
    controller.rotate(200.0, 0.0);
    for _ in 0..30 {
        controller.update(&mut at_30, fovy(), FRAME * 2);
    }

    assert!(at_60.position.distance(at_30.position) < 1e-3);
}

#[test]
fn should_keep_distance_while_rotating() {
    let mut cam = camera();
    let distance = cam.distance();
    let mut controller = undamped();
    controller.rotate(300.0, 0.0);
    controller.update(&mut cam, fovy(), FRAME);
    assert!((cam.distance() - distance).abs() < 1e-4);
}

#[test]
fn should_clamp_polar_angle() {
    for dy in [-100_000.0, 100_000.0] {
        let mut cam = camera();
        let mut controller = undamped();
        controller.rotate(0.0, dy);
        controller.update(&mut cam, fovy(), FRAME);

        let (_, phi) = orbit_angles(cam.position, cam.target);
        assert!((0.0..=PI).contains(&phi), "phi = {phi}");
        let view: [[f32; 4]; 4] = cam.calc_matrix().into();
        assert!(view.iter().flatten().all(|v| v.is_finite()));
        assert!((cam.distance() - camera().distance()).abs() < 1e-3);
    }

    let mut cam = camera();
    let mut controller = undamped();
    controller.max_polar_angle = PI / 2.0;
    controller.rotate(0.0, -100_000.0);
    controller.update(&mut cam, fovy(), FRAME);
    assert!(cam.position.y >= -1e-4);
    assert!(cam.position.y < 1e-3);
}

#[test]
fn should_dolly_towards_target() {
    let mut cam = camera();
    let distance = cam.distance();
    let mut controller = damped();
    controller.dolly(1.0);
    controller.update(&mut cam, fovy(), FRAME);
    assert!((cam.distance() - distance * 0.95).abs() < 1e-4);

    controller.dolly(-2.0);
    controller.update(&mut cam, fovy(), FRAME);
    assert!((cam.distance() - distance * 0.95 / (0.95 * 0.95)).abs() < 1e-3);
}

#[test]
fn should_respect_distance_limits() {
    let mut cam = camera();
    let mut controller = undamped();
    controller.min_distance = 5.0;
    controller.dolly(50.0);
    controller.update(&mut cam, fovy(), FRAME);
    assert!((cam.distance() - 5.0).abs() < 1e-4);
}

#[test]
fn should_pan_target_and_camera_together() {
    let mut cam = camera();
    let offset = cam.position - cam.target;
    let mut controller = undamped();
    controller.pan(50.0, 0.0);
    controller.update(&mut cam, fovy(), FRAME);

    assert!(cam.target.distance(Point3::new(0.0, 0.0, 0.0)) > 0.01);
    assert!(((cam.position - cam.target) - offset).magnitude() < 1e-3);
    // Horizontal drags keep the target on its plane
    assert!(cam.target.y.abs() < 1e-4);
}

#[test]
fn should_change_aspect_only_on_resize() {
    let mut projection = Projection::new(800, 600, Deg(40.0), 0.1, 100.0);
    let fovy = projection.fovy;
    projection.resize(1600, 600);
    assert!((projection.aspect() - 1600.0 / 600.0).abs() < 1e-6);
    assert_eq!(projection.fovy, fovy);
    assert_eq!((projection.znear, projection.zfar), (0.1, 100.0));

    projection.resize(0, 600);
    projection.resize(1600, 0);
    assert!((projection.aspect() - 1600.0 / 600.0).abs() < 1e-6);
}

#[test]
fn should_measure_angles_from_z_towards_x() {
    let (theta, phi) = orbit_angles(Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 0.0, 0.0));
    assert!((theta - PI / 2.0).abs() < 1e-6);
    assert!((phi - PI / 2.0).abs() < 1e-6);

    let (theta, phi) = orbit_angles(Point3::new(0.0, 2.0, 0.0), Point3::new(0.0, 0.0, 0.0));
    assert_eq!(theta, 0.0);
    assert!(phi.abs() < 1e-6);
}
