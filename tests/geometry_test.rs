use std::f32::consts::{FRAC_PI_2, PI};

use cgmath::{Point3, Rad, Vector2, Vector3};
use layer_cake::data_structures::{
    geometry::{Bounds, Geometry},
    instance::Instance,
    shape::Shape,
};

fn close(a: f32, b: f32, relative: f32) -> bool {
    (a - b).abs() <= relative * b.abs()
}

#[test]
fn should_build_closed_cylinder() {
    let geometry = Geometry::cylinder(2.4, 2.4, 0.16, 64);
    let bounds = geometry.bounds();
    assert!((bounds.max.y - 0.08).abs() < 1e-6);
    assert!((bounds.min.y + 0.08).abs() < 1e-6);
    assert!((bounds.max.x - 2.4).abs() < 1e-4);
    assert!(close(geometry.signed_volume(), PI * 2.4 * 2.4 * 0.16, 0.01));
}

#[test]
fn should_build_sphere_around_origin() {
    let geometry = Geometry::sphere(0.09, 16, 16);
    let bounds = geometry.bounds();
    assert!(bounds.center().x.abs() < 1e-6 && bounds.center().y.abs() < 1e-6);
    assert!((bounds.size().y - 0.18).abs() < 1e-5);
    assert!(close(geometry.signed_volume(), 4.0 / 3.0 * PI * 0.09f32.powi(3), 0.1));
}

#[test]
fn should_build_plane_facing_z() {
    let geometry = Geometry::plane(20.0, 20.0);
    assert_eq!(geometry.triangle_count(), 2);
    assert_eq!(geometry.bounds().size(), Vector3::new(20.0, 20.0, 0.0));
    for vertex in &geometry.vertices {
        assert_eq!(vertex.normal, [0.0, 0.0, 1.0]);
    }
}

#[test]
fn should_lathe_a_closed_profile_outwards() {
    let profile = [
        Vector2::new(0.0, -1.0),
        Vector2::new(1.0, -1.0),
        Vector2::new(1.0, 1.0),
        Vector2::new(0.0, 1.0),
    ];
    let geometry = Geometry::lathe(&profile, 64);
    assert!(close(geometry.signed_volume(), 2.0 * PI, 0.01));
    assert!(Geometry::lathe(&profile[..1], 64).vertices.is_empty());
}

#[test]
fn should_extrude_square_with_outward_faces() {
    let mut square = Shape::new();
    square
        .line_to(0.0, 0.0)
        .line_to(1.0, 0.0)
        .line_to(1.0, 1.0)
        .line_to(0.0, 1.0)
        .close_path();
    let geometry = Geometry::extrude(&square, 2.0);
    assert!(close(geometry.signed_volume(), 2.0, 1e-4));
    assert_eq!(geometry.bounds().size(), Vector3::new(1.0, 1.0, 2.0));
}

#[test]
fn should_cap_concave_outlines() {
    // A comb with two teeth: no single point sees the whole outline
    let mut comb = Shape::new();
    comb.line_to(0.0, 0.0)
        .line_to(5.0, 0.0)
        .line_to(5.0, 3.0)
        .line_to(4.0, 3.0)
        .line_to(4.0, 1.0)
        .line_to(3.0, 1.0)
        .line_to(3.0, 3.0)
        .line_to(2.0, 3.0)
        .line_to(2.0, 1.0)
        .line_to(1.0, 1.0)
        .line_to(1.0, 3.0)
        .line_to(0.0, 3.0)
        .close_path();
    let area = 15.0 - 2.0 * 2.0;
    assert!(close(comb.signed_area(), area, 1e-5));

    let fill = comb.fill().unwrap();
    let covered: f32 = fill
        .indices
        .chunks_exact(3)
        .map(|t| {
            let (a, b, c) = (fill.vertices[t[0] as usize], fill.vertices[t[1] as usize], fill.vertices[t[2] as usize]);
            ((b - a).perp_dot(c - a) * 0.5).abs()
        })
        .sum();
    assert!(close(covered, area, 1e-4));

    let geometry = Geometry::extrude(&comb, 0.5);
    assert!(close(geometry.signed_volume(), area * 0.5, 1e-4));
}

#[test]
fn should_not_extrude_open_outlines() {
    let mut open = Shape::new();
    open.line_to(0.0, 0.0).line_to(1.0, 0.0).line_to(1.0, 1.0);
    assert!(!open.is_closed());
    assert!(Geometry::extrude(&open, 1.0).vertices.is_empty());
}

#[test]
fn should_center_on_bounding_box() {
    let mut geometry = Geometry::cylinder(1.0, 1.0, 2.0, 16);
    geometry.translate(Vector3::new(3.0, 4.0, 5.0));
    let offset = geometry.center();
    assert!((offset - Vector3::new(-3.0, -4.0, -5.0)).x.abs() < 1e-5);
    let center = geometry.bounds().center();
    assert!(center.x.abs() < 1e-5 && center.y.abs() < 1e-5 && center.z.abs() < 1e-5);
}

#[test]
fn should_scale_vertically() {
    let geometry = Geometry::cylinder(0.07, 0.07, 0.45, 12).scaled(1.0, 1.2, 1.0);
    assert!((geometry.bounds().size().y - 0.54).abs() < 1e-5);
    assert!(geometry.signed_volume() > 0.0);
}

#[test]
fn should_clamp_degenerate_parameters() {
    let geometry = Geometry::cylinder(1.0, 1.0, -3.0, 0);
    assert!(geometry.bounds().size().y > 0.0);
    assert!(geometry.triangle_count() > 0);
}

#[test]
fn should_merge_bounds() {
    let mut a = Bounds::empty();
    assert!(a.is_empty());
    a.include(Point3::new(0.0, 0.0, 0.0));
    let mut b = Bounds::empty();
    b.include(Point3::new(1.0, 2.0, 3.0));
    let merged = a.union(&b);
    assert_eq!(merged.size(), Vector3::new(1.0, 2.0, 3.0));
    assert_eq!(a.union(&Bounds::empty()), a);
}

#[test]
fn should_compose_parent_and_local_transforms() {
    let parent = Instance::from_position(0.0, 1.0, 0.0).with_rotation_y(Rad(FRAC_PI_2));
    let local = Instance::from_position(1.0, 0.0, 0.0);
    let world = &parent * &local;

    let origin = world.origin();
    assert!(origin.x.abs() < 1e-6);
    assert!((origin.y - 1.0).abs() < 1e-6);
    assert!((origin.z + 1.0).abs() < 1e-6);

    let via_matrix = parent.to_matrix() * local.to_matrix();
    let expected = cgmath::Transform::transform_point(&via_matrix, Point3::new(0.5, 0.5, 0.5));
    let actual = world.transform_point(Point3::new(0.5, 0.5, 0.5));
    assert!((expected.x - actual.x).abs() < 1e-5);
    assert!((expected.y - actual.y).abs() < 1e-5);
    assert!((expected.z - actual.z).abs() < 1e-5);
}
