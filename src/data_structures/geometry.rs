//! CPU-side triangle meshes and procedural primitives.
//!
//! Geometries are built once, never mutated after they are handed to a scene node, and uploaded
//! to the GPU as a single vertex + index buffer pair. Primitives follow the usual right-handed,
//! Y-up conventions: cylinders and spheres are centred on the origin, planes lie in XY facing +Z,
//! lathes revolve around Y and extrusions push a shape from z = 0 to z = depth.
//!
//! Triangle winding is derived from the intended outward direction of each face, so every closed
//! primitive has a positive [`Geometry::signed_volume`] and survives back-face culling.

use std::f32::consts::{PI, TAU};

use cgmath::{EuclideanSpace, InnerSpace, Matrix4, Point3, Transform, Vector2, Vector3, Zero};
use log::warn;

use crate::data_structures::{model::ModelVertex, shape::Shape};

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Bounds {
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn include(&mut self, p: Point3<f32>) {
        self.min = Point3::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z));
        self.max = Point3::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z));
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        let mut bounds = *self;
        if !other.is_empty() {
            bounds.include(other.min);
            bounds.include(other.max);
        }
        bounds
    }

    pub fn size(&self) -> Vector3<f32> {
        if self.is_empty() {
            return Vector3::zero();
        }
        self.max - self.min
    }

    pub fn center(&self) -> Point3<f32> {
        if self.is_empty() {
            return Point3::origin();
        }
        self.min.midpoint(self.max)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Geometry {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

impl Geometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_vertex(&mut self, position: Vector3<f32>, normal: Vector3<f32>, uv: Vector2<f32>) -> u32 {
        self.vertices.push(ModelVertex {
            position: position.into(),
            tex_coords: uv.into(),
            normal: normal.into(),
        });
        (self.vertices.len() - 1) as u32
    }

    pub fn add_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Adds the triangle wound so that its face normal points along `outward`.
    /// Degenerate triangles (zero area) are skipped.
    pub fn add_facing_triangle(&mut self, a: u32, b: u32, c: u32, outward: Vector3<f32>) {
        let pa = self.position(a);
        let face = (self.position(b) - pa).cross(self.position(c) - pa);
        if face.magnitude2() < 1e-14 {
            return;
        }
        if face.dot(outward) >= 0.0 {
            self.add_triangle(a, b, c);
        } else {
            self.add_triangle(a, c, b);
        }
    }

    fn position(&self, index: u32) -> Vector3<f32> {
        self.vertices[index as usize].position.into()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn bounds(&self) -> Bounds {
        let mut bounds = Bounds::empty();
        for vertex in &self.vertices {
            bounds.include(vertex.position.into());
        }
        bounds
    }

    /// Bounds of the geometry after applying `matrix` to every vertex.
    pub fn transformed_bounds(&self, matrix: &Matrix4<f32>) -> Bounds {
        let mut bounds = Bounds::empty();
        for vertex in &self.vertices {
            bounds.include(matrix.transform_point(vertex.position.into()));
        }
        bounds
    }

    pub fn translate(&mut self, offset: Vector3<f32>) {
        for vertex in &mut self.vertices {
            let p = Vector3::from(vertex.position) + offset;
            vertex.position = p.into();
        }
    }

    /// Moves the centre of the bounding box onto the origin and returns the applied offset.
    pub fn center(&mut self) -> Vector3<f32> {
        let offset = -self.bounds().center().to_vec();
        self.translate(offset);
        offset
    }

    pub fn scale(&mut self, x: f32, y: f32, z: f32) {
        for vertex in &mut self.vertices {
            let [px, py, pz] = vertex.position;
            vertex.position = [px * x, py * y, pz * z];
            let [nx, ny, nz] = vertex.normal;
            let n = Vector3::new(nx / x, ny / y, nz / z);
            if n.magnitude2() > 0.0 {
                vertex.normal = n.normalize().into();
            }
        }
    }

    pub fn scaled(&self, x: f32, y: f32, z: f32) -> Geometry {
        let mut geometry = self.clone();
        geometry.scale(x, y, z);
        geometry
    }

    /// Sum of the signed tetrahedra spanned by each triangle and the origin.
    /// Positive for closed meshes whose faces point outwards.
    pub fn signed_volume(&self) -> f32 {
        self.indices
            .chunks_exact(3)
            .map(|tri| {
                let a = self.position(tri[0]);
                let b = self.position(tri[1]);
                let c = self.position(tri[2]);
                a.dot(b.cross(c)) / 6.0
            })
            .sum()
    }

    /// Cylinder (or cone) along Y with caps, centred on the origin.
    pub fn cylinder(radius_top: f32, radius_bottom: f32, height: f32, radial_segments: u32) -> Geometry {
        let radius_top = clamp_non_negative("cylinder", "radius_top", radius_top);
        let radius_bottom = clamp_non_negative("cylinder", "radius_bottom", radius_bottom);
        let height = clamp_positive("cylinder", "height", height);
        let segments = radial_segments.clamp(3, 512);

        let mut geometry = Geometry::new();
        let half = height * 0.5;
        let slope = (radius_bottom - radius_top) / height;

        let mut top_ring = Vec::with_capacity(segments as usize + 1);
        let mut bottom_ring = Vec::with_capacity(segments as usize + 1);
        for i in 0..=segments {
            let u = i as f32 / segments as f32;
            let theta = u * TAU;
            let (sin, cos) = theta.sin_cos();
            let normal = Vector3::new(sin, slope, cos).normalize();
            top_ring.push(geometry.add_vertex(
                Vector3::new(radius_top * sin, half, radius_top * cos),
                normal,
                Vector2::new(u, 0.0),
            ));
            bottom_ring.push(geometry.add_vertex(
                Vector3::new(radius_bottom * sin, -half, radius_bottom * cos),
                normal,
                Vector2::new(u, 1.0),
            ));
        }
        for i in 0..segments as usize {
            let mid = ((i as f32 + 0.5) / segments as f32) * TAU;
            let outward = Vector3::new(mid.sin(), slope, mid.cos());
            let (a, b) = (top_ring[i], top_ring[i + 1]);
            let (c, d) = (bottom_ring[i], bottom_ring[i + 1]);
            geometry.add_facing_triangle(a, c, b, outward);
            geometry.add_facing_triangle(c, d, b, outward);
        }

        for (radius, y, normal) in [
            (radius_top, half, Vector3::unit_y()),
            (radius_bottom, -half, -Vector3::unit_y()),
        ] {
            if radius <= 0.0 {
                continue;
            }
            let centre = geometry.add_vertex(Vector3::new(0.0, y, 0.0), normal, Vector2::new(0.5, 0.5));
            let ring: Vec<u32> = (0..=segments)
                .map(|i| {
                    let theta = i as f32 / segments as f32 * TAU;
                    let (sin, cos) = theta.sin_cos();
                    geometry.add_vertex(
                        Vector3::new(radius * sin, y, radius * cos),
                        normal,
                        Vector2::new(cos * 0.5 + 0.5, sin * 0.5 * normal.y + 0.5),
                    )
                })
                .collect();
            for pair in ring.windows(2) {
                geometry.add_facing_triangle(centre, pair[0], pair[1], normal);
            }
        }
        geometry
    }

    /// UV sphere with smooth normals, centred on the origin.
    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Geometry {
        let radius = clamp_positive("sphere", "radius", radius);
        let width_segments = width_segments.clamp(3, 512);
        let height_segments = height_segments.clamp(2, 512);

        let mut geometry = Geometry::new();
        let mut grid = Vec::with_capacity(height_segments as usize + 1);
        for iy in 0..=height_segments {
            let v = iy as f32 / height_segments as f32;
            let phi = v * PI;
            let row: Vec<u32> = (0..=width_segments)
                .map(|ix| {
                    let u = ix as f32 / width_segments as f32;
                    let theta = u * TAU;
                    let normal = Vector3::new(
                        -theta.cos() * phi.sin(),
                        phi.cos(),
                        theta.sin() * phi.sin(),
                    );
                    geometry.add_vertex(normal * radius, normal, Vector2::new(u, v))
                })
                .collect();
            grid.push(row);
        }
        for iy in 0..height_segments as usize {
            for ix in 0..width_segments as usize {
                let a = grid[iy][ix + 1];
                let b = grid[iy][ix];
                let c = grid[iy + 1][ix];
                let d = grid[iy + 1][ix + 1];
                let outward = geometry.position(a)
                    + geometry.position(b)
                    + geometry.position(c)
                    + geometry.position(d);
                geometry.add_facing_triangle(a, b, d, outward);
                geometry.add_facing_triangle(b, c, d, outward);
            }
        }
        geometry
    }

    /// Single quad in the XY plane facing +Z, centred on the origin.
    pub fn plane(width: f32, height: f32) -> Geometry {
        let width = clamp_positive("plane", "width", width);
        let height = clamp_positive("plane", "height", height);
        let (hw, hh) = (width * 0.5, height * 0.5);
        let normal = Vector3::unit_z();

        let mut geometry = Geometry::new();
        let a = geometry.add_vertex(Vector3::new(-hw, hh, 0.0), normal, Vector2::new(0.0, 0.0));
        let b = geometry.add_vertex(Vector3::new(hw, hh, 0.0), normal, Vector2::new(1.0, 0.0));
        let c = geometry.add_vertex(Vector3::new(-hw, -hh, 0.0), normal, Vector2::new(0.0, 1.0));
        let d = geometry.add_vertex(Vector3::new(hw, -hh, 0.0), normal, Vector2::new(1.0, 1.0));
        geometry.add_facing_triangle(a, c, b, normal);
        geometry.add_facing_triangle(c, d, b, normal);
        geometry
    }

    /// Revolves a profile of (radius, height) points around the Y axis.
    ///
    /// Every profile segment gets its own ring of vertices, so corners in the profile stay crisp
    /// while the surface is smooth around the axis. The outward side of a segment going from
    /// `p0` to `p1` is `(dy, -dx)`: profiles run bottom-up on the outside of the solid.
    pub fn lathe(profile: &[Vector2<f32>], segments: u32) -> Geometry {
        let segments = segments.clamp(3, 512);
        let mut geometry = Geometry::new();
        if profile.len() < 2 {
            warn!("lathe: a profile needs at least two points, got {}", profile.len());
            return geometry;
        }
        let total_length: f32 = profile.windows(2).map(|p| (p[1] - p[0]).magnitude()).sum();
        let mut travelled = 0.0;

        for pair in profile.windows(2) {
            let (p0, p1) = (pair[0], pair[1]);
            let delta = p1 - p0;
            let length = delta.magnitude();
            if length < 1e-7 {
                continue;
            }
            let profile_normal = Vector2::new(delta.y, -delta.x) / length;
            let v0 = travelled / total_length;
            travelled += length;
            let v1 = travelled / total_length;

            let mut lower = Vec::with_capacity(segments as usize + 1);
            let mut upper = Vec::with_capacity(segments as usize + 1);
            for i in 0..=segments {
                let u = i as f32 / segments as f32;
                let (sin, cos) = (u * TAU).sin_cos();
                let normal = Vector3::new(profile_normal.x * sin, profile_normal.y, profile_normal.x * cos);
                lower.push(geometry.add_vertex(
                    Vector3::new(p0.x * sin, p0.y, p0.x * cos),
                    normal,
                    Vector2::new(u, v0),
                ));
                upper.push(geometry.add_vertex(
                    Vector3::new(p1.x * sin, p1.y, p1.x * cos),
                    normal,
                    Vector2::new(u, v1),
                ));
            }
            for i in 0..segments as usize {
                let mid = (i as f32 + 0.5) / segments as f32 * TAU;
                let outward = Vector3::new(profile_normal.x * mid.sin(), profile_normal.y, profile_normal.x * mid.cos());
                geometry.add_facing_triangle(lower[i], upper[i], upper[i + 1], outward);
                geometry.add_facing_triangle(lower[i], upper[i + 1], lower[i + 1], outward);
            }
        }
        geometry
    }

    /// Extrudes a closed shape from z = 0 to z = `depth` without bevel.
    ///
    /// Caps come from [`Shape::fill`]. Wall UVs use world units: (x or y, z), whichever axis the
    /// edge runs along most. Open or untriangulable shapes give an empty geometry.
    pub fn extrude(shape: &Shape, depth: f32) -> Geometry {
        let depth = clamp_positive("extrude", "depth", depth);
        let mut geometry = Geometry::new();
        let points = shape.points();
        if points.len() < 3 {
            warn!("extrude: a shape needs at least three points, got {}", points.len());
            return geometry;
        }
        if !shape.is_closed() {
            warn!("extrude: the shape must be closed");
            return geometry;
        }
        let fill = match shape.fill() {
            Ok(fill) => fill,
            Err(err) => {
                warn!("extrude: could not triangulate the caps: {err:?}");
                return geometry;
            }
        };
        let ccw = shape.signed_area() >= 0.0;

        for (z, normal) in [(depth, Vector3::unit_z()), (0.0, -Vector3::unit_z())] {
            let base = geometry.vertices.len() as u32;
            for p in &fill.vertices {
                geometry.add_vertex(p.extend(z), normal, *p);
            }
            for triangle in fill.indices.chunks_exact(3) {
                geometry.add_facing_triangle(
                    base + triangle[0],
                    base + triangle[1],
                    base + triangle[2],
                    normal,
                );
            }
        }

        let n = points.len();
        for i in 0..n {
            let (a, b) = (points[i], points[(i + 1) % n]);
            let edge = b.position - a.position;
            if edge.magnitude2() < 1e-14 {
                continue;
            }
            let flat = if ccw {
                Vector2::new(edge.y, -edge.x)
            } else {
                Vector2::new(-edge.y, edge.x)
            }
            .normalize();
            let (na, nb) = match (a.smooth_normal, b.smooth_normal) {
                (Some(na), Some(nb)) => (na, nb),
                _ => (flat, flat),
            };
            let along_x = edge.x.abs() > edge.y.abs();
            let u = |p: Vector2<f32>| if along_x { p.x } else { p.y };

            let a0 = geometry.add_vertex(a.position.extend(0.0), na.extend(0.0), Vector2::new(u(a.position), 0.0));
            let b0 = geometry.add_vertex(b.position.extend(0.0), nb.extend(0.0), Vector2::new(u(b.position), 0.0));
            let a1 = geometry.add_vertex(a.position.extend(depth), na.extend(0.0), Vector2::new(u(a.position), depth));
            let b1 = geometry.add_vertex(b.position.extend(depth), nb.extend(0.0), Vector2::new(u(b.position), depth));
            let outward = flat.extend(0.0);
            geometry.add_facing_triangle(a0, b0, b1, outward);
            geometry.add_facing_triangle(a0, b1, a1, outward);
        }
        geometry
    }
}

fn clamp_positive(generator: &str, what: &str, value: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        warn!("{generator}: {what} must be > 0.0, got {value}; clamping to 0.001");
        0.001
    }
}

fn clamp_non_negative(generator: &str, what: &str, value: f32) -> f32 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        warn!("{generator}: {what} must be >= 0.0, got {value}; clamping to 0.0");
        0.0
    }
}
