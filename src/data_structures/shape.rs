//! Closed 2D outlines that can be extruded into solids.
//!
//! A [`Shape`] is built like a pen path: arcs and straight lines, then closed. Arc points remember
//! their radial direction so the walls of an extruded arc can be shaded smoothly. The flattened
//! outline converts into a lyon [`Path`] and is filled with lyon's tessellator, so any simple
//! outline can be capped, concave or not.

use std::f32::consts::TAU;

use cgmath::{InnerSpace, Vector2};
use lyon::{
    geom::Arc,
    math::{Angle, point, vector},
    path::Path,
    tessellation::{
        BuffersBuilder, FillOptions, FillTessellator, FillVertex, TessellationError, VertexBuffers,
    },
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapePoint {
    pub position: Vector2<f32>,
    /// Outward direction of the curve this point was sampled from, if any.
    pub smooth_normal: Option<Vector2<f32>>,
}

/// Indexed triangles covering the inside of a shape.
pub type Fill = VertexBuffers<Vector2<f32>, u32>;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Shape {
    points: Vec<ShapePoint>,
    closed: bool,
}

impl Shape {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an arc around (`cx`, `cy`) from `start_angle` to `end_angle`, sampled with
    /// `segments` straight pieces. Angles are in radians, counter-clockwise unless `clockwise`.
    pub fn absarc(
        &mut self,
        cx: f32,
        cy: f32,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        clockwise: bool,
        segments: u32,
    ) -> &mut Self {
        let segments = segments.max(1);
        let mut sweep = end_angle - start_angle;
        if clockwise && sweep > 0.0 {
            sweep -= TAU;
        } else if !clockwise && sweep < 0.0 {
            sweep += TAU;
        }
        let arc = Arc {
            center: point(cx, cy),
            radii: vector(radius, radius),
            start_angle: Angle::radians(start_angle),
            sweep_angle: Angle::radians(sweep),
            x_rotation: Angle::zero(),
        };
        for i in 0..=segments {
            let t = i as f32 / segments as f32;
            let sample = arc.sample(t);
            let position = Vector2::new(sample.x, sample.y);
            let angle = start_angle + sweep * t;
            let direction = Vector2::new(angle.cos(), angle.sin());
            // The first sample may coincide with the current pen position
            if i == 0 && self.last().is_some_and(|p| (p - position).magnitude2() < 1e-12) {
                if let Some(last) = self.points.last_mut() {
                    last.smooth_normal = Some(direction);
                }
                continue;
            }
            self.points.push(ShapePoint {
                position,
                smooth_normal: Some(direction),
            });
        }
        self
    }

    pub fn line_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.points.push(ShapePoint {
            position: Vector2::new(x, y),
            smooth_normal: None,
        });
        self
    }

    /// Drops a trailing point that repeats the first one and marks the outline closed.
    pub fn close_path(&mut self) -> &mut Self {
        if self.points.len() > 1 {
            let first = self.points[0].position;
            let is_duplicate = self
                .last()
                .is_some_and(|p| (p - first).magnitude2() < 1e-12);
            if is_duplicate {
                self.points.pop();
            }
        }
        self.closed = true;
        self
    }

    pub fn points(&self) -> &[ShapePoint] {
        &self.points
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn last(&self) -> Option<Vector2<f32>> {
        self.points.last().map(|p| p.position)
    }

    /// Shoelace area. Positive for counter-clockwise outlines.
    pub fn signed_area(&self) -> f32 {
        let n = self.points.len();
        (0..n)
            .map(|i| {
                let a = self.points[i].position;
                let b = self.points[(i + 1) % n].position;
                a.x * b.y - b.x * a.y
            })
            .sum::<f32>()
            * 0.5
    }

    /// The flattened outline as a single lyon sub-path.
    pub fn to_path(&self) -> Path {
        let mut builder = Path::builder();
        if let Some((first, rest)) = self.points.split_first() {
            builder.begin(point(first.position.x, first.position.y));
            for p in rest {
                builder.line_to(point(p.position.x, p.position.y));
            }
            builder.end(self.closed);
        }
        builder.build()
    }

    /// Triangulates the inside of the outline.
    pub fn fill(&self) -> Result<Fill, TessellationError> {
        let path = self.to_path();
        let mut fill = Fill::new();
        let mut tessellator = FillTessellator::new();
        tessellator.tessellate_path(
            &path,
            &FillOptions::default(),
            &mut BuffersBuilder::new(&mut fill, |vertex: FillVertex| {
                let position = vertex.position();
                Vector2::new(position.x, position.y)
            }),
        )?;
        Ok(fill)
    }
}
