//! Icing drips running down the outer rim of the cake.
//!
//! A drip is a group with a vertically stretched cylinder (the body) and a sphere (the tip) at
//! the bottom end of the body. Drips are spread over the front part of the kept arc with a
//! deterministic, sine-varied length so the row does not look machine-made.

use std::rc::Rc;

use cgmath::Vector3;

use crate::{
    data_structures::{
        geometry::Geometry,
        instance::Instance,
        material::Material,
        scene_graph::{GroupNode, MeshNode},
    },
    error::{SceneError, ensure_positive},
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DripConfig {
    /// Fraction of the angular span the drips are spread over.
    pub spread: f32,
    pub length_base: f32,
    pub length_amplitude: f32,
    pub length_frequency: f32,
    pub body_radius: f32,
    pub body_length: f32,
    pub body_segments: u32,
    pub tip_radius: f32,
    pub tip_segments: u32,
    /// Distance outside the frosting surface.
    pub rim_offset: f32,
    /// Distance between the cake top and the top of a drip body.
    pub top_inset: f32,
}

impl Default for DripConfig {
    fn default() -> Self {
        Self {
            spread: 0.8,
            length_base: 0.9,
            length_amplitude: 0.2,
            length_frequency: 1.1,
            body_radius: 0.07,
            body_length: 0.45,
            body_segments: 12,
            tip_radius: 0.09,
            tip_segments: 16,
            rim_offset: 0.02,
            top_inset: 0.2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DripPlacement {
    pub index: usize,
    pub angle: f32,
    pub scale_y: f32,
    /// Position in cake-group space, on the rim at y = 0.
    pub position: Vector3<f32>,
}

pub fn place_drips(
    count: usize,
    angular_span: f32,
    start_angle: f32,
    outer_radius: f32,
    config: &DripConfig,
) -> Result<Vec<DripPlacement>, SceneError> {
    if count == 0 {
        return Err(SceneError::invalid("count", "at least one drip is needed"));
    }
    let angular_span = ensure_positive("angular_span", angular_span)?;
    let outer_radius = ensure_positive("outer_radius", outer_radius)?;
    if !start_angle.is_finite() {
        return Err(SceneError::invalid(
            "start_angle",
            format!("expected a finite angle, got {start_angle}"),
        ));
    }

    let r = outer_radius + config.rim_offset;
    let placements = (0..count)
        .map(|index| {
            let t = (index + 1) as f32 / (count + 2) as f32;
            let angle = start_angle + t * angular_span * config.spread;
            let scale_y = config.length_base
                + config.length_amplitude * (index as f32 * config.length_frequency).sin();
            DripPlacement {
                index,
                angle,
                scale_y,
                position: Vector3::new(angle.cos() * r, 0.0, angle.sin() * r),
            }
        })
        .collect();
    Ok(placements)
}

/// Unscaled body and shared tip geometry, built once for all drips.
pub struct DripGeometry {
    body: Geometry,
    tip: Rc<Geometry>,
}

impl DripGeometry {
    pub fn new(config: &DripConfig) -> Self {
        Self {
            body: Geometry::cylinder(
                config.body_radius,
                config.body_radius,
                config.body_length,
                config.body_segments,
            ),
            tip: Rc::new(Geometry::sphere(
                config.tip_radius,
                config.tip_segments,
                config.tip_segments,
            )),
        }
    }
}

pub fn build_drip(
    placement: &DripPlacement,
    cake_height: f32,
    geometry: &DripGeometry,
    material: &Rc<Material>,
    config: &DripConfig,
) -> Result<GroupNode, SceneError> {
    let cake_height = ensure_positive("cake_height", cake_height)?;
    let scale_y = ensure_positive("scale_y", placement.scale_y)?;

    let top_y = cake_height / 2.0 - config.top_inset;
    let length = config.body_length * scale_y;

    let body = MeshNode::new(
        "drip_body",
        Rc::new(geometry.body.scaled(1.0, scale_y, 1.0)),
        Rc::clone(material),
    )
    .with_transform(Instance::from_position(0.0, top_y - length / 2.0, 0.0))
    .with_shadows(true, true);
    let tip = MeshNode::new("drip_tip", Rc::clone(&geometry.tip), Rc::clone(material))
        .with_transform(Instance::from_position(0.0, top_y - length, 0.0))
        .with_shadows(true, true);

    Ok(GroupNode::new("drip")
        .with_transform(placement.position.into())
        .with_child(body)
        .with_child(tip))
}
