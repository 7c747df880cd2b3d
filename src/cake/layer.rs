//! Wedge-shaped cake layers: a disk with one pie slice cut out, extruded to a thickness.

use std::{
    f32::consts::{FRAC_PI_2, TAU},
    rc::Rc,
};

use cgmath::Rad;

use crate::{
    data_structures::{
        geometry::Geometry,
        instance::Instance,
        material::{Colour, Material},
        scene_graph::MeshNode,
        shape::Shape,
    },
    error::{SceneError, ensure_positive},
};

pub const DEFAULT_ROUGHNESS: f32 = 0.7;
pub const DEFAULT_METALNESS: f32 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WedgeConfig {
    /// Angle of the removed slice, in radians. The arc runs from here to 2π.
    pub missing_angle: f32,
    /// Straight pieces used to sample the outer arc.
    pub curve_segments: u32,
}

impl Default for WedgeConfig {
    fn default() -> Self {
        Self {
            missing_angle: FRAC_PI_2,
            curve_segments: 48,
        }
    }
}

impl WedgeConfig {
    /// The angular span that is not cut away.
    pub fn kept_angle(&self) -> f32 {
        TAU - self.missing_angle
    }

    fn validate(&self) -> Result<(), SceneError> {
        let missing = self.missing_angle;
        if !(missing.is_finite() && missing > 0.0 && missing < TAU) {
            return Err(SceneError::invalid(
                "missing_angle",
                format!("must lie strictly between 0 and 2π, got {missing}"),
            ));
        }
        if self.curve_segments == 0 {
            return Err(SceneError::invalid("curve_segments", "must be at least 1"));
        }
        Ok(())
    }
}

/// What a layer is painted with.
#[derive(Clone, Debug)]
pub enum LayerSurface {
    /// A shared material, used as-is.
    Material(Rc<Material>),
    /// A flat colour; a fresh material is made for the layer.
    Colour { colour: Colour, roughness: f32 },
}

impl From<Rc<Material>> for LayerSurface {
    fn from(material: Rc<Material>) -> Self {
        LayerSurface::Material(material)
    }
}

impl From<Colour> for LayerSurface {
    fn from(colour: Colour) -> Self {
        LayerSurface::Colour {
            colour,
            roughness: DEFAULT_ROUGHNESS,
        }
    }
}

/// Rotation that lays a shape extruded along +Z flat: the extrusion axis becomes world vertical
/// and shape angle θ lands on world angle θ in the XZ plane.
pub fn shape_plane_to_horizontal() -> Rad<f32> {
    Rad(FRAC_PI_2)
}

/// Outer arc from `missing_angle` to 2π, a spoke back to the centre, closed.
pub fn wedge_shape(radius: f32, config: &WedgeConfig) -> Result<Shape, SceneError> {
    let radius = ensure_positive("radius", radius)?;
    config.validate()?;
    let mut shape = Shape::new();
    shape
        .absarc(
            0.0,
            0.0,
            radius,
            config.missing_angle,
            TAU,
            false,
            config.curve_segments,
        )
        .line_to(0.0, 0.0)
        .close_path();
    Ok(shape)
}

/// The extruded wedge, centred on its bounding box.
pub fn wedge_geometry(radius: f32, depth: f32, config: &WedgeConfig) -> Result<Geometry, SceneError> {
    let depth = ensure_positive("depth", depth)?;
    let shape = wedge_shape(radius, config)?;
    let mut geometry = Geometry::extrude(&shape, depth);
    geometry.center();
    Ok(geometry)
}

pub fn build_wedge_layer(
    name: &str,
    radius: f32,
    depth: f32,
    surface: impl Into<LayerSurface>,
    config: &WedgeConfig,
) -> Result<MeshNode, SceneError> {
    let geometry = wedge_geometry(radius, depth, config)?;
    let material = match surface.into() {
        LayerSurface::Material(material) => material,
        LayerSurface::Colour { colour, roughness } => {
            Rc::new(Material::coloured(name, colour, roughness, DEFAULT_METALNESS))
        }
    };
    log::debug!(
        "built wedge layer {name}: r={radius} d={depth}, {} triangles",
        geometry.triangle_count()
    );

    Ok(MeshNode::new(name, Rc::new(geometry), material)
        .with_transform(Instance::new().with_rotation_x(shape_plane_to_horizontal()))
        .with_shadows(true, true))
}
