//! The cake itself: a frosting shell with a slice cut out, three inner layers visible through the
//! cut and a row of drips on the outer rim.
//!
//! - `layer` builds the wedge-shaped solids
//! - `stack` works out where the inner layers sit
//! - `drips` places and builds the icing drips

use std::rc::Rc;

use crate::{
    data_structures::{material::Material, scene_graph::GroupNode},
    error::{SceneError, ensure_positive},
};

pub mod drips;
pub mod layer;
pub mod stack;

use drips::{DripConfig, DripGeometry, build_drip, place_drips};
use layer::{WedgeConfig, build_wedge_layer};
use stack::{LayerProportions, LayerStack};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CakeConfig {
    pub height: f32,
    pub frosting_radius: f32,
    pub inner_radius: f32,
    pub drip_count: usize,
    pub wedge: WedgeConfig,
    pub proportions: LayerProportions,
    pub drips: DripConfig,
}

impl Default for CakeConfig {
    fn default() -> Self {
        Self {
            height: 2.0,
            frosting_radius: 2.0,
            inner_radius: 1.9,
            drip_count: 7,
            wedge: WedgeConfig::default(),
            proportions: LayerProportions::default(),
            drips: DripConfig::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct CakeMaterials {
    pub frosting: Rc<Material>,
    /// Inner layers, bottom to top.
    pub layers: [Rc<Material>; 3],
}

pub const LAYER_NAMES: [&str; 3] = ["red_layer", "cream_layer", "yellow_layer"];

/// Builds the `cake` group, centred on its own origin. The caller positions it.
pub fn build_cake(config: &CakeConfig, materials: &CakeMaterials) -> Result<GroupNode, SceneError> {
    let frosting_radius = ensure_positive("frosting_radius", config.frosting_radius)?;
    let inner_radius = ensure_positive("inner_radius", config.inner_radius)?;
    if inner_radius > frosting_radius {
        return Err(SceneError::invalid(
            "inner_radius",
            format!("{inner_radius} would stick out of the frosting ({frosting_radius})"),
        ));
    }
    let stack = LayerStack::new(config.height, &config.proportions)?;

    let mut cake = GroupNode::new("cake").with_child(build_wedge_layer(
        "frosting",
        frosting_radius,
        config.height,
        Rc::clone(&materials.frosting),
        &config.wedge,
    )?);

    for ((name, slot), material) in LAYER_NAMES
        .iter()
        .zip(stack.slots.iter())
        .zip(materials.layers.iter())
    {
        let layer = build_wedge_layer(
            name,
            inner_radius,
            slot.height,
            Rc::clone(material),
            &config.wedge,
        )?
        .with_position(cgmath::Vector3::new(0.0, slot.center_y, 0.0));
        cake = cake.with_child(layer);
    }

    let placements = place_drips(
        config.drip_count,
        config.wedge.kept_angle(),
        config.wedge.missing_angle,
        frosting_radius,
        &config.drips,
    )?;
    let drip_geometry = DripGeometry::new(&config.drips);
    for placement in &placements {
        cake = cake.with_child(build_drip(
            placement,
            config.height,
            &drip_geometry,
            &materials.frosting,
            &config.drips,
        )?);
    }
    log::info!(
        "built cake: {} inner layers, {} drips",
        LAYER_NAMES.len(),
        placements.len()
    );

    Ok(cake)
}
