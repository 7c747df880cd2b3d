//! Render composition and pipeline batching.
//!
//! Flows describe what they want drawn with a [`Render`]. The engine flattens every flow's
//! `Render` into [`Batches`], one list per material pipeline, and additionally draws every
//! shadow caster into the spot light's shadow map before the main pass.

use crate::data_structures::{material::MaterialPass, model::Model, scene_graph::SceneNode};

/// Data for instanced object rendering: a model and its instance buffer.
#[derive(Clone)]
pub struct Instanced<'a> {
    pub instance: &'a wgpu::Buffer,
    pub model: &'a Model,
    pub amount: usize,
    pub cast_shadow: bool,
}

/// Specifies how a flow's objects should be rendered.
///
/// - `None` renders nothing
/// - `Defaults(Vec<Instanced>)` renders a batch of instanced objects
pub enum Render<'a> {
    None,
    Defaults(Vec<Instanced<'a>>),
}

/// Instanced draws sorted by the pipeline their material needs.
#[derive(Default)]
pub struct Batches<'a> {
    pub standard: Vec<Instanced<'a>>,
    pub polygon_offset: Vec<Instanced<'a>>,
    pub shadow_catcher: Vec<Instanced<'a>>,
}

impl<'a> Batches<'a> {
    pub fn push(&mut self, instanced: Instanced<'a>) {
        if instanced.amount == 0 {
            log::warn!(
                "you attempted to render {} with zero instances",
                instanced.model.mesh.name
            );
            return;
        }
        match instanced.model.material.pass {
            MaterialPass::Standard => self.standard.push(instanced),
            MaterialPass::PolygonOffset => self.polygon_offset.push(instanced),
            MaterialPass::ShadowCatcher => self.shadow_catcher.push(instanced),
        }
    }

    /// Every batched draw that casts a shadow. Shadow catchers never do.
    pub fn shadow_casters(&self) -> impl Iterator<Item = &Instanced<'a>> {
        self.standard
            .iter()
            .chain(self.polygon_offset.iter())
            .filter(|instanced| instanced.cast_shadow)
    }

    pub fn len(&self) -> usize {
        self.standard.len() + self.polygon_offset.len() + self.shadow_catcher.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<'a> Render<'a> {
    pub(crate) fn set_pipelines(self, batches: &mut Batches<'a>) {
        match self {
            Render::Defaults(vec) => vec.into_iter().for_each(|instanced| batches.push(instanced)),
            Render::None => (),
        }
    }
}

impl<'a> From<&'a dyn SceneNode> for Render<'a> {
    fn from(sn: &'a dyn SceneNode) -> Self {
        Render::Defaults(sn.get_render())
    }
}
