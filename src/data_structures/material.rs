//! Surface appearance descriptors.
//!
//! A [`Material`] lives on the CPU and is shared by every mesh of the same visual role through an
//! `Rc`. It is turned into GPU resources once, when the scene is uploaded (see
//! [`crate::resources::ResourceCache`]).

use std::rc::Rc;

use crate::{error::SceneError, resources::sponge::SpongeTexture};

/// An sRGB colour with components in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Colour {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Colour {
    pub const WHITE: Colour = Colour::new(1.0, 1.0, 1.0);
    pub const BLACK: Colour = Colour::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// `0xrrggbb`
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    /// Parses `#rrggbb` (the leading `#` is optional).
    pub fn parse(s: &str) -> Result<Self, SceneError> {
        let digits = s.trim().strip_prefix('#').unwrap_or(s.trim());
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(SceneError::invalid(
                "colour",
                format!("`{s}` is not a #rrggbb colour"),
            ));
        }
        u32::from_str_radix(digits, 16)
            .map(Self::from_hex)
            .map_err(|e| SceneError::invalid("colour", e.to_string()))
    }

    pub fn to_rgba8(&self) -> [u8; 4] {
        let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [to_u8(self.r), to_u8(self.g), to_u8(self.b), 255]
    }

    /// Shaders work in linear space, the surface converts back to sRGB.
    pub fn to_linear(&self) -> [f32; 3] {
        let convert = |c: f32| {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        };
        [convert(self.r), convert(self.g), convert(self.b)]
    }

    pub fn to_wgpu(&self) -> wgpu::Color {
        let [r, g, b] = self.to_linear();
        wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: 1.0,
        }
    }
}

impl From<u32> for Colour {
    fn from(hex: u32) -> Self {
        Colour::from_hex(hex)
    }
}

/// Pushes a surface back in depth to resolve z-fighting with coplanar faces.
///
/// Maps onto [`wgpu::DepthBiasState`]: `units` is the constant term, `factor` the slope term.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PolygonOffset {
    pub factor: f32,
    pub units: i32,
}

/// The colour source of a material.
#[derive(Clone, Debug)]
pub enum Albedo {
    Colour(Colour),
    Texture(Rc<SpongeTexture>),
}

/// Selects the pipeline a material is drawn with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MaterialPass {
    Standard,
    PolygonOffset,
    ShadowCatcher,
}

#[derive(Clone, Debug)]
pub enum MaterialKind {
    Standard {
        albedo: Albedo,
        roughness: f32,
        metalness: f32,
        polygon_offset: Option<PolygonOffset>,
    },
    /// Invisible except for the shadows that fall onto it.
    ShadowCatcher { opacity: f32 },
}

#[derive(Clone, Debug)]
pub struct Material {
    pub name: String,
    pub kind: MaterialKind,
}

impl Material {
    pub fn coloured(name: &str, colour: Colour, roughness: f32, metalness: f32) -> Self {
        Self {
            name: name.to_string(),
            kind: MaterialKind::Standard {
                albedo: Albedo::Colour(colour),
                roughness,
                metalness,
                polygon_offset: None,
            },
        }
    }

    pub fn textured(
        name: &str,
        texture: Rc<SpongeTexture>,
        roughness: f32,
        metalness: f32,
    ) -> Self {
        Self {
            name: name.to_string(),
            kind: MaterialKind::Standard {
                albedo: Albedo::Texture(texture),
                roughness,
                metalness,
                polygon_offset: None,
            },
        }
    }

    pub fn shadow_catcher(name: &str, opacity: f32) -> Self {
        Self {
            name: name.to_string(),
            kind: MaterialKind::ShadowCatcher {
                opacity: opacity.clamp(0.0, 1.0),
            },
        }
    }

    /// Builder-style toggle for polygon offset. No-op on shadow catchers.
    pub fn with_polygon_offset(mut self, offset: PolygonOffset) -> Self {
        if let MaterialKind::Standard { polygon_offset, .. } = &mut self.kind {
            *polygon_offset = Some(offset);
        }
        self
    }

    pub fn pass(&self) -> MaterialPass {
        match &self.kind {
            MaterialKind::Standard {
                polygon_offset: Some(_),
                ..
            } => MaterialPass::PolygonOffset,
            MaterialKind::Standard { .. } => MaterialPass::Standard,
            MaterialKind::ShadowCatcher { .. } => MaterialPass::ShadowCatcher,
        }
    }

    pub fn texture(&self) -> Option<&Rc<SpongeTexture>> {
        match &self.kind {
            MaterialKind::Standard {
                albedo: Albedo::Texture(texture),
                ..
            } => Some(texture),
            _ => None,
        }
    }

    pub fn roughness(&self) -> Option<f32> {
        match &self.kind {
            MaterialKind::Standard { roughness, .. } => Some(*roughness),
            MaterialKind::ShadowCatcher { .. } => None,
        }
    }

    /// Packs the material into the layout `standard.wgsl` expects.
    pub fn to_uniform(&self) -> MaterialUniform {
        match &self.kind {
            MaterialKind::Standard {
                albedo,
                roughness,
                metalness,
                ..
            } => {
                let (colour, has_map, repeat) = match albedo {
                    Albedo::Colour(colour) => (colour.to_linear(), 0.0, [1.0, 1.0]),
                    Albedo::Texture(texture) => ([1.0; 3], 1.0, texture.repeat),
                };
                MaterialUniform {
                    colour: [colour[0], colour[1], colour[2], 1.0],
                    params: [roughness.clamp(0.0, 1.0), metalness.clamp(0.0, 1.0), has_map, 0.0],
                    uv_repeat: [repeat[0], repeat[1], 0.0, 0.0],
                }
            }
            MaterialKind::ShadowCatcher { opacity } => MaterialUniform {
                colour: [0.0, 0.0, 0.0, *opacity],
                params: [1.0, 0.0, 0.0, 0.0],
                uv_repeat: [1.0, 1.0, 0.0, 0.0],
            },
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub colour: [f32; 4],
    /// roughness, metalness, has_map, unused
    pub params: [f32; 4],
    pub uv_repeat: [f32; 4],
}
