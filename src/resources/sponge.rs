//! Procedural "sponge" textures.
//!
//! A sponge texture is a small square filled with a background colour and speckled with
//! semi-transparent dots of a second colour. It is meant to be tiled, so it carries the repeat
//! factor the sampler should apply.

use image::RgbaImage;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Transform};

use crate::{data_structures::material::Colour, error::SceneError};

/// Side length of the generated square in pixels.
pub const TEXTURE_SIZE: u32 = 128;
pub const DOT_COUNT: usize = 250;
pub const DOT_RADIUS: std::ops::Range<f32> = 1.0..3.0;
pub const DOT_ALPHA: std::ops::Range<f32> = 0.3..0.7;
pub const TEXTURE_REPEAT: [f32; 2] = [1.8, 1.8];

#[derive(Clone, Debug, PartialEq)]
pub struct SpongeTexture {
    pub image: RgbaImage,
    /// How often the image repeats per UV unit, per axis.
    pub repeat: [f32; 2],
}

impl SpongeTexture {
    pub fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Colours can be handed in as `#rrggbb` strings or as already parsed [`Colour`]s.
pub trait IntoColour {
    fn into_colour(self) -> Result<Colour, SceneError>;
}

impl IntoColour for Colour {
    fn into_colour(self) -> Result<Colour, SceneError> {
        let valid = |c: f32| (0.0..=1.0).contains(&c);
        if valid(self.r) && valid(self.g) && valid(self.b) {
            Ok(self)
        } else {
            Err(SceneError::invalid(
                "colour",
                format!("components of {self:?} must lie in 0.0..=1.0"),
            ))
        }
    }
}

impl IntoColour for &str {
    fn into_colour(self) -> Result<Colour, SceneError> {
        Colour::parse(self)
    }
}

/// Paints [`DOT_COUNT`] randomly placed, sized and faded dots over a flat background.
///
/// Dots are anti-aliased discs composited source-over and clipped at the image border.
pub fn make_texture<R: Rng>(
    background: impl IntoColour,
    dot: impl IntoColour,
    rng: &mut R,
) -> Result<SpongeTexture, SceneError> {
    let background = background.into_colour()?;
    let dot = dot.into_colour()?;

    let mut pixmap = Pixmap::new(TEXTURE_SIZE, TEXTURE_SIZE)
        .ok_or_else(|| SceneError::Raster(format!("cannot allocate a {TEXTURE_SIZE}px canvas")))?;
    pixmap.fill(skia_colour(background, 1.0));

    let mut paint = Paint::default();
    paint.anti_alias = true;
    let size = TEXTURE_SIZE as f32;
    for _ in 0..DOT_COUNT {
        let x = rng.random_range(0.0..size);
        let y = rng.random_range(0.0..size);
        let radius = rng.random_range(DOT_RADIUS);
        let alpha = rng.random_range(DOT_ALPHA);
        let Some(circle) = PathBuilder::from_circle(x, y, radius) else {
            log::warn!("skipping degenerate dot at ({x}, {y}) with radius {radius}");
            continue;
        };
        paint.set_color(skia_colour(dot, alpha));
        pixmap.fill_path(&circle, &paint, FillRule::Winding, Transform::identity(), None);
    }

    // The background is opaque, so premultiplied and straight alpha agree
    let image = RgbaImage::from_raw(TEXTURE_SIZE, TEXTURE_SIZE, pixmap.take())
        .ok_or_else(|| SceneError::Raster("canvas size does not match its pixel data".into()))?;
    Ok(SpongeTexture {
        image,
        repeat: TEXTURE_REPEAT,
    })
}

fn skia_colour(colour: Colour, alpha: f32) -> tiny_skia::Color {
    let [r, g, b, _] = colour.to_rgba8();
    let mut colour = tiny_skia::Color::from_rgba8(r, g, b, 255);
    colour.set_alpha(alpha);
    colour
}

/// A generator seeded from the clock, for when nobody asks for reproducible output.
pub fn time_seeded_rng() -> Pcg64 {
    Pcg64::seed_from_u64(clock_seed())
}

#[cfg(not(target_arch = "wasm32"))]
fn clock_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or(0x5eed)
}

#[cfg(target_arch = "wasm32")]
fn clock_seed() -> u64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|performance| (performance.now() * 1_000.0) as u64)
        .unwrap_or(0x5eed)
}
