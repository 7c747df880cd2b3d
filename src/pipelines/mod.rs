//! Render pipelines.
//!
//! - `basic` holds the main-pass pipelines (standard, polygon offset, shadow catcher)
//! - `light` builds the light uniform and the shadow map bindings
//! - `shadow` is the depth-only pass from the spot light

pub mod basic;
pub mod light;
pub mod shadow;
