//! layer-cake
//!
//! A procedurally built, sliced layer cake on a cake stand, rendered with wgpu on native targets
//! and in the browser. Everything in the scene is generated at startup: the sponge textures, the
//! wedge-shaped layers, the icing drips and the stand.
//!
//! High-level modules
//! - `cake`: wedge layers, layer stacking and drip placement
//! - `scene`: composes cake, stand, ground, lights and camera into a [`scene::CakeScene`]
//! - `camera`: perspective camera, orbit controller and uniforms for view/projection
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `data_structures`: geometry kernel, materials, instances and the scene graph
//! - `flow`: the event loop and the flows that run in it
//! - `pipelines`: material, light and shadow pipelines
//! - `resources`: procedural textures and GPU uploads
//! - `render`: render composition and per-pipeline batching
//!

pub mod cake;
pub mod camera;
pub mod context;
pub mod data_structures;
pub mod error;
pub mod flow;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;

pub use error::SceneError;

/// Browser entry point. Renders into the page's `<canvas id="canvas">`.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn run_web() -> Result<(), wasm_bindgen::JsValue> {
    flow::run::<()>(vec![scene::CakeFlow::constructor(
        scene::SceneConfig::default(),
    )])
    .map_err(|e| wasm_bindgen::JsValue::from_str(&format!("{e:#}")))
}
