//! Engine data structures: geometry, materials, scene graphs, and instances.
//!
//! This module contains the core data types for scene representation:
//!
//! - `geometry` and `shape` build triangle meshes on the CPU
//! - `material` describes surface appearance
//! - `model` contains the GPU-side mesh and material handles
//! - `texture` contains GPU texture wrapper and creation utilities
//! - `instance` holds per-node transformation data
//! - `scene_graph` enables hierarchical scene organization

pub mod geometry;
pub mod instance;
pub mod material;
pub mod model;
pub mod scene_graph;
pub mod shape;
pub mod texture;
