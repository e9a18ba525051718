//! Scene description for the lumen renderer.
//!
//! This crate defines the JSON scene format: a camera, a list of
//! objects with materials, and point lights. It is pure data; geometry
//! and material construction live in `lumen_renderer`.

mod desc;
mod loader;

pub use desc::{vec3, CameraDesc, LightDesc, MaterialDesc, ObjectDesc, SceneDesc};
pub use loader::{load_scene, parse_scene, SceneError};
