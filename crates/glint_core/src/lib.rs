//! glint core - scene description for the glint ray tracer.
//!
//! This crate provides:
//!
//! - **Scene types**: `Scene`, `Camera`, `Primitive` (`Sphere`, `Plane`),
//!   `Material`, `Light`
//! - **Reference scene**: the built-in three-sphere room
//! - **Scene files**: JSON scene descriptions and validation
//!
//! # Example
//!
//! ```ignore
//! use glint_core::{load_scene, Scene};
//!
//! // Keep the render block as raw JSON
//! let (scene, _render): (Scene, serde_json::Value) = load_scene("room.json")?;
//! println!("Loaded {} primitives, {} lights",
//!     scene.primitive_count(),
//!     scene.light_count());
//! ```

pub mod description;
pub mod scene;

// Re-export commonly used types
pub use description::{
    load_scene, load_scene_from_str, parse_scene_file, SceneDescription, SceneError, SceneFile,
};
pub use scene::{Camera, Light, Material, ObjectId, Plane, Primitive, Scene, Sphere};
