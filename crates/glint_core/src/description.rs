//! JSON scene descriptions.
//!
//! A description mirrors the scene types with plain serde-friendly fields and
//! named materials. `SceneDescription::build` validates it and produces a
//! `Scene`.
//!
//! ```json
//! {
//!   "camera": { "origin": [20, 0, 100], "look_at": [0, 20, 200], "fov": 0.785398 },
//!   "materials": { "chrome": { "reflectiveness": 0.5, "diffuse_color": [1, 1, 1] } },
//!   "lights": [ { "origin": [-100, -100, 200], "color": [0.5, 0.5, 0.5] } ],
//!   "primitives": [
//!     { "type": "sphere", "origin": [0, 40, 240], "radius": 40, "material": "chrome" },
//!     { "type": "plane", "origin": [0, 80, 0], "normal": [0, -1, 0],
//!       "material": { "reflectiveness": 0, "diffuse_color": [1, 0.5, 0.5] } }
//!   ]
//! }
//! ```

use std::collections::HashMap;
use std::f64::consts::FRAC_PI_4;
use std::path::Path;

use glint_math::{DVec3, MathError, VectorExt};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scene::{Camera, Light, Material, Plane, Primitive, Scene, Sphere};

/// Errors that can occur while loading or validating a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Camera origin and look_at must differ: {0}")]
    Camera(#[source] MathError),

    #[error("Field of view must be in (0, pi/2), got {0}")]
    InvalidFov(f64),

    #[error("Primitive {index}: sphere radius must be positive and finite, got {radius}")]
    InvalidRadius { index: usize, radius: f64 },

    #[error("Primitive {index}: plane normal must be non-zero")]
    DegenerateNormal { index: usize },

    #[error("Primitive {index}: reflectiveness must be within [0, 1], got {value}")]
    InvalidReflectiveness { index: usize, value: f64 },

    #[error("Primitive {index}: unknown material '{name}'")]
    UnknownMaterial { index: usize, name: String },
}

/// Result type for scene loading.
pub type SceneResult<T> = Result<T, SceneError>;

/// Camera placement by eye position and target point.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CameraDescription {
    pub origin: DVec3,
    pub look_at: DVec3,

    /// Field of view in radians
    #[serde(default = "default_fov")]
    pub fov: f64,
}

fn default_fov() -> f64 {
    FRAC_PI_4
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct MaterialDescription {
    #[serde(default)]
    pub reflectiveness: f64,
    pub diffuse_color: DVec3,
}

impl From<MaterialDescription> for Material {
    fn from(desc: MaterialDescription) -> Self {
        Material::new(desc.reflectiveness, desc.diffuse_color)
    }
}

/// A material given inline or by name from the `materials` table.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MaterialRef {
    Named(String),
    Inline(MaterialDescription),
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct LightDescription {
    pub origin: DVec3,
    pub color: DVec3,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PrimitiveDescription {
    Sphere {
        origin: DVec3,
        radius: f64,
        material: MaterialRef,
    },
    Plane {
        origin: DVec3,
        normal: DVec3,
        material: MaterialRef,
    },
}

/// A scene as stored on disk.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SceneDescription {
    pub camera: CameraDescription,

    #[serde(default)]
    pub materials: HashMap<String, MaterialDescription>,

    #[serde(default)]
    pub lights: Vec<LightDescription>,

    #[serde(default)]
    pub primitives: Vec<PrimitiveDescription>,
}

impl SceneDescription {
    /// Validate the description and build a render-ready scene.
    pub fn build(&self) -> SceneResult<Scene> {
        let fov = self.camera.fov;
        if !(fov > 0.0 && fov < std::f64::consts::FRAC_PI_2) {
            return Err(SceneError::InvalidFov(fov));
        }

        let camera = Camera::look_at(self.camera.origin, self.camera.look_at, fov)
            .map_err(SceneError::Camera)?;
        let mut scene = Scene::new(camera);

        for light in &self.lights {
            scene.add_light(Light::new(light.origin, light.color));
        }

        for (index, desc) in self.primitives.iter().enumerate() {
            let primitive = match desc {
                PrimitiveDescription::Sphere {
                    origin,
                    radius,
                    material,
                } => {
                    if !(radius.is_finite() && *radius > 0.0) {
                        return Err(SceneError::InvalidRadius {
                            index,
                            radius: *radius,
                        });
                    }
                    let material = self.resolve_material(index, material)?;
                    Primitive::Sphere(Sphere::new(*origin, *radius, material))
                }
                PrimitiveDescription::Plane {
                    origin,
                    normal,
                    material,
                } => {
                    let normal = normal
                        .unit()
                        .map_err(|_| SceneError::DegenerateNormal { index })?;
                    let material = self.resolve_material(index, material)?;
                    Primitive::Plane(Plane::new(*origin, normal, material))
                }
            };

            if primitive.material().reflectiveness >= 1.0 {
                log::warn!(
                    "Primitive {} ({}) is a perfect mirror; reflections stop at the depth limit",
                    index,
                    primitive.kind()
                );
            }
            scene.add_primitive(primitive);
        }

        if scene.light_count() == 0 {
            log::warn!("Scene has no lights; the image will be black");
        }

        log::debug!(
            "Built scene with {} primitives and {} lights",
            scene.primitive_count(),
            scene.light_count()
        );

        Ok(scene)
    }

    fn resolve_material(&self, index: usize, material: &MaterialRef) -> SceneResult<Material> {
        let desc = match material {
            MaterialRef::Inline(desc) => *desc,
            MaterialRef::Named(name) => {
                *self
                    .materials
                    .get(name)
                    .ok_or_else(|| SceneError::UnknownMaterial {
                        index,
                        name: name.clone(),
                    })?
            }
        };

        let value = desc.reflectiveness;
        if !(0.0..=1.0).contains(&value) {
            return Err(SceneError::InvalidReflectiveness { index, value });
        }

        Ok(desc.into())
    }
}

/// A scene file: a scene description plus an optional `render` block.
///
/// The shape of the render block belongs to the caller; it defaults when
/// the file has none.
#[derive(Clone, Debug, Deserialize)]
#[serde(bound(deserialize = "R: Deserialize<'de> + Default"))]
pub struct SceneFile<R> {
    #[serde(flatten)]
    pub scene: SceneDescription,

    #[serde(default)]
    pub render: R,
}

/// Load and validate a JSON scene file along with its render block.
pub fn load_scene<R, P>(path: P) -> SceneResult<(Scene, R)>
where
    R: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)?;
    let (scene, render) = parse_scene_file(&contents)?;

    log::info!(
        "Loaded scene {} ({} primitives, {} lights)",
        path.display(),
        scene.primitive_count(),
        scene.light_count()
    );

    Ok((scene, render))
}

/// Parse and validate a scene file held in memory.
pub fn parse_scene_file<R>(contents: &str) -> SceneResult<(Scene, R)>
where
    R: DeserializeOwned + Default,
{
    let file: SceneFile<R> = serde_json::from_str(contents)?;
    Ok((file.scene.build()?, file.render))
}

/// Parse and validate a JSON scene held in memory, ignoring any render block.
pub fn load_scene_from_str(contents: &str) -> SceneResult<Scene> {
    let description: SceneDescription = serde_json::from_str(contents)?;
    description.build()
}
