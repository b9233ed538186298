//! Scene types for glint.
//!
//! A scene is a fixed list of primitives and point lights plus the eye the
//! image is seen from. It is built once and only read while rendering.

use std::f64::consts::PI;

use glint_math::{Color, DVec3, MathError, Ray};

/// Surface description shared by every primitive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    /// Blend factor between local shading (0) and mirror reflection (1)
    pub reflectiveness: f64,

    /// Diffuse color (RGB, 0-1)
    pub diffuse_color: Color,
}

impl Material {
    /// Create a new material.
    pub fn new(reflectiveness: f64, diffuse_color: Color) -> Self {
        Self {
            reflectiveness,
            diffuse_color,
        }
    }

    /// Check if this material spawns a reflection ray.
    pub fn is_reflective(&self) -> bool {
        self.reflectiveness > 0.0
    }
}

/// A point light.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub origin: DVec3,
    pub color: Color,
}

impl Light {
    pub fn new(origin: DVec3, color: Color) -> Self {
        Self { origin, color }
    }
}

/// A sphere given by its center and radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    pub origin: DVec3,
    pub radius: f64,
    pub material: Material,
}

impl Sphere {
    pub fn new(origin: DVec3, radius: f64, material: Material) -> Self {
        Self {
            origin,
            radius,
            material,
        }
    }
}

/// An infinite plane through `origin` facing along `normal`.
///
/// The normal is one-sided: it is reported as-is whichever face a ray
/// strikes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub origin: DVec3,
    pub normal: DVec3,
    pub material: Material,
}

impl Plane {
    pub fn new(origin: DVec3, normal: DVec3, material: Material) -> Self {
        Self {
            origin,
            normal,
            material,
        }
    }
}

/// The closed set of geometry the tracer understands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Primitive {
    Sphere(Sphere),
    Plane(Plane),
}

impl Primitive {
    /// Get the material of this primitive.
    pub fn material(&self) -> &Material {
        match self {
            Primitive::Sphere(sphere) => &sphere.material,
            Primitive::Plane(plane) => &plane.material,
        }
    }

    /// Short type name, used in log output and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Primitive::Sphere(_) => "sphere",
            Primitive::Plane(_) => "plane",
        }
    }
}

impl From<Sphere> for Primitive {
    fn from(sphere: Sphere) -> Self {
        Primitive::Sphere(sphere)
    }
}

impl From<Plane> for Primitive {
    fn from(plane: Plane) -> Self {
        Primitive::Plane(plane)
    }
}

/// Index of a primitive inside its scene.
///
/// Two intersections hit the same object exactly when their ids are equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub usize);

/// Eye ray and field of view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    /// Eye position and unit viewing direction
    pub eye: Ray,

    /// Field of view in radians
    pub fov: f64,
}

impl Camera {
    /// Create a camera from an eye ray.
    pub fn new(eye: Ray, fov: f64) -> Self {
        Self { eye, fov }
    }

    /// Create a camera at `origin` looking at `target`.
    pub fn look_at(origin: DVec3, target: DVec3, fov: f64) -> Result<Self, MathError> {
        Ok(Self::new(Ray::look_at(origin, target)?, fov))
    }
}

/// A complete, render-ready scene.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    camera: Camera,
    primitives: Vec<Primitive>,
    lights: Vec<Light>,
}

impl Scene {
    /// Create an empty scene seen through `camera`.
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            primitives: Vec::new(),
            lights: Vec::new(),
        }
    }

    /// Add a primitive and return its id.
    pub fn add_primitive(&mut self, primitive: impl Into<Primitive>) -> ObjectId {
        let id = ObjectId(self.primitives.len());
        self.primitives.push(primitive.into());
        id
    }

    /// Add a point light.
    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    /// Builder-style variant of `add_primitive`.
    pub fn with_primitive(mut self, primitive: impl Into<Primitive>) -> Self {
        self.add_primitive(primitive);
        self
    }

    /// Builder-style variant of `add_light`.
    pub fn with_light(mut self, light: Light) -> Self {
        self.add_light(light);
        self
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Look up a primitive by id.
    pub fn primitive(&self, id: ObjectId) -> Option<&Primitive> {
        self.primitives.get(id.0)
    }

    pub fn primitive_count(&self) -> usize {
        self.primitives.len()
    }

    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    /// The built-in demo scene: three chrome spheres inside a closed room of
    /// red floor/ceiling and green walls, lit by two grey point lights.
    pub fn reference() -> Self {
        let chrome = Material::new(0.5, DVec3::new(1.0, 1.0, 1.0));
        let red_surface = Material::new(0.0, DVec3::new(1.0, 0.5, 0.5));
        let green_surface = Material::new(0.0, DVec3::new(0.5, 1.0, 0.5));

        let origin = DVec3::new(20.0, 0.0, 100.0);
        let lookat = DVec3::new(0.0, 20.0, 200.0);
        // Constant, distinct points: the direction is never degenerate
        let camera = Camera::new(Ray::new(origin, (lookat - origin).normalize()), PI / 4.0);

        Scene::new(camera)
            .with_light(Light::new(DVec3::new(-100.0, -100.0, 200.0), DVec3::splat(0.5)))
            .with_light(Light::new(DVec3::new(100.0, -50.0, 100.0), DVec3::splat(0.5)))
            .with_primitive(Sphere::new(DVec3::new(-40.0, 60.0, 200.0), 20.0, chrome))
            .with_primitive(Sphere::new(DVec3::new(0.0, 40.0, 240.0), 40.0, chrome))
            .with_primitive(Sphere::new(DVec3::new(40.0, 60.0, 200.0), 20.0, chrome))
            .with_primitive(Plane::new(DVec3::new(0.0, 80.0, 0.0), DVec3::NEG_Y, red_surface))
            .with_primitive(Plane::new(DVec3::new(0.0, -180.0, 0.0), DVec3::Y, red_surface))
            .with_primitive(Plane::new(DVec3::new(-200.0, 0.0, 0.0), DVec3::X, green_surface))
            .with_primitive(Plane::new(DVec3::new(200.0, 0.0, 0.0), DVec3::NEG_X, green_surface))
            .with_primitive(Plane::new(DVec3::new(0.0, 0.0, 600.0), DVec3::NEG_Z, green_surface))
            .with_primitive(Plane::new(DVec3::new(0.0, 0.0, -600.0), DVec3::Z, green_surface))
    }
}
