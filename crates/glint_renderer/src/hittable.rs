//! Hittable trait and intersection records.

use glint_core::{ObjectId, Primitive};
use glint_math::{DVec3, Ray};

/// Where a ray meets a single primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Point of intersection
    pub point: DVec3,
    /// Ray parameter of the intersection (never negative)
    pub distance: f64,
    /// Unit surface normal at the intersection
    pub normal: DVec3,
}

impl Hit {
    /// Tag this hit with the scene object it belongs to.
    #[inline]
    pub fn on(self, object: ObjectId) -> Intersection {
        Intersection {
            point: self.point,
            distance: self.distance,
            normal: self.normal,
            object,
        }
    }
}

/// Record of a ray-scene intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Point of intersection
    pub point: DVec3,
    /// Ray parameter of the intersection (never negative)
    pub distance: f64,
    /// Unit surface normal at the intersection
    pub normal: DVec3,
    /// The primitive that was hit
    pub object: ObjectId,
}

/// Trait for geometry that can be hit by rays.
pub trait Hittable {
    /// Test if `ray` hits this object no farther than `max_distance`.
    ///
    /// Returns the nearest non-negative hit, if any.
    fn intersect(&self, ray: &Ray, max_distance: f64) -> Option<Hit>;
}

impl Hittable for Primitive {
    #[inline]
    fn intersect(&self, ray: &Ray, max_distance: f64) -> Option<Hit> {
        match self {
            Primitive::Sphere(sphere) => sphere.intersect(ray, max_distance),
            Primitive::Plane(plane) => plane.intersect(ray, max_distance),
        }
    }
}
