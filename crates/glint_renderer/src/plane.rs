//! Ray/plane intersection.

use crate::hittable::{Hit, Hittable};
use glint_core::Plane;
use glint_math::Ray;

impl Hittable for Plane {
    fn intersect(&self, ray: &Ray, max_distance: f64) -> Option<Hit> {
        let denom = ray.direction.dot(self.normal);

        // Direction and normal are perpendicular: the ray runs parallel
        if denom == 0.0 {
            return None;
        }

        let distance = (self.origin - ray.origin).dot(self.normal) / denom;

        // Strict on both ends: no hit at the ray origin or on the horizon
        if distance > 0.0 && distance < max_distance {
            Some(Hit {
                point: ray.at(distance),
                distance,
                normal: self.normal,
            })
        } else {
            None
        }
    }
}
