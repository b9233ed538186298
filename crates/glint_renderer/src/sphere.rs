//! Ray/sphere intersection.

use crate::hittable::{Hit, Hittable};
use glint_core::Sphere;
use glint_math::Ray;

impl Hittable for Sphere {
    fn intersect(&self, ray: &Ray, max_distance: f64) -> Option<Hit> {
        // Geometric form of the quadratic; assumes a unit-length direction
        let v = self.origin - ray.origin;
        let b = v.dot(ray.direction);
        let discriminant = b * b - v.dot(v) + self.radius * self.radius;

        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Far root behind the origin: the whole sphere is behind the ray
        let t1 = b + sqrtd;
        if t1 < 0.0 {
            return None;
        }

        let t2 = b - sqrtd;
        if t2 > max_distance {
            return None;
        }

        // Origin inside the sphere: only the far root is in front
        let t = if t2 < 0.0 { t1 } else { t1.min(t2) };

        let point = ray.at(t);
        let normal = (point - self.origin).normalize();

        Some(Hit {
            point,
            distance: t,
            normal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_core::Material;
    use glint_math::DVec3;

    const EPSILON: f64 = 1e-9;

    fn unit_sphere_at(center: DVec3) -> Sphere {
        Sphere::new(center, 1.0, Material::new(0.0, DVec3::ONE))
    }

    #[test]
    fn test_sphere_hit_from_outside() {
        let sphere = unit_sphere_at(DVec3::new(0.0, 0.0, 10.0));
        let ray = Ray::new(DVec3::ZERO, DVec3::Z);

        let hit = sphere.intersect(&ray, 1e6).unwrap();

        assert!((hit.distance - 9.0).abs() < EPSILON);
        assert!((hit.point - DVec3::new(0.0, 0.0, 9.0)).length() < EPSILON);
        assert!((hit.normal - DVec3::NEG_Z).length() < EPSILON);
    }

    #[test]
    fn test_sphere_roots_straddle_center_projection() {
        let center = DVec3::new(0.0, 0.0, 10.0);
        let sphere = unit_sphere_at(center);

        // Near entry from each side of the sphere along the same line
        let front = sphere.intersect(&Ray::new(DVec3::ZERO, DVec3::Z), 1e6).unwrap();
        let back = sphere
            .intersect(&Ray::new(DVec3::new(0.0, 0.0, 20.0), DVec3::NEG_Z), 1e6)
            .unwrap();

        let midpoint = (front.point + back.point) * 0.5;
        assert!((midpoint - center).length() < EPSILON);
    }

    #[test]
    fn test_sphere_origin_inside_returns_far_root() {
        let sphere = unit_sphere_at(DVec3::ZERO);
        let ray = Ray::new(DVec3::ZERO, DVec3::Z);

        let hit = sphere.intersect(&ray, 1e6).unwrap();

        assert!((hit.distance - 1.0).abs() < EPSILON);
        assert!((hit.normal - DVec3::Z).length() < EPSILON);
    }

    #[test]
    fn test_sphere_behind_ray() {
        let sphere = unit_sphere_at(DVec3::new(0.0, 0.0, -10.0));
        let ray = Ray::new(DVec3::ZERO, DVec3::Z);

        assert!(sphere.intersect(&ray, 1e6).is_none());
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = unit_sphere_at(DVec3::ZERO);
        let ray = Ray::new(DVec3::new(10.0, 0.0, 0.0), DVec3::Y);

        assert!(sphere.intersect(&ray, 1e6).is_none());
    }

    #[test]
    fn test_sphere_tangent() {
        let sphere = unit_sphere_at(DVec3::new(0.0, 1.0, 10.0));
        let ray = Ray::new(DVec3::ZERO, DVec3::Z);

        let hit = sphere.intersect(&ray, 1e6).unwrap();
        assert!((hit.distance - 10.0).abs() < EPSILON);
    }

    #[test]
    fn test_sphere_beyond_max_distance() {
        let sphere = unit_sphere_at(DVec3::new(0.0, 0.0, 10.0));
        let ray = Ray::new(DVec3::ZERO, DVec3::Z);

        assert!(sphere.intersect(&ray, 5.0).is_none());
        assert!(sphere.intersect(&ray, 9.5).is_some());
    }
}
