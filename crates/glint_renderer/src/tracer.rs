//! Whitted-style tracer: nearest hit, shadowed direct light and recursive
//! mirror reflection.

use glint_core::{Light, ObjectId, Scene};
use glint_math::{Color, Ray, VectorExt};

use crate::hittable::{Hittable, Intersection};
use crate::profile::Profile;
use crate::renderer::RenderConfig;

/// Computes colors for rays against a read-only scene.
///
/// A tracer holds no mutable state, so one instance can be shared across
/// rayon workers.
#[derive(Debug, Clone)]
pub struct Tracer<'a> {
    scene: &'a Scene,
    config: RenderConfig,
}

impl<'a> Tracer<'a> {
    /// Create a tracer over `scene`.
    pub fn new(scene: &'a Scene, config: RenderConfig) -> Self {
        Self { scene, config }
    }

    pub fn scene(&self) -> &'a Scene {
        self.scene
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Find the closest primitive hit by `ray`.
    ///
    /// Each accepted hit shrinks the search horizon for the remaining
    /// primitives.
    pub fn find_nearest_intersection(&self, ray: &Ray) -> Option<Intersection> {
        let mut max_distance = self.config.max_distance;
        let mut result = None;

        for (index, primitive) in self.scene.primitives().iter().enumerate() {
            if let Some(hit) = primitive.intersect(ray, max_distance) {
                max_distance = hit.distance;
                result = Some(hit.on(ObjectId(index)));
            }
        }

        result
    }

    /// Cast the shadow ray for `light`.
    ///
    /// The ray starts at the light and travels toward the surface point; the
    /// light is visible when the first thing it meets is the same object.
    fn light_reaches(&self, light: &Light, intersection: &Intersection) -> Option<f64> {
        let light_direction = (light.origin - intersection.point).normalize();
        let shadow_ray = Ray::new(light.origin, -light_direction);

        let blocker = self.find_nearest_intersection(&shadow_ray)?;
        if blocker.object == intersection.object {
            Some(intersection.normal.dot(light_direction))
        } else {
            None
        }
    }

    /// Lights whose shadow ray reaches the intersected object.
    pub fn visible_lights(&self, intersection: &Intersection) -> Vec<&'a Light> {
        self.scene
            .lights()
            .iter()
            .filter(|light| self.light_reaches(light, intersection).is_some())
            .collect()
    }

    /// Local color at `intersection`: diffuse plus specular from every
    /// unshadowed light, modulated by the surface's diffuse color.
    pub fn trace_lights(&self, intersection: &Intersection) -> Color {
        self.shade(intersection, &mut Profile::default())
    }

    fn shade(&self, intersection: &Intersection, profile: &mut Profile) -> Color {
        let mut attenuation = Color::ZERO;

        for light in self.scene.lights() {
            profile.shadow_rays += 1;

            if let Some(factor) = self.light_reaches(light, intersection) {
                if factor > 0.0 {
                    let specular = light.color * factor.powf(self.config.specular_exponent);
                    attenuation += light.color * factor + specular;
                }
            }
        }

        match self.scene.primitive(intersection.object) {
            Some(primitive) => primitive.material().diffuse_color * attenuation,
            None => Color::ZERO,
        }
    }

    /// Color seen along `ray`, weighted by `influence` (1.0 for camera rays).
    pub fn trace(&self, ray: &Ray, influence: f64) -> Color {
        self.trace_profiled(ray, influence, &mut Profile::default())
    }

    /// Same as [`Tracer::trace`], counting the rays it casts into `profile`.
    ///
    /// The bounce chain is followed in a loop, so its length never costs
    /// stack.
    pub fn trace_profiled(&self, ray: &Ray, influence: f64, profile: &mut Profile) -> Color {
        // Local color and reflectiveness of each surface hit, eye side first
        let mut chain: Vec<(Color, f64)> = Vec::new();
        let mut ray = *ray;
        let mut influence = influence;
        let mut depth = 0;

        // Do not reflect to infinity
        while influence >= self.config.min_influence && depth <= self.config.max_depth {
            let Some(intersection) = self.find_nearest_intersection(&ray) else {
                break;
            };
            profile.hits += 1;

            let color = self.shade(&intersection, profile);
            let reflectiveness = self
                .scene
                .primitive(intersection.object)
                .map_or(0.0, |primitive| primitive.material().reflectiveness);
            chain.push((color, reflectiveness));

            if reflectiveness <= 0.0 {
                break;
            }

            // Start slightly off the surface so the bounce does not hit it again
            let direction = ray.direction.reflect_about(intersection.normal);
            ray = Ray::new(
                intersection.point + direction * self.config.reflection_bias,
                direction,
            );
            profile.reflection_rays += 1;

            influence *= reflectiveness;
            depth += 1;
        }

        // Blend back toward the eye; a cut-off chain reflects black
        chain
            .iter()
            .rev()
            .fold(Color::ZERO, |reflected, &(local, reflectiveness)| {
                if reflectiveness <= 0.0 {
                    local
                } else {
                    local * (1.0 - reflectiveness) + reflected * reflectiveness
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_core::{Camera, Material, Plane, Sphere};
    use glint_math::DVec3;

    const EPSILON: f64 = 1e-9;

    fn empty_scene() -> Scene {
        Scene::new(Camera::new(Ray::new(DVec3::ZERO, DVec3::Z), 1.0))
    }

    fn matte(color: DVec3) -> Material {
        Material::new(0.0, color)
    }

    fn close(a: Color, b: Color) -> bool {
        (a - b).length() < EPSILON
    }

    #[test]
    fn test_nearest_of_overlapping_spheres() {
        let scene = empty_scene()
            .with_primitive(Sphere::new(DVec3::new(0.0, 0.0, 12.0), 2.0, matte(DVec3::ONE)))
            .with_primitive(Sphere::new(DVec3::new(0.0, 0.0, 10.0), 2.0, matte(DVec3::ONE)));
        let tracer = Tracer::new(&scene, RenderConfig::default());

        let hit = tracer
            .find_nearest_intersection(&Ray::new(DVec3::ZERO, DVec3::Z))
            .unwrap();

        assert_eq!(hit.object, ObjectId(1));
        assert!((hit.distance - 8.0).abs() < EPSILON);
    }

    #[test]
    fn test_nearest_order_independent() {
        let scene = empty_scene()
            .with_primitive(Sphere::new(DVec3::new(0.0, 0.0, 10.0), 2.0, matte(DVec3::ONE)))
            .with_primitive(Sphere::new(DVec3::new(0.0, 0.0, 12.0), 2.0, matte(DVec3::ONE)));
        let tracer = Tracer::new(&scene, RenderConfig::default());

        let hit = tracer
            .find_nearest_intersection(&Ray::new(DVec3::ZERO, DVec3::Z))
            .unwrap();

        assert_eq!(hit.object, ObjectId(0));
        assert!((hit.distance - 8.0).abs() < EPSILON);
    }

    #[test]
    fn test_nearest_in_empty_scene() {
        let scene = empty_scene();
        let tracer = Tracer::new(&scene, RenderConfig::default());

        assert!(tracer
            .find_nearest_intersection(&Ray::new(DVec3::ZERO, DVec3::Z))
            .is_none());
    }

    #[test]
    fn test_trace_lights_unobstructed() {
        // Light straight in front of a wall facing the camera
        let diffuse = DVec3::new(0.5, 1.0, 0.25);
        let light_color = DVec3::new(0.5, 0.5, 0.5);
        let scene = empty_scene()
            .with_primitive(Plane::new(DVec3::new(0.0, 0.0, 20.0), DVec3::NEG_Z, matte(diffuse)))
            .with_light(Light::new(DVec3::new(0.0, 0.0, 10.0), light_color));
        let tracer = Tracer::new(&scene, RenderConfig::default());

        let hit = tracer
            .find_nearest_intersection(&Ray::new(DVec3::ZERO, DVec3::Z))
            .unwrap();
        let color = tracer.trace_lights(&hit);

        // factor = 1, so diffuse and specular both equal the light color
        let expected = diffuse * (light_color * 1.0 + light_color * 1.0);
        assert!(close(color, expected));
        assert_eq!(tracer.visible_lights(&hit).len(), 1);
    }

    #[test]
    fn test_trace_lights_oblique() {
        let diffuse = DVec3::ONE;
        let light_color = DVec3::ONE;
        let light_origin = DVec3::new(10.0, 0.0, 10.0);
        let scene = empty_scene()
            .with_primitive(Plane::new(DVec3::new(0.0, 0.0, 20.0), DVec3::NEG_Z, matte(diffuse)))
            .with_light(Light::new(light_origin, light_color));
        let tracer = Tracer::new(&scene, RenderConfig::default());

        let hit = tracer
            .find_nearest_intersection(&Ray::new(DVec3::ZERO, DVec3::Z))
            .unwrap();
        let color = tracer.trace_lights(&hit);

        let factor = DVec3::NEG_Z.dot((light_origin - hit.point).normalize());
        let expected = light_color * factor + light_color * factor.powf(40.0);
        assert!(factor > 0.0 && factor < 1.0);
        assert!(close(color, expected));
    }

    #[test]
    fn test_trace_lights_facing_away() {
        // Light behind the wall: the shadow ray reaches the wall from its back
        let scene = empty_scene()
            .with_primitive(Plane::new(DVec3::new(0.0, 0.0, 20.0), DVec3::NEG_Z, matte(DVec3::ONE)))
            .with_light(Light::new(DVec3::new(0.0, 0.0, 30.0), DVec3::ONE));
        let tracer = Tracer::new(&scene, RenderConfig::default());

        let hit = tracer
            .find_nearest_intersection(&Ray::new(DVec3::ZERO, DVec3::Z))
            .unwrap();

        assert!(close(tracer.trace_lights(&hit), Color::ZERO));
        // The light still reaches the object, it just faces the wrong way
        assert_eq!(tracer.visible_lights(&hit).len(), 1);
    }

    #[test]
    fn test_trace_lights_shadowed() {
        // A sphere between the light and the wall blocks it
        let scene = empty_scene()
            .with_primitive(Plane::new(DVec3::new(0.0, 0.0, 20.0), DVec3::NEG_Z, matte(DVec3::ONE)))
            .with_primitive(Sphere::new(DVec3::new(0.0, 0.0, 15.0), 1.0, matte(DVec3::ONE)))
            .with_light(Light::new(DVec3::new(0.0, 0.0, 10.0), DVec3::ONE));
        let tracer = Tracer::new(&scene, RenderConfig::default());

        let wall_hit = tracer
            .find_nearest_intersection(&Ray::new(DVec3::new(0.0, 0.0, 18.0), DVec3::Z))
            .unwrap();
        assert_eq!(wall_hit.object, ObjectId(0));

        assert!(close(tracer.trace_lights(&wall_hit), Color::ZERO));
        assert!(tracer.visible_lights(&wall_hit).is_empty());
    }

    #[test]
    fn test_trace_without_lights_is_black() {
        let scene = empty_scene()
            .with_primitive(Sphere::new(DVec3::new(0.0, 0.0, 10.0), 1.0, matte(DVec3::ONE)));
        let tracer = Tracer::new(&scene, RenderConfig::default());

        assert_eq!(tracer.trace(&Ray::new(DVec3::ZERO, DVec3::Z), 1.0), Color::ZERO);
    }

    #[test]
    fn test_trace_miss_is_black() {
        let scene = empty_scene()
            .with_primitive(Sphere::new(DVec3::new(0.0, 0.0, 10.0), 1.0, matte(DVec3::ONE)))
            .with_light(Light::new(DVec3::ZERO, DVec3::ONE));
        let tracer = Tracer::new(&scene, RenderConfig::default());

        assert_eq!(tracer.trace(&Ray::new(DVec3::ZERO, DVec3::NEG_Z), 1.0), Color::ZERO);
    }

    #[test]
    fn test_trace_below_min_influence_is_black() {
        let scene = empty_scene()
            .with_primitive(Plane::new(DVec3::new(0.0, 0.0, 20.0), DVec3::NEG_Z, matte(DVec3::ONE)))
            .with_light(Light::new(DVec3::new(0.0, 0.0, 10.0), DVec3::ONE));
        let tracer = Tracer::new(&scene, RenderConfig::default());
        let ray = Ray::new(DVec3::ZERO, DVec3::Z);

        let mut profile = Profile::default();
        assert_eq!(tracer.trace_profiled(&ray, 0.09, &mut profile), Color::ZERO);
        assert_eq!(profile.hits, 0);
        assert!(tracer.trace(&ray, 0.1).length() > 0.0);
    }

    #[test]
    fn test_trace_matte_is_local_color() {
        let scene = empty_scene()
            .with_primitive(Plane::new(DVec3::new(0.0, 0.0, 20.0), DVec3::NEG_Z, matte(DVec3::ONE)))
            .with_light(Light::new(DVec3::new(3.0, 0.0, 10.0), DVec3::splat(0.5)));
        let tracer = Tracer::new(&scene, RenderConfig::default());
        let ray = Ray::new(DVec3::ZERO, DVec3::Z);

        let hit = tracer.find_nearest_intersection(&ray).unwrap();
        let mut profile = Profile::default();
        let color = tracer.trace_profiled(&ray, 1.0, &mut profile);

        assert_eq!(color, tracer.trace_lights(&hit));
        assert_eq!(profile.reflection_rays, 0);
        assert_eq!(profile.hits, 1);
        assert_eq!(profile.shadow_rays, 1);
    }

    /// Two facing mirrors with a ray bouncing between them along Z.
    fn mirror_corridor(reflectiveness: f64) -> Scene {
        let mirror = Material::new(reflectiveness, DVec3::ONE);
        empty_scene()
            .with_primitive(Plane::new(DVec3::ZERO, DVec3::Z, mirror))
            .with_primitive(Plane::new(DVec3::new(0.0, 0.0, 10.0), DVec3::NEG_Z, mirror))
    }

    #[test]
    fn test_reflection_stops_when_influence_decays() {
        for reflectiveness in [0.5, 0.7, 0.9] {
            let scene = mirror_corridor(reflectiveness);
            let tracer = Tracer::new(&scene, RenderConfig::default());
            let ray = Ray::new(DVec3::new(0.0, 0.0, 5.0), DVec3::Z);

            let mut profile = Profile::default();
            tracer.trace_profiled(&ray, 1.0, &mut profile);

            let expected = (0.1_f64.ln() / reflectiveness.ln()).ceil() as usize;
            assert_eq!(profile.hits, expected, "reflectiveness {}", reflectiveness);
            assert_eq!(profile.reflection_rays, expected);
        }
    }

    #[test]
    fn test_perfect_mirror_stops_at_depth_limit() {
        let scene = mirror_corridor(1.0);
        let config = RenderConfig {
            max_depth: 3,
            ..Default::default()
        };
        let tracer = Tracer::new(&scene, config);
        let ray = Ray::new(DVec3::new(0.0, 0.0, 5.0), DVec3::Z);

        let mut profile = Profile::default();
        let color = tracer.trace_profiled(&ray, 1.0, &mut profile);

        assert_eq!(profile.hits, 4);
        assert_eq!(color, Color::ZERO);
    }

    #[test]
    fn test_unbounded_depth_does_not_exhaust_stack() {
        let scene = mirror_corridor(1.0);
        let config = RenderConfig {
            max_depth: 200_000,
            ..Default::default()
        };
        let tracer = Tracer::new(&scene, config);
        let ray = Ray::new(DVec3::new(0.0, 0.0, 5.0), DVec3::Z);

        let mut profile = Profile::default();
        let color = tracer.trace_profiled(&ray, 1.0, &mut profile);

        assert_eq!(profile.hits, 200_001);
        assert_eq!(profile.reflection_rays, 200_001);
        assert_eq!(color, Color::ZERO);
    }

    #[test]
    fn test_light_beyond_search_horizon_is_skipped() {
        // The shadow ray from the light finds nothing within max_distance
        let scene = empty_scene()
            .with_primitive(Plane::new(DVec3::new(0.0, 0.0, 5.0), DVec3::NEG_Z, matte(DVec3::ONE)))
            .with_light(Light::new(DVec3::new(0.0, 0.0, -50.0), DVec3::ONE));
        let ray = Ray::new(DVec3::ZERO, DVec3::Z);

        let near = RenderConfig {
            max_distance: 10.0,
            ..Default::default()
        };
        let tracer = Tracer::new(&scene, near);
        let hit = tracer.find_nearest_intersection(&ray).unwrap();

        assert_eq!(tracer.trace_lights(&hit), Color::ZERO);
        assert!(tracer.visible_lights(&hit).is_empty());
        assert_eq!(tracer.trace(&ray, 1.0), Color::ZERO);

        // Same scene with the default horizon: the light reaches the wall
        let tracer = Tracer::new(&scene, RenderConfig::default());
        let hit = tracer.find_nearest_intersection(&ray).unwrap();

        assert_eq!(tracer.visible_lights(&hit).len(), 1);
        assert!(close(tracer.trace_lights(&hit), DVec3::splat(2.0)));
    }

    #[test]
    fn test_reflection_blends_with_local_color() {
        // A half mirror facing the camera reflects back onto a lit matte wall
        // standing behind the eye
        let mirror = Material::new(0.5, DVec3::ONE);
        let scene = empty_scene()
            .with_primitive(Plane::new(DVec3::new(0.0, 0.0, 20.0), DVec3::NEG_Z, mirror))
            .with_primitive(Plane::new(DVec3::new(0.0, 0.0, -20.0), DVec3::Z, matte(DVec3::ONE)))
            .with_light(Light::new(DVec3::new(0.0, 5.0, 0.0), DVec3::splat(0.5)));
        let tracer = Tracer::new(&scene, RenderConfig::default());
        let ray = Ray::new(DVec3::ZERO, DVec3::Z);

        let mirror_hit = tracer.find_nearest_intersection(&ray).unwrap();
        let local = tracer.trace_lights(&mirror_hit);

        let bounce_origin = mirror_hit.point + DVec3::NEG_Z * 1e-4;
        let bounce = Ray::new(bounce_origin, DVec3::NEG_Z);
        let reflected = tracer.trace(&bounce, 0.5);

        let color = tracer.trace(&ray, 1.0);
        assert!(reflected.length() > 0.0);
        assert!(close(color, local * 0.5 + reflected * 0.5));
    }
}
