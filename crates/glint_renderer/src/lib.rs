//! glint renderer - CPU Whitted-style ray tracing.
//!
//! Direct lighting with hard shadows, recursive mirror reflection and 5x5
//! jittered supersampling. Intersection is a linear scan over the scene.

mod bucket;
mod hittable;
mod output;
mod plane;
mod profile;
mod renderer;
mod sampler;
mod sphere;
mod tracer;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use hittable::{Hit, Hittable, Intersection};
pub use output::{save_image, write_ppm, OutputError};
pub use profile::Profile;
pub use renderer::{
    color_to_rgb, render, render_sequential, ImageBuffer, RenderConfig, RenderError,
    RenderOutput, MAX_REFLECTION_DEPTH, MAX_SAMPLE_RADIUS,
};
pub use sampler::{Pixels, Sampler};
pub use tracer::Tracer;

/// Re-export the math and scene types the renderer API is expressed in
pub use glint_core::{Camera, Light, Material, ObjectId, Plane, Primitive, Scene, Sphere};
pub use glint_math::{Color, DVec3, Ray};
