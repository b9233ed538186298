//! Render driver.
//!
//! Implements whole-image rendering with:
//! - Parallel bucket rendering through rayon
//! - A sequential path over the lazy pixel iterator
//! - Row-major image assembly and 8-bit quantization

use std::time::Instant;

use glint_core::Scene;
use glint_math::{Color, MathError};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bucket::{generate_buckets, render_bucket, BucketResult, DEFAULT_BUCKET_SIZE};
use crate::profile::Profile;
use crate::sampler::Sampler;
use crate::tracer::Tracer;

/// Errors that can occur while setting up a render.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Image must have non-zero size, got {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    #[error("Camera basis is degenerate (view direction parallel to world up): {0}")]
    Math(#[from] MathError),

    #[error("Failed to build render thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("max_depth must be at most {limit}, got {max_depth}")]
    MaxDepthTooLarge { max_depth: u32, limit: u32 },

    #[error("sample_radius must be at most {limit}, got {sample_radius}")]
    SampleRadiusTooLarge { sample_radius: u32, limit: u32 },
}

/// Upper bound on `RenderConfig::max_depth`.
pub const MAX_REFLECTION_DEPTH: u32 = 64;

/// Upper bound on `RenderConfig::sample_radius` (a 33x33 grid).
pub const MAX_SAMPLE_RADIUS: u32 = 16;

/// Render configuration.
///
/// Defaults reproduce the classic renderer: a 5x5 sample grid a quarter
/// pixel apart, reflections cut off below 10% influence, Phong exponent 40.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Sub-samples per axis on each side of the pixel (2 gives a 5x5 grid)
    pub sample_radius: u32,
    /// Distance between sub-samples, in pixels
    pub sample_spacing: f64,
    /// Reflection chains stop once their influence drops below this
    pub min_influence: f64,
    /// Hard cap on reflection bounces
    pub max_depth: u32,
    /// Offset along the reflected direction to avoid self-intersection
    pub reflection_bias: f64,
    /// Exponent of the specular highlight term
    pub specular_exponent: f64,
    /// Initial search horizon for nearest-hit queries
    pub max_distance: f64,
    /// Edge length of a parallel render bucket, in pixels
    pub bucket_size: u32,
    /// Worker threads for parallel rendering (None uses rayon's default)
    pub threads: Option<usize>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            sample_radius: 2,
            sample_spacing: 0.25,
            min_influence: 0.1,
            max_depth: 30,
            reflection_bias: 1e-4,
            specular_exponent: 40.0,
            max_distance: 1e6,
            bucket_size: DEFAULT_BUCKET_SIZE,
            threads: None,
        }
    }
}

impl RenderConfig {
    /// Number of rays traced per pixel.
    pub fn samples_per_pixel(&self) -> u64 {
        let side = 2 * self.sample_radius as u64 + 1;
        side * side
    }

    /// Reject settings that would make a render run away.
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.max_depth > MAX_REFLECTION_DEPTH {
            return Err(RenderError::MaxDepthTooLarge {
                max_depth: self.max_depth,
                limit: MAX_REFLECTION_DEPTH,
            });
        }
        if self.sample_radius > MAX_SAMPLE_RADIUS {
            return Err(RenderError::SampleRadiusTooLarge {
                sample_radius: self.sample_radius,
                limit: MAX_SAMPLE_RADIUS,
            });
        }
        Ok(())
    }
}

/// Convert a color to 8-bit RGB.
///
/// Each channel is scaled by 255 and truncated, then clamped to [0, 255].
pub fn color_to_rgb(color: Color) -> [u8; 3] {
    let quantize = |c: f64| (c * 255.0).clamp(0.0, 255.0) as u8;
    [quantize(color.x), quantize(color.y), quantize(color.z)]
}

/// Row-major image buffer for render output.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Copy a rendered bucket into place.
    pub fn write_bucket(&mut self, result: &BucketResult) {
        let bucket = &result.bucket;
        let mut colors = result.pixels.iter();

        for local_y in 0..bucket.height {
            for local_x in 0..bucket.width {
                if let Some(&color) = colors.next() {
                    self.set(bucket.x + local_x, bucket.y + local_y, color);
                }
            }
        }
    }

    /// Convert to packed RGB bytes (for saving).
    pub fn to_rgb(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|&c| color_to_rgb(c)).collect()
    }
}

/// A finished render and the rays it took.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub image: ImageBuffer,
    pub profile: Profile,
}

/// Render the scene in parallel, one rayon task per bucket.
///
/// Produces exactly the same pixels as [`render_sequential`].
pub fn render(
    scene: &Scene,
    width: u32,
    height: u32,
    config: &RenderConfig,
) -> Result<RenderOutput, RenderError> {
    let tracer = Tracer::new(scene, config.clone());
    let sampler = Sampler::new(tracer, width, height)?;
    let buckets = generate_buckets(width, height, config.bucket_size.max(1));

    log::info!(
        "Rendering {}x{} @ {} spp in {} buckets",
        width,
        height,
        config.samples_per_pixel(),
        buckets.len()
    );

    let start = Instant::now();
    let render_all = || -> Vec<BucketResult> {
        buckets
            .par_iter()
            .map(|bucket| render_bucket(bucket, &sampler))
            .collect()
    };

    let (results, threads) = match config.threads {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()?;
            (pool.install(render_all), threads)
        }
        None => (render_all(), rayon::current_num_threads()),
    };

    let mut image = ImageBuffer::new(width, height);
    let mut profile = Profile::default();
    for result in &results {
        image.write_bucket(result);
        profile += result.profile;
    }

    let elapsed = start.elapsed();
    log::info!("Rendered in {:?}", elapsed);
    profile.log_summary(elapsed, threads);

    Ok(RenderOutput { image, profile })
}

/// Render the scene on the calling thread by draining the pixel iterator.
pub fn render_sequential(
    scene: &Scene,
    width: u32,
    height: u32,
    config: &RenderConfig,
) -> Result<RenderOutput, RenderError> {
    let tracer = Tracer::new(scene, config.clone());
    let mut pixels = Sampler::new(tracer, width, height)?.into_pixels();

    log::info!(
        "Rendering {}x{} @ {} spp sequentially",
        width,
        height,
        config.samples_per_pixel()
    );

    let start = Instant::now();
    let colors: Vec<Color> = pixels.by_ref().collect();
    let profile = pixels.profile();

    let elapsed = start.elapsed();
    log::info!("Rendered in {:?}", elapsed);
    profile.log_summary(elapsed, 1);

    Ok(RenderOutput {
        image: ImageBuffer {
            width,
            height,
            pixels: colors,
        },
        profile,
    })
}
