//! Jittered-grid supersampling over the image plane.
//!
//! Every pixel is covered by a regular grid of sub-sample rays (5x5 by
//! default, a quarter pixel apart) whose traced colors are averaged.

use std::iter::FusedIterator;

use glint_math::{Color, DVec3, Ray, VectorExt};

use crate::profile::Profile;
use crate::renderer::RenderError;
use crate::tracer::Tracer;

/// Maps pixel coordinates to camera rays and averages their colors.
#[derive(Debug, Clone)]
pub struct Sampler<'a> {
    tracer: Tracer<'a>,
    width: u32,
    height: u32,

    // Camera basis
    eye: Ray,
    right: DVec3,
    up: DVec3,

    // Image plane extents
    half_width: f64,
    half_height: f64,
    pixel_width: f64,
    pixel_height: f64,
}

impl<'a> Sampler<'a> {
    /// Set up the image plane for a `width` x `height` image.
    ///
    /// Fails for an empty image, for a config outside its limits, or when the
    /// view direction is parallel to world up and no camera basis exists.
    pub fn new(tracer: Tracer<'a>, width: u32, height: u32) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyImage { width, height });
        }
        tracer.config().validate()?;

        let camera = *tracer.scene().camera();
        let eye = camera.eye;

        let half_width = camera.fov.tan();
        let half_height = (height as f64 / width as f64) * half_width;

        // A single row or column spans one step instead of dividing by zero
        let pixel_width = (half_width * 2.0) / (width.max(2) as f64 - 1.0);
        let pixel_height = (half_height * 2.0) / (height.max(2) as f64 - 1.0);

        let right = eye.direction.cross(DVec3::Y).unit()?;
        let up = right.cross(eye.direction).unit()?;

        Ok(Self {
            tracer,
            width,
            height,
            eye,
            right,
            up,
            half_width,
            half_height,
            pixel_width,
            pixel_height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tracer(&self) -> &Tracer<'a> {
        &self.tracer
    }

    /// The sub-sample rays for pixel (x, y), rows of the grid outermost.
    pub fn sample_rays(&self, x: u32, y: u32) -> impl Iterator<Item = Ray> + '_ {
        let config = self.tracer.config();
        let radius = config.sample_radius as i64;
        let spacing = config.sample_spacing;

        (-radius..=radius).flat_map(move |yy| {
            (-radius..=radius).map(move |xx| {
                let xcomp = self.right
                    * ((x as f64 + xx as f64 * spacing) * self.pixel_width - self.half_width);
                let ycomp = self.up
                    * ((y as f64 + yy as f64 * spacing) * self.pixel_height - self.half_height);
                Ray::new(
                    self.eye.origin,
                    (self.eye.direction + xcomp + ycomp).normalize(),
                )
            })
        })
    }

    /// Average color of every sub-sample of pixel (x, y).
    pub fn render_pixel(&self, x: u32, y: u32, profile: &mut Profile) -> Color {
        let mut color = Color::ZERO;
        let mut samples = 0usize;

        for ray in self.sample_rays(x, y) {
            profile.camera_rays += 1;
            color += self.tracer.trace_profiled(&ray, 1.0, profile);
            samples += 1;
        }

        color * (1.0 / samples as f64)
    }

    /// Turn this sampler into a lazy row-major pixel sequence.
    pub fn into_pixels(self) -> Pixels<'a> {
        let total = self.width as usize * self.height as usize;
        Pixels {
            sampler: self,
            index: 0,
            total,
            profile: Profile::default(),
        }
    }
}

impl<'a> Tracer<'a> {
    /// Lazily produce the `width * height` pixel colors of the scene in
    /// row-major order.
    pub fn pixels(&self, width: u32, height: u32) -> Result<Pixels<'a>, RenderError> {
        Ok(Sampler::new(self.clone(), width, height)?.into_pixels())
    }
}

/// One-shot iterator over pixel colors, `y` outer and `x` inner.
///
/// Each call to `next` traces one pixel; nothing is computed ahead.
#[derive(Debug, Clone)]
pub struct Pixels<'a> {
    sampler: Sampler<'a>,
    index: usize,
    total: usize,
    profile: Profile,
}

impl<'a> Pixels<'a> {
    /// Rays cast by the pixels produced so far.
    pub fn profile(&self) -> Profile {
        self.profile
    }
}

impl<'a> Iterator for Pixels<'a> {
    type Item = Color;

    fn next(&mut self) -> Option<Color> {
        if self.index >= self.total {
            return None;
        }

        let width = self.sampler.width as usize;
        let x = (self.index % width) as u32;
        let y = (self.index / width) as u32;
        self.index += 1;

        Some(self.sampler.render_pixel(x, y, &mut self.profile))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.index;
        (remaining, Some(remaining))
    }
}

impl<'a> ExactSizeIterator for Pixels<'a> {}

impl<'a> FusedIterator for Pixels<'a> {}
