//! Ray counters collected while rendering.

use std::ops::{Add, AddAssign};
use std::time::Duration;

/// Counts of rays cast during a render.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub camera_rays: usize,     // primary rays from the eye
    pub reflection_rays: usize, // mirror bounces spawned at reflective hits
    pub shadow_rays: usize,     // rays cast from lights toward surface points
    pub hits: usize,            // traced rays that found a surface
}

impl Profile {
    /// Every ray cast, of any kind.
    pub fn total_rays(&self) -> usize {
        self.camera_rays + self.reflection_rays + self.shadow_rays
    }

    pub fn combine(&self, other: Self) -> Self {
        Profile {
            camera_rays: self.camera_rays + other.camera_rays,
            reflection_rays: self.reflection_rays + other.reflection_rays,
            shadow_rays: self.shadow_rays + other.shadow_rays,
            hits: self.hits + other.hits,
        }
    }

    /// Log ray totals and throughput at info level.
    pub fn log_summary(&self, elapsed: Duration, threads: usize) {
        let seconds = elapsed.as_secs_f64().max(f64::EPSILON);
        let total = self.total_rays();

        log::info!(
            "{} camera rays, {} reflection rays, {} shadow rays, {} surface hits",
            self.camera_rays,
            self.reflection_rays,
            self.shadow_rays,
            self.hits
        );
        log::info!(
            "{} total rays at {:.0} per second and {:.0} per second per thread",
            total,
            total as f64 / seconds,
            total as f64 / seconds / threads.max(1) as f64
        );
    }
}

impl Add for Profile {
    type Output = Profile;

    fn add(self, other: Profile) -> Profile {
        self.combine(other)
    }
}

impl AddAssign for Profile {
    fn add_assign(&mut self, other: Profile) {
        *self = self.combine(other);
    }
}

impl std::iter::Sum for Profile {
    fn sum<I: Iterator<Item = Profile>>(iter: I) -> Profile {
        iter.fold(Profile::default(), |acc, p| acc + p)
    }
}
