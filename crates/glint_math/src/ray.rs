use crate::{DVec3, MathError, VectorExt};

/// A ray in 3D space with an origin and a direction.
///
/// Callers keep `direction` at unit length; it is not re-normalized here.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: DVec3,
    pub direction: DVec3,
}

impl Ray {
    /// Create a new ray.
    pub fn new(origin: DVec3, direction: DVec3) -> Self {
        Self { origin, direction }
    }

    /// Create a ray starting at `origin` and pointing at `target`.
    ///
    /// Fails when the two points coincide, since there is no direction to
    /// normalize.
    pub fn look_at(origin: DVec3, target: DVec3) -> Result<Self, MathError> {
        let direction = (target - origin).unit()?;
        Ok(Self::new(origin, direction))
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + direction * t
    #[inline]
    pub fn at(&self, t: f64) -> DVec3 {
        self.origin + self.direction * t
    }
}
