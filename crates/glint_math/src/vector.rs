// Vector utilities for DVec3
//
// glam already covers add/sub/componentwise mul, scalar mul, dot, cross and
// normalize. This adds mirror reflection and a normalize that reports
// zero-length input instead of producing NaNs.

use glam::DVec3;
use thiserror::Error;

/// Errors from vector operations with preconditions.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    #[error("cannot normalize a zero-length or non-finite vector")]
    DegenerateVector,
}

/// Extension trait for DVec3 used by the tracer.
pub trait VectorExt: Sized {
    /// Reflect `self` about `normal`: `self - normal * (2 * self.dot(normal))`.
    ///
    /// `normal` must be unit length.
    fn reflect_about(self, normal: Self) -> Self;

    /// Normalize, failing when the magnitude is zero.
    fn unit(self) -> Result<Self, MathError>;
}

impl VectorExt for DVec3 {
    #[inline]
    fn reflect_about(self, normal: DVec3) -> DVec3 {
        self - normal * (2.0 * self.dot(normal))
    }

    fn unit(self) -> Result<DVec3, MathError> {
        self.try_normalize().ok_or(MathError::DegenerateVector)
    }
}
