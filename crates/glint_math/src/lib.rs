// Re-export glam for convenience
pub use glam::*;

// glint math types
mod ray;
mod vector;

pub use ray::Ray;
pub use vector::{MathError, VectorExt};

/// RGB color stored in a double-precision vector.
///
/// Channels are nominally in [0, 1] but arithmetic never clamps; quantization
/// happens only when an image is written.
pub type Color = DVec3;
