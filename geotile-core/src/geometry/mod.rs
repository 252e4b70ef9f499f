//! Axis-aligned rectangle and quadrant geometry over the WGS-84 world extent.

mod bounds;
mod rectangle;

pub use bounds::{Box2D, Box3D};
pub use rectangle::{Quadrant, Rectangle};
