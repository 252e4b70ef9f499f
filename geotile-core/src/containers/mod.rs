//! Point storage: the raw byte arena and the row-id view layer over it.

mod point_table;
mod point_view;

pub use point_table::{PointId, RawPointTable};
pub use point_view::{Bounds, PointView};
