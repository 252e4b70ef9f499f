//! Dimension registry and point record layout.

mod conversion;
mod data_type;
mod dimension;
mod point_layout;

pub use conversion::{read_as_f64, write_from_f64, FieldScalar};
pub use data_type::DataType;
pub use dimension::{well_known, Dimension, DimensionId};
pub use point_layout::{DimensionDetail, PointLayout};
