use crate::layout::DataType;

/// Errors produced by the dimension registry, point layout, raw point table,
/// point view and tile geometry primitives.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("cannot register dimension `{name}`: layout is frozen because rows already exist")]
    LayoutFrozen { name: String },

    #[error("point view is missing a required dimension: {0}")]
    MissingXyz(&'static str),

    #[error("point ({lon}, {lat}) lies outside the world extent [-180,180] x [-90,90]")]
    PointOutOfWorld { lon: f64, lat: f64 },

    #[error(
        "value {value} for dimension `{dim_name}` does not fit: {source} -> {target_type}"
    )]
    ConversionRangeError {
        dim_name: String,
        source: DataType,
        target_type: DataType,
        value: f64,
    },

    #[error("clear() called on a view whose index is not an identity mapping starting at its offset")]
    NonIdentityView,

    #[error("invalid quadrant index {0}")]
    InvalidQuadrant(u8),

    #[error("maxLevel {0} exceeds the maximum supported depth of 30")]
    MaxLevelTooLarge(u32),

    #[error("stage is not in a valid state for this call: {0}")]
    StageNotReady(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
