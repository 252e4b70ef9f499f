//! Dimension registry, point layout, raw point storage, point views and the
//! rectangle/quadrant geometry that the tiling engine in `geotile-tiler` is
//! built on.
//!
//! This crate has no notion of a quadtree or a tile; it only provides the
//! typed, column-oriented point store and the 2-D geometry primitives that
//! any consumer walking the WGS-84 world extent needs.

pub mod containers;
pub mod error;
pub mod geometry;
pub mod layout;

pub use error::{Error, Result};
