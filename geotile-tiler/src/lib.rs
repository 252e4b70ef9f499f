//! The quadtree tile node, the dual-root tile set and the cascade insertion
//! algorithm, plus the streaming tiler pipeline stage built on top of them.
//!
//! Every failure mode this crate can produce is already a
//! [`geotile_core::Error`] variant (`PointOutOfWorld`, `MaxLevelTooLarge`,
//! `StageNotReady`, or one of `PointView`'s own variants bubbling through
//! `get_field_as`), so this crate re-exports the core error type rather than
//! wrapping it in a second, structurally identical enum.

mod metadata;
mod stage;
mod tile;
mod tile_set;

pub use geotile_core::error::{Error, Result};
pub use metadata::MetadataNode;
pub use stage::{PointViewSet, StageState, Tiler, TilerOptions};
pub use tile::Tile;
pub use tile_set::TileSet;
