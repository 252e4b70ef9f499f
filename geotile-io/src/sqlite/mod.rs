//! The SQLite persistence format: a `TileSets`/`Dimensions`/`Tiles`
//! three-table schema (spec.md §6), written inside a single scoped
//! transaction and readable back tile-by-tile or as a bbox/level-bounded
//! spatial query.

mod reader;
mod schema;
mod writer;

pub use reader::{
    dimension_info, dimensions_for_tile_set, list_tile_sets, query, tile, tile_ids_at_level, tile_set_info, DimensionInfo,
    TileRow, TileSetInfo,
};
pub use writer::{write, WriterOptions};
