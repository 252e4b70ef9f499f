//! The directory-tree persistence format: `header.json` plus one `.ria`
//! binary patch per non-empty tile.

mod header;
mod reader;
mod writer;

pub use header::{Header, HeaderDimension, HEADER_VERSION};
pub use reader::{read_header, read_tile, ReadTile};
pub use writer::{write, WriterOptions};
