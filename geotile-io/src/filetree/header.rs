use serde::{Deserialize, Serialize};

/// `header.json`'s on-disk schema version. Bumped whenever the layout of
/// this struct changes in a way that breaks older readers.
pub const HEADER_VERSION: u32 = 4;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeaderDimension {
    pub datatype: String,
    pub name: String,
    pub minimum: f64,
    pub mean: f64,
    pub maximum: f64,
}

/// The manifest written alongside a directory tree of `.ria` patches,
/// describing the tile grid and the per-dimension layout every patch in the
/// tree shares.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Header {
    pub version: u32,
    pub bbox: [f64; 4],
    #[serde(rename = "maxLevel")]
    pub max_level: u32,
    #[serde(rename = "numCols")]
    pub num_cols: u32,
    #[serde(rename = "numRows")]
    pub num_rows: u32,
    pub dimensions: Vec<HeaderDimension>,
}
