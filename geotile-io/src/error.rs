use std::path::PathBuf;

/// Failures from the file-tree and SQLite persistence layers.
///
/// `geotile-core`'s own error kinds (layout/view/geometry failures) surface
/// here unchanged through [`Error::Core`]; everything else is specific to
/// reading or writing a finished tile set.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] geotile_core::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("output path `{0}` already exists; pass overwrite = true to replace it")]
    OutputExists(PathBuf),

    #[error("`{0}` is not a valid tile-tree path: expected <root>/<level>/<tx>/<ty>.ria")]
    MalformedTilePath(PathBuf),

    #[error("header.json declares {declared} dimensions but the patch at `{path}` holds {found}")]
    PatchDimensionMismatch {
        path: PathBuf,
        declared: usize,
        found: usize,
    },

    #[error("no tile set with id {0} in this database")]
    UnknownTileSet(i64),

    #[error("unrecognized dimension data type `{0}`")]
    UnknownDataType(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
