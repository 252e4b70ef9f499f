//! DDL for the three-table tile-set schema (spec.md §6).

pub(crate) const SQL_CREATE_TILE_SETS: &str = "
CREATE TABLE IF NOT EXISTS TileSets (
  id INTEGER PRIMARY KEY,
  name TEXT,
  maxLevel INTEGER,
  numCols INTEGER,
  numRows INTEGER,
  minx REAL, miny REAL, maxx REAL, maxy REAL,
  numDimensions INTEGER
);
";

pub(crate) const SQL_CREATE_DIMENSIONS: &str = "
CREATE TABLE IF NOT EXISTS Dimensions (
  id INTEGER PRIMARY KEY,
  tileSetId INTEGER REFERENCES TileSets(id),
  position INTEGER,
  name TEXT,
  dataType INTEGER,
  minimum REAL, mean REAL, maximum REAL
);
";

pub(crate) const SQL_CREATE_TILES: &str = "
CREATE TABLE IF NOT EXISTS Tiles (
  id INTEGER PRIMARY KEY,
  tileSetId INTEGER REFERENCES TileSets(id),
  level INTEGER, x INTEGER, y INTEGER,
  mask INTEGER, patch BLOB
);
";

pub(crate) const SQL_INSERT_TILE_SET: &str = "
INSERT INTO TileSets (name, maxLevel, numCols, numRows, minx, miny, maxx, maxy, numDimensions)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
";

pub(crate) const SQL_INSERT_DIMENSION: &str = "
INSERT INTO Dimensions (tileSetId, position, name, dataType, minimum, mean, maximum)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
";

pub(crate) const SQL_INSERT_TILE: &str = "
INSERT INTO Tiles (tileSetId, level, x, y, mask, patch)
VALUES (?1, ?2, ?3, ?4, ?5, ?6)
";

pub(crate) const SQL_LIST_TILE_SETS: &str = "SELECT id FROM TileSets ORDER BY id";

pub(crate) const SQL_SELECT_TILE_SET: &str = "
SELECT name, maxLevel, numCols, numRows, minx, miny, maxx, maxy, numDimensions
FROM TileSets WHERE id = ?1
";

pub(crate) const SQL_SELECT_DIMENSIONS: &str = "
SELECT position, name, dataType, minimum, mean, maximum
FROM Dimensions WHERE tileSetId = ?1 ORDER BY position
";

pub(crate) const SQL_SELECT_DIMENSION_AT: &str = "
SELECT position, name, dataType, minimum, mean, maximum
FROM Dimensions WHERE tileSetId = ?1 AND position = ?2
";

pub(crate) const SQL_SELECT_TILE_IDS_AT_LEVEL: &str = "
SELECT id FROM Tiles WHERE tileSetId = ?1 AND level = ?2 ORDER BY x, y
";

pub(crate) const SQL_SELECT_TILE_BY_ID: &str = "
SELECT tileSetId, level, x, y, mask, patch FROM Tiles WHERE id = ?1
";

pub(crate) const SQL_SELECT_TILES_IN_LEVEL_RANGE: &str = "
SELECT id, level, x, y, mask, patch
FROM Tiles WHERE tileSetId = ?1 AND level BETWEEN ?2 AND ?3
";

/// High byte of `Dimensions.dataType`: signed int, unsigned int or float.
pub(crate) const DATATYPE_FAMILY_SIGNED: i64 = 0x01;
pub(crate) const DATATYPE_FAMILY_UNSIGNED: i64 = 0x02;
pub(crate) const DATATYPE_FAMILY_FLOAT: i64 = 0x04;

/// Encodes `datatype` as `(family << 8) | size_in_bytes`, e.g. `0x0408` for
/// a 64-bit float (spec.md §6).
pub(crate) fn encode_data_type(datatype: geotile_core::layout::DataType) -> i64 {
    use geotile_core::layout::DataType;
    let family = match datatype {
        DataType::F32 | DataType::F64 => DATATYPE_FAMILY_FLOAT,
        DataType::I8 | DataType::I16 | DataType::I32 | DataType::I64 => DATATYPE_FAMILY_SIGNED,
        DataType::U8 | DataType::U16 | DataType::U32 | DataType::U64 => DATATYPE_FAMILY_UNSIGNED,
    };
    (family << 8) | datatype.size() as i64
}

/// Inverse of [`encode_data_type`].
pub(crate) fn decode_data_type(encoded: i64) -> Option<geotile_core::layout::DataType> {
    use geotile_core::layout::DataType;
    let family = (encoded >> 8) & 0xff;
    let size = encoded & 0xff;
    Some(match (family, size) {
        (DATATYPE_FAMILY_FLOAT, 4) => DataType::F32,
        (DATATYPE_FAMILY_FLOAT, 8) => DataType::F64,
        (DATATYPE_FAMILY_SIGNED, 1) => DataType::I8,
        (DATATYPE_FAMILY_SIGNED, 2) => DataType::I16,
        (DATATYPE_FAMILY_SIGNED, 4) => DataType::I32,
        (DATATYPE_FAMILY_SIGNED, 8) => DataType::I64,
        (DATATYPE_FAMILY_UNSIGNED, 1) => DataType::U8,
        (DATATYPE_FAMILY_UNSIGNED, 2) => DataType::U16,
        (DATATYPE_FAMILY_UNSIGNED, 4) => DataType::U32,
        (DATATYPE_FAMILY_UNSIGNED, 8) => DataType::U64,
        _ => return None,
    })
}
