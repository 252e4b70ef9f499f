use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use geotile_core::containers::{PointView, RawPointTable};
use geotile_core::layout::{read_as_f64, DataType, Dimension, PointLayout};
use rusqlite::{params, Connection, Row};

use crate::codec::decode_value_le;
use crate::error::{Error, Result};
use crate::sqlite::schema::{
    decode_data_type, SQL_LIST_TILE_SETS, SQL_SELECT_DIMENSIONS, SQL_SELECT_DIMENSION_AT, SQL_SELECT_TILES_IN_LEVEL_RANGE,
    SQL_SELECT_TILE_BY_ID, SQL_SELECT_TILE_IDS_AT_LEVEL, SQL_SELECT_TILE_SET,
};

#[derive(Debug, Clone, PartialEq)]
pub struct TileSetInfo {
    pub name: String,
    pub max_level: u32,
    pub num_cols: u32,
    pub num_rows: u32,
    pub bbox: [f64; 4],
    pub num_dimensions: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DimensionInfo {
    pub position: u32,
    pub name: String,
    pub datatype: DataType,
    pub minimum: f64,
    pub mean: f64,
    pub maximum: f64,
}

/// One row from `Tiles`, with its patch decoded into a fresh table/view pair
/// only when `with_points` was requested of [`tile`].
pub struct TileRow {
    pub id: i64,
    pub tile_set_id: i64,
    pub level: u32,
    pub x: u32,
    pub y: u32,
    pub mask: u8,
    pub points: Option<(Rc<RefCell<RawPointTable>>, PointView)>,
}

fn to_not_found(id: i64) -> impl Fn(rusqlite::Error) -> Error {
    move |err| match err {
        rusqlite::Error::QueryReturnedNoRows => Error::UnknownTileSet(id),
        other => Error::Sqlite(other),
    }
}

pub fn list_tile_sets(conn: &Connection) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare(SQL_LIST_TILE_SETS)?;
    let ids = stmt.query_map([], |row| row.get(0))?.collect::<rusqlite::Result<Vec<i64>>>()?;
    Ok(ids)
}

pub fn tile_set_info(conn: &Connection, tile_set_id: i64) -> Result<TileSetInfo> {
    conn.query_row(SQL_SELECT_TILE_SET, params![tile_set_id], |row| {
        Ok(TileSetInfo {
            name: row.get(0)?,
            max_level: row.get::<_, i64>(1)? as u32,
            num_cols: row.get::<_, i64>(2)? as u32,
            num_rows: row.get::<_, i64>(3)? as u32,
            bbox: [row.get(4)?, row.get(5)?, row.get(6)?, row.get(7)?],
            num_dimensions: row.get::<_, i64>(8)? as u32,
        })
    })
    .map_err(to_not_found(tile_set_id))
}

fn row_to_dimension_info(row: &Row) -> rusqlite::Result<DimensionInfo> {
    let encoded: i64 = row.get(2)?;
    let datatype = decode_data_type(encoded).ok_or(rusqlite::Error::InvalidColumnType(
        2,
        "dataType".to_string(),
        rusqlite::types::Type::Integer,
    ))?;
    Ok(DimensionInfo {
        position: row.get::<_, i64>(0)? as u32,
        name: row.get(1)?,
        datatype,
        minimum: row.get(3)?,
        mean: row.get(4)?,
        maximum: row.get(5)?,
    })
}

pub fn dimension_info(conn: &Connection, tile_set_id: i64, position: u32) -> Result<DimensionInfo> {
    conn.query_row(SQL_SELECT_DIMENSION_AT, params![tile_set_id, position], row_to_dimension_info)
        .map_err(to_not_found(tile_set_id))
}

/// Every registered dimension for `tile_set_id`, in layout (position) order.
pub fn dimensions_for_tile_set(conn: &Connection, tile_set_id: i64) -> Result<Vec<DimensionInfo>> {
    let mut stmt = conn.prepare(SQL_SELECT_DIMENSIONS)?;
    let rows = stmt.query_map(params![tile_set_id], row_to_dimension_info)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn tile_ids_at_level(conn: &Connection, tile_set_id: i64, level: u32) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare(SQL_SELECT_TILE_IDS_AT_LEVEL)?;
    let ids = stmt
        .query_map(params![tile_set_id, level], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<i64>>>()?;
    Ok(ids)
}

fn decode_patch(patch: &[u8], dims: &[DimensionInfo]) -> Result<(Rc<RefCell<RawPointTable>>, PointView)> {
    let mut layout = PointLayout::new();
    for dim in dims {
        layout.register(Dimension::new(&dim.name, dim.datatype))?;
    }
    let point_size: usize = dims.iter().map(|d| d.datatype.size()).sum();
    if point_size == 0 || patch.len() % point_size != 0 {
        return Err(Error::PatchDimensionMismatch {
            path: PathBuf::from("<sqlite Tiles.patch>"),
            declared: dims.len(),
            found: patch.len(),
        });
    }
    let num_points = patch.len() / point_size;

    let table = Rc::new(RefCell::new(RawPointTable::new(layout.clone())));
    let mut view = PointView::new(Rc::clone(&table));
    let mut cursor = 0;
    for _ in 0..num_points {
        view.append_raw();
        let row = view.len() - 1;
        for dim in layout.dimensions() {
            let size = dim.datatype().size();
            let native = decode_value_le(dim.datatype(), &patch[cursor..cursor + size]);
            view.set_raw(dim.id(), row, &native);
            cursor += size;
        }
    }
    Ok((table, view))
}

/// Reads one tile, decoding its patch into a fresh view only if
/// `with_points` is set (decoding every tile's points up front would defeat
/// the point of `tile_ids_at_level` returning bare ids first).
pub fn tile(conn: &Connection, id: i64, with_points: bool) -> Result<TileRow> {
    let (tile_set_id, level, x, y, mask, patch): (i64, i64, i64, i64, i64, Vec<u8>) =
        conn.query_row(SQL_SELECT_TILE_BY_ID, params![id], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?, row.get(5)?))
        })?;

    let points = if with_points {
        let dims = dimensions_for_tile_set(conn, tile_set_id)?;
        Some(decode_patch(&patch, &dims)?)
    } else {
        None
    };

    Ok(TileRow {
        id,
        tile_set_id,
        level: level as u32,
        x: x as u32,
        y: y as u32,
        mask: mask as u8,
        points,
    })
}

/// Reconstructs one view made by concatenating every tile's decoded patch
/// in `[min_level, max_level]` whose `X`/`Y` fall inside `bbox`
/// (`[minx, miny, maxx, maxy]`); if the layout has no `X`/`Y` dimension
/// every row passes the filter.
pub fn query(conn: &Connection, tile_set_id: i64, bbox: [f64; 4], min_level: u32, max_level: u32) -> Result<(Rc<RefCell<RawPointTable>>, PointView)> {
    let dims = dimensions_for_tile_set(conn, tile_set_id)?;
    let mut layout = PointLayout::new();
    for dim in &dims {
        layout.register(Dimension::new(&dim.name, dim.datatype))?;
    }
    let point_size: usize = dims.iter().map(|d| d.datatype.size()).sum();
    let x_pos = dims.iter().position(|d| d.name == "X");
    let y_pos = dims.iter().position(|d| d.name == "Y");

    let table = Rc::new(RefCell::new(RawPointTable::new(layout.clone())));
    let mut result = PointView::new(Rc::clone(&table));

    let mut stmt = conn.prepare(SQL_SELECT_TILES_IN_LEVEL_RANGE)?;
    let mut rows = stmt.query(params![tile_set_id, min_level, max_level])?;
    while let Some(row) = rows.next()? {
        let patch: Vec<u8> = row.get(5)?;
        if point_size == 0 {
            continue;
        }
        let num_points = patch.len() / point_size;
        let mut cursor = 0;
        for _ in 0..num_points {
            let mut values = Vec::with_capacity(dims.len());
            for dim in &dims {
                let size = dim.datatype.size();
                values.push(decode_value_le(dim.datatype, &patch[cursor..cursor + size]));
                cursor += size;
            }

            let in_bbox = match (x_pos, y_pos) {
                (Some(xi), Some(yi)) => {
                    let lon = read_as_f64(dims[xi].datatype, &values[xi]);
                    let lat = read_as_f64(dims[yi].datatype, &values[yi]);
                    lon >= bbox[0] && lon <= bbox[2] && lat >= bbox[1] && lat <= bbox[3]
                }
                _ => true,
            };

            if in_bbox {
                result.append_raw();
                let out_row = result.len() - 1;
                for (dim, native) in layout.dimensions().iter().zip(&values) {
                    result.set_raw(dim.id(), out_row, native);
                }
            }
        }
    }

    Ok((table, result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::writer::{write, WriterOptions};
    use geotile_tiler::TileSet;

    #[test]
    fn lists_and_describes_a_written_tile_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiles.sqlite");

        let mut layout = PointLayout::new();
        layout.register(Dimension::new("X", DataType::F64)).unwrap();
        layout.register(Dimension::new("Y", DataType::F64)).unwrap();
        layout.register(Dimension::new("Z", DataType::F64)).unwrap();
        let table = Rc::new(RefCell::new(RawPointTable::new(layout)));
        let mut tile_set = TileSet::new(Rc::clone(&table), 1).unwrap();

        let mut source = PointView::new(Rc::clone(&table));
        for (lon, lat) in [(-179.0, 89.0), (179.0, 89.0)] {
            source.append_raw();
            let row = source.len() - 1;
            source.set_field::<f64>(geotile_core::layout::well_known::x(), row, lon).unwrap();
            source.set_field::<f64>(geotile_core::layout::well_known::y(), row, lat).unwrap();
            tile_set.add_point(&source, row, lon, lat).unwrap();
        }
        tile_set.set_masks();
        write(&tile_set, &WriterOptions { path: path.clone(), name: "test".into(), overwrite: false }).unwrap();

        let conn = Connection::open(&path).unwrap();
        let ids = list_tile_sets(&conn).unwrap();
        assert_eq!(ids.len(), 1);

        let info = tile_set_info(&conn, ids[0]).unwrap();
        assert_eq!(info.name, "test");
        assert_eq!(info.num_dimensions, 3);

        let root_ids = tile_ids_at_level(&conn, ids[0], 0).unwrap();
        assert_eq!(root_ids.len(), 2);

        let root = tile(&conn, root_ids[0], true).unwrap();
        let (_, view) = root.points.unwrap();
        assert_eq!(view.len(), 1);
    }
}
