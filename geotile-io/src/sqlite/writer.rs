use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use geotile_core::layout::Dimension;
use geotile_tiler::{Tile, TileSet};
use rusqlite::{params, Connection, Transaction};

use crate::codec::{dimension_stats, encode_value_le};
use crate::error::{Error, Result};
use crate::sqlite::schema::{
    encode_data_type, SQL_CREATE_DIMENSIONS, SQL_CREATE_TILES, SQL_CREATE_TILE_SETS, SQL_INSERT_DIMENSION, SQL_INSERT_TILE,
    SQL_INSERT_TILE_SET,
};

#[derive(Debug, Clone)]
pub struct WriterOptions {
    pub path: PathBuf,
    pub name: String,
    pub overwrite: bool,
}

/// Writes one tile set to a fresh SQLite database: `create_tile_set ->
/// create_dimensions -> create_tile` (per tile), all inside a single
/// transaction that is committed only on success — an error anywhere in the
/// walk rolls the whole write back when the `Transaction` drops unused
/// (spec.md §9 "scoped SQLite transactions").
pub fn write(tile_set: &TileSet, options: &WriterOptions) -> Result<()> {
    if options.path.exists() {
        if !options.overwrite {
            return Err(Error::OutputExists(options.path.clone()));
        }
        fs::remove_file(&options.path)?;
    }

    let mut conn = Connection::open(&options.path).with_context(|| format!("opening {}", options.path.display()))?;
    conn.execute_batch(SQL_CREATE_TILE_SETS).context("creating TileSets table")?;
    conn.execute_batch(SQL_CREATE_DIMENSIONS).context("creating Dimensions table")?;
    conn.execute_batch(SQL_CREATE_TILES).context("creating Tiles table")?;

    let table = tile_set.table().borrow();
    let dims: Vec<Dimension> = table.layout().dimensions().to_vec();
    let stats: Vec<(f64, f64, f64)> = dims.iter().map(|dim| dimension_stats(&table, dim)).collect();
    drop(table);

    let tx = conn.transaction()?;
    let tile_set_id = create_tile_set(&tx, tile_set, &options.name, dims.len())?;
    create_dimensions(&tx, tile_set_id, &dims, &stats)?;

    let mut first_err = None;
    for root in tile_set.roots() {
        root.visit_preorder(&mut |tile: &Tile| {
            if first_err.is_some() {
                return;
            }
            if let Err(err) = create_tile(&tx, tile_set_id, tile, &dims) {
                first_err = Some(err);
            }
        });
    }
    if let Some(err) = first_err {
        return Err(err);
    }

    tx.commit()?;
    log::info!("wrote tile set {tile_set_id} to {}", options.path.display());
    Ok(())
}

fn create_tile_set(tx: &Transaction, tile_set: &TileSet, name: &str, num_dimensions: usize) -> Result<i64> {
    tx.execute(
        SQL_INSERT_TILE_SET,
        params![name, tile_set.max_level(), 2, 1, -180.0, -90.0, 180.0, 90.0, num_dimensions as i64],
    )?;
    Ok(tx.last_insert_rowid())
}

fn create_dimensions(tx: &Transaction, tile_set_id: i64, dims: &[Dimension], stats: &[(f64, f64, f64)]) -> Result<()> {
    for (position, (dim, &(minimum, mean, maximum))) in dims.iter().zip(stats).enumerate() {
        tx.execute(
            SQL_INSERT_DIMENSION,
            params![tile_set_id, position as i64, dim.name(), encode_data_type(dim.datatype()), minimum, mean, maximum],
        )?;
    }
    Ok(())
}

fn create_tile(tx: &Transaction, tile_set_id: i64, tile: &Tile, dims: &[Dimension]) -> Result<()> {
    let Some(view) = tile.view() else {
        return Ok(());
    };

    let mut patch = Vec::new();
    let mut raw = Vec::new();
    for row in 0..view.len() {
        for dim in dims {
            raw.resize(dim.datatype().size(), 0);
            view.get_raw(dim.id(), row, &mut raw);
            encode_value_le(dim.datatype(), &raw, &mut patch);
        }
    }

    tx.execute(
        SQL_INSERT_TILE,
        params![tile_set_id, tile.level(), tile.tile_x(), tile.tile_y(), tile.mask() as i64, patch],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use geotile_core::containers::{PointView, RawPointTable};
    use geotile_core::layout::{DataType, PointLayout};

    #[test]
    fn writes_one_row_per_non_empty_tile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiles.sqlite");

        let mut layout = PointLayout::new();
        layout.register(Dimension::new("X", DataType::F64)).unwrap();
        layout.register(Dimension::new("Y", DataType::F64)).unwrap();
        layout.register(Dimension::new("Z", DataType::F64)).unwrap();
        let table = Rc::new(RefCell::new(RawPointTable::new(layout)));
        let mut tile_set = TileSet::new(Rc::clone(&table), 1).unwrap();

        let mut source = PointView::new(Rc::clone(&table));
        for (lon, lat) in [(-179.0, 89.0), (179.0, 89.0), (-179.0, -89.0)] {
            source.append_raw();
            let row = source.len() - 1;
            source.set_field::<f64>(geotile_core::layout::well_known::x(), row, lon).unwrap();
            source.set_field::<f64>(geotile_core::layout::well_known::y(), row, lat).unwrap();
            tile_set.add_point(&source, row, lon, lat).unwrap();
        }
        tile_set.set_masks();

        write(&tile_set, &WriterOptions { path: path.clone(), name: "test".into(), overwrite: false }).unwrap();

        let conn = Connection::open(&path).unwrap();
        let tile_count: i64 = conn.query_row("SELECT COUNT(*) FROM Tiles", [], |row| row.get(0)).unwrap();
        assert!(tile_count > 0);
        let dim_count: i64 = conn.query_row("SELECT COUNT(*) FROM Dimensions", [], |row| row.get(0)).unwrap();
        assert_eq!(dim_count, 3);
    }
}
