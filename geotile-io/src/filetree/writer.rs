use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use geotile_core::layout::Dimension;
use geotile_tiler::{Tile, TileSet};

use crate::codec::{dimension_stats, encode_value_le};
use crate::error::{Error, Result};
use crate::filetree::header::{Header, HeaderDimension, HEADER_VERSION};

/// `filename`/`overwrite` from spec.md §6's writer options, specialized to
/// the file-tree target (a directory, not a single file).
#[derive(Debug, Clone)]
pub struct WriterOptions {
    pub root: PathBuf,
    pub overwrite: bool,
}

/// Writes `header.json` plus one `<root>/<level>/<tx>/<ty>.ria` file per
/// non-empty tile. `root` must not already exist unless
/// `options.overwrite` is set, in which case it is deleted and recreated
/// first — spec.md §5 describes unconditional deletion on start, but an
/// unconditional `rm -rf` of a caller-supplied path is the kind of surprise
/// a library should never spring without an explicit opt-in (see
/// DESIGN.md).
pub fn write(tile_set: &TileSet, options: &WriterOptions) -> Result<()> {
    if options.root.exists() {
        if !options.overwrite {
            return Err(Error::OutputExists(options.root.clone()));
        }
        fs::remove_dir_all(&options.root)?;
    }
    fs::create_dir_all(&options.root)?;

    let table = tile_set.table().borrow();
    let dims: Vec<Dimension> = table.layout().dimensions().to_vec();
    let header_dimensions = dims
        .iter()
        .map(|dim| {
            let (minimum, mean, maximum) = dimension_stats(&table, dim);
            HeaderDimension {
                datatype: dim.datatype().to_string(),
                name: dim.name().to_string(),
                minimum,
                mean,
                maximum,
            }
        })
        .collect();
    drop(table);

    let header = Header {
        version: HEADER_VERSION,
        bbox: [-180.0, -90.0, 180.0, 90.0],
        max_level: tile_set.max_level(),
        num_cols: 2,
        num_rows: 1,
        dimensions: header_dimensions,
    };
    let header_file = fs::File::create(options.root.join("header.json"))?;
    serde_json::to_writer_pretty(header_file, &header)?;

    let mut first_err = None;
    for root in tile_set.roots() {
        root.visit_preorder(&mut |tile: &Tile| {
            if first_err.is_some() {
                return;
            }
            if let Some(view) = tile.view() {
                if let Err(err) = write_tile_patch(&options.root, tile, view, &dims) {
                    first_err = Some(err);
                }
            }
        });
    }
    if let Some(err) = first_err {
        return Err(err);
    }

    log::info!("wrote file tree to {}", options.root.display());
    Ok(())
}

fn write_tile_patch(root: &Path, tile: &Tile, view: &geotile_core::containers::PointView, dims: &[Dimension]) -> Result<()> {
    let dir = root.join(tile.level().to_string()).join(tile.tile_x().to_string());
    fs::create_dir_all(&dir).with_context(|| format!("creating tile directory {}", dir.display()))?;
    let path = dir.join(format!("{}.ria", tile.tile_y()));

    let mut bytes = Vec::new();
    let mut raw = Vec::new();
    for row in 0..view.len() {
        for dim in dims {
            let size = dim.datatype().size();
            raw.resize(size, 0);
            view.get_raw(dim.id(), row, &mut raw);
            encode_value_le(dim.datatype(), &raw, &mut bytes);
        }
    }
    bytes.push(tile.mask());

    let mut file = fs::File::create(&path)?;
    file.write_all(&bytes)?;
    log::trace!("wrote {} ({} points)", path.display(), view.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use geotile_core::containers::{PointView, RawPointTable};
    use geotile_core::layout::{DataType, PointLayout};
    use geotile_tiler::TilerOptions;

    #[test]
    fn refuses_to_overwrite_an_existing_directory_without_the_flag() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("tiles");
        fs::create_dir(&root).unwrap();

        let mut layout = PointLayout::new();
        layout.register(Dimension::new("X", DataType::F64)).unwrap();
        layout.register(Dimension::new("Y", DataType::F64)).unwrap();
        layout.register(Dimension::new("Z", DataType::F64)).unwrap();
        let table = Rc::new(RefCell::new(RawPointTable::new(layout)));
        let tile_set = TileSet::new(table, 1).unwrap();

        let err = write(&tile_set, &WriterOptions { root: root.clone(), overwrite: false });
        assert!(matches!(err, Err(Error::OutputExists(p)) if p == root));
    }

    #[test]
    fn writes_header_and_one_ria_file_per_non_empty_tile() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("tiles");

        let mut layout = PointLayout::new();
        layout.register(Dimension::new("X", DataType::F64)).unwrap();
        layout.register(Dimension::new("Y", DataType::F64)).unwrap();
        layout.register(Dimension::new("Z", DataType::F64)).unwrap();
        let table = Rc::new(RefCell::new(RawPointTable::new(layout)));
        let mut tile_set = TileSet::new(Rc::clone(&table), 1).unwrap();

        let mut source = PointView::new(Rc::clone(&table));
        for (lon, lat) in [(-179.0, 89.0), (179.0, 89.0), (-179.0, -89.0), (179.0, -89.0)] {
            source.append_raw();
            let row = source.len() - 1;
            source.set_field::<f64>(geotile_core::layout::well_known::x(), row, lon).unwrap();
            source.set_field::<f64>(geotile_core::layout::well_known::y(), row, lat).unwrap();
            tile_set.add_point(&source, row, lon, lat).unwrap();
        }
        tile_set.set_masks();

        write(&tile_set, &WriterOptions { root: root.clone(), overwrite: false }).unwrap();

        assert!(root.join("header.json").exists());
        assert!(root.join("0").join("0").join("0.ria").exists());
    }
}
