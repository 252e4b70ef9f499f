use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use geotile_core::containers::{PointView, RawPointTable};
use geotile_core::layout::{DataType, Dimension, PointLayout};

use crate::codec::decode_value_le;
use crate::error::{Error, Result};
use crate::filetree::header::Header;

/// Supplement to the write-only original format: the original tiler writes
/// a file tree but never reads one back. Any consumer that wants to verify
/// a run, or a future query tool, needs this; it is the inverse of
/// [`super::writer::write`].
pub fn read_header(root: &Path) -> Result<Header> {
    let file = fs::File::open(root.join("header.json"))?;
    let header: Header = serde_json::from_reader(file)?;
    Ok(header)
}

/// One decoded `.ria` patch: a fresh, self-contained table/view pair (not
/// sharing storage with anything the writer used) plus the tile's child
/// mask byte.
pub struct ReadTile {
    pub table: Rc<RefCell<RawPointTable>>,
    pub view: PointView,
    pub mask: u8,
}

/// Decodes `<root>/<level>/<tx>/<ty>.ria` against the dimension layout
/// recorded in `header`.
pub fn read_tile(root: &Path, header: &Header, level: u32, tx: u32, ty: u32) -> Result<ReadTile> {
    let path = root.join(level.to_string()).join(tx.to_string()).join(format!("{ty}.ria"));
    let bytes = fs::read(&path)?;
    let Some((&mask, body)) = bytes.split_last() else {
        return Err(Error::MalformedTilePath(path));
    };

    let mut layout = PointLayout::new();
    let mut datatypes = Vec::with_capacity(header.dimensions.len());
    for dim in &header.dimensions {
        let datatype = DataType::from_name(&dim.datatype).ok_or_else(|| Error::UnknownDataType(dim.datatype.clone()))?;
        layout.register(Dimension::new(&dim.name, datatype))?;
        datatypes.push(datatype);
    }
    let point_size: usize = datatypes.iter().map(|d| d.size()).sum();
    if point_size == 0 || body.len() % point_size != 0 {
        return Err(Error::PatchDimensionMismatch {
            path,
            declared: datatypes.len(),
            found: body.len(),
        });
    }
    let num_points = body.len() / point_size;

    let table = Rc::new(RefCell::new(RawPointTable::new(layout.clone())));
    let mut view = PointView::new(Rc::clone(&table));
    let mut cursor = 0;
    for _ in 0..num_points {
        view.append_raw();
        let row = view.len() - 1;
        for dim in layout.dimensions() {
            let size = dim.datatype().size();
            let native = decode_value_le(dim.datatype(), &body[cursor..cursor + size]);
            view.set_raw(dim.id(), row, &native);
            cursor += size;
        }
    }

    Ok(ReadTile { table, view, mask })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filetree::writer::{write, WriterOptions};
    use geotile_tiler::TileSet;

    #[test]
    fn reads_back_exactly_what_was_written() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("tiles");

        let mut layout = PointLayout::new();
        layout.register(Dimension::new("X", DataType::F64)).unwrap();
        layout.register(Dimension::new("Y", DataType::F64)).unwrap();
        layout.register(Dimension::new("Z", DataType::F64)).unwrap();
        let table = Rc::new(RefCell::new(RawPointTable::new(layout)));
        let mut tile_set = TileSet::new(Rc::clone(&table), 1).unwrap();

        let mut source = PointView::new(Rc::clone(&table));
        for (lon, lat, z) in [(-179.0, 89.0, 1.0), (179.0, 89.0, 2.0)] {
            source.append_raw();
            let row = source.len() - 1;
            source.set_field::<f64>(geotile_core::layout::well_known::x(), row, lon).unwrap();
            source.set_field::<f64>(geotile_core::layout::well_known::y(), row, lat).unwrap();
            source.set_field::<f64>(geotile_core::layout::well_known::z(), row, z).unwrap();
            tile_set.add_point(&source, row, lon, lat).unwrap();
        }
        tile_set.set_masks();
        write(&tile_set, &WriterOptions { root: root.clone(), overwrite: false }).unwrap();

        let header = read_header(&root).unwrap();
        assert_eq!(header.dimensions.len(), 3);

        let root_tile = read_tile(&root, &header, 0, 0, 0).unwrap();
        assert_eq!(root_tile.view.len(), 1);
        let x: f64 = root_tile.view.get_field_as(geotile_core::layout::well_known::x(), 0).unwrap();
        assert_eq!(x, -179.0);
    }
}
