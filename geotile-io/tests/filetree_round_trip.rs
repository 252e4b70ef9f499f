//! The eight-canonical-point scenario written to a file tree and read back.

use std::cell::RefCell;
use std::rc::Rc;

use geotile_core::containers::{PointView, RawPointTable};
use geotile_core::layout::{well_known, DataType, Dimension, PointLayout};
use geotile_io::filetree::{read_header, read_tile, write, WriterOptions};
use geotile_tiler::TileSet;

const POINTS: [(f64, f64, f64); 8] = [
    (-179.0, 89.0, 0.0),
    (-1.0, 89.0, 11.0),
    (-179.0, -89.0, 22.0),
    (-1.0, -89.0, 33.0),
    (89.0, 1.0, 44.0),
    (91.0, 1.0, 55.0),
    (89.0, -1.0, 66.0),
    (91.0, -1.0, 77.0),
];

#[test]
fn round_trips_the_eight_point_scenario_through_the_file_tree() {
    let mut layout = PointLayout::new();
    layout.register(Dimension::new("X", DataType::F64)).unwrap();
    layout.register(Dimension::new("Y", DataType::F64)).unwrap();
    layout.register(Dimension::new("Z", DataType::F64)).unwrap();
    let table = Rc::new(RefCell::new(RawPointTable::new(layout)));
    let mut tile_set = TileSet::new(Rc::clone(&table), 2).unwrap();

    let mut source = PointView::new(Rc::clone(&table));
    for (lon, lat, z) in POINTS {
        source.append_raw();
        let row = source.len() - 1;
        source.set_field::<f64>(well_known::x(), row, lon).unwrap();
        source.set_field::<f64>(well_known::y(), row, lat).unwrap();
        source.set_field::<f64>(well_known::z(), row, z).unwrap();
        tile_set.add_point(&source, row, lon, lat).unwrap();
    }
    tile_set.set_masks();

    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("tiles");
    write(&tile_set, &WriterOptions { root: root.clone(), overwrite: false }).unwrap();

    let header = read_header(&root).unwrap();
    assert_eq!(header.max_level, 2);
    assert_eq!(header.num_cols, 2);
    assert_eq!(header.num_rows, 1);
    assert_eq!(header.dimensions.len(), 3);

    // root (0,0,0) keeps the first west-hemisphere point to reach it.
    let root_tile = read_tile(&root, &header, 0, 0, 0).unwrap();
    assert_eq!(root_tile.view.len(), 1);
    let z: f64 = root_tile.view.get_field_as(well_known::z(), 0).unwrap();
    assert_eq!(z, 0.0);

    // every level-2 leaf keeps exactly one point.
    for (tx, ty, expected_z) in [(0, 0, 0.0), (3, 0, 11.0), (0, 3, 22.0), (3, 3, 33.0), (5, 1, 44.0), (6, 1, 55.0), (5, 2, 66.0), (6, 2, 77.0)] {
        let leaf = read_tile(&root, &header, 2, tx, ty).unwrap();
        assert_eq!(leaf.view.len(), 1);
        let z: f64 = leaf.view.get_field_as(well_known::z(), 0).unwrap();
        assert_eq!(z, expected_z);
        assert_eq!(leaf.mask, 0);
    }
}
