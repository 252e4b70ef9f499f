//! The eight-canonical-point scenario at `maxLevel=2`: exact tile ids,
//! masks, and view membership for every one of the 18 tiles the cascade
//! produces.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use geotile_core::containers::{PointView, RawPointTable};
use geotile_core::layout::well_known;
use geotile_core::layout::{DataType, Dimension, PointLayout};
use geotile_tiler::{Tile, TileSet};

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

/// `(level, tx, ty, mask, expected Z values of points kept in this tile's view)`.
/// An empty `zs` means the tile has no view at all.
const EXPECTED: &[(u32, u32, u32, u8, &[f64])] = &[
    (0, 0, 0, 15, &[0.0]),
    (0, 1, 0, 15, &[]),
    (1, 0, 0, 8, &[0.0]),
    (2, 0, 0, 0, &[0.0]),
    (1, 1, 0, 4, &[]),
    (2, 3, 0, 0, &[11.0]),
    (1, 0, 1, 1, &[]),
    (2, 0, 3, 0, &[22.0]),
    (1, 1, 1, 2, &[]),
    (2, 3, 3, 0, &[33.0]),
    (1, 2, 0, 2, &[44.0]),
    (2, 5, 1, 0, &[44.0]),
    (1, 3, 0, 1, &[]),
    (2, 6, 1, 0, &[55.0]),
    (1, 2, 1, 4, &[]),
    (2, 5, 2, 0, &[66.0]),
    (1, 3, 1, 8, &[]),
    (2, 6, 2, 0, &[77.0]),
];

fn index_by_level_tx_ty<'a>(tile: &'a Tile, out: &mut BTreeMap<(u32, u32, u32), &'a Tile>) {
    out.insert((tile.level(), tile.tile_x(), tile.tile_y()), tile);
    for child in tile.children().into_iter().flatten() {
        index_by_level_tx_ty(child, out);
    }
}

#[test]
fn eight_canonical_points_produce_exactly_the_eighteen_tiles_spec_describes() {
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

    let mut by_coord = BTreeMap::new();
    for root in tile_set.roots() {
        index_by_level_tx_ty(root, &mut by_coord);
    }
    assert_eq!(by_coord.len(), 18);

    for &(level, tx, ty, mask, expected_zs) in EXPECTED {
        let tile = by_coord
            .get(&(level, tx, ty))
            .unwrap_or_else(|| panic!("missing tile at (level={level}, tx={tx}, ty={ty})"));
        assert_eq!(tile.mask(), mask, "mask mismatch at (level={level}, tx={tx}, ty={ty})");

        match tile.view() {
            None => assert!(expected_zs.is_empty(), "expected a view at (level={level}, tx={tx}, ty={ty})"),
            Some(view) => {
                let mut zs: Vec<f64> = (0..view.len()).map(|row| view.get_field_as::<f64>(well_known::z(), row).unwrap()).collect();
                zs.sort_by(|a, b| a.partial_cmp(b).unwrap());
                let mut expected = expected_zs.to_vec();
                expected.sort_by(|a, b| a.partial_cmp(b).unwrap());
                assert_eq!(zs, expected, "view contents mismatch at (level={level}, tx={tx}, ty={ty})");
            }
        }
    }

    let (tiles_per_level, points_per_level) = tile_set.collect_stats();
    assert_eq!(tiles_per_level, vec![2, 8, 8]);
    assert_eq!(points_per_level, vec![1, 2, 8]);
}
