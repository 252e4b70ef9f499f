use std::cell::RefCell;
use std::rc::Rc;

use geotile_core::containers::{PointId, PointView, RawPointTable};
use geotile_core::error::{Error, Result};
use geotile_core::geometry::Rectangle;

use crate::tile::Tile;

/// World extent, split into two sibling roots at the antimeridian (spec.md
/// §3): west covers `[-180,-90,0,90]`, east covers `[0,-90,180,90]`. Grid
/// `numCols=2, numRows=1` at level 0.
pub struct TileSet {
    west: Tile,
    east: Tile,
    max_level: u32,
    table: Rc<RefCell<RawPointTable>>,
}

impl TileSet {
    /// `maxLevel` above 30 is rejected: tile indices are stored as `u32`,
    /// and `2^31` columns at the deepest level would overflow it.
    pub fn new(table: Rc<RefCell<RawPointTable>>, max_level: u32) -> Result<Self> {
        if max_level > 30 {
            return Err(Error::MaxLevelTooLarge(max_level));
        }
        let west_rect = Rectangle::new(-180.0, -90.0, 0.0, 90.0);
        let east_rect = Rectangle::new(0.0, -90.0, 180.0, 90.0);
        Ok(Self {
            west: Tile::new(0, 0, 0, west_rect, Rc::clone(&table)),
            east: Tile::new(0, 1, 0, east_rect, Rc::clone(&table)),
            max_level,
            table,
        })
    }

    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    /// Dispatches to the west or east root by `lon < 0`, then runs the
    /// recursive per-tile cascade insertion (spec.md §4.F).
    pub fn add_point(&mut self, source_view: &PointView, pid: PointId, lon: f64, lat: f64) -> Result<()> {
        if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
            return Err(Error::PointOutOfWorld { lon, lat });
        }
        log::trace!("add_point pid={pid} lon={lon} lat={lat}");
        let root = if lon < 0.0 { &mut self.west } else { &mut self.east };
        root.add(source_view, pid, lon, lat, self.max_level);
        Ok(())
    }

    /// Post-order walk over both roots, setting every tile's child mask.
    pub fn set_masks(&mut self) {
        self.west.set_masks();
        self.east.set_masks();
        log::debug!(
            "masks set: west={:#06b} east={:#06b}",
            self.west.mask(),
            self.east.mask()
        );
    }

    /// Per-level tile and point counts across both roots.
    pub fn collect_stats(&self) -> (Vec<u32>, Vec<u64>) {
        let mut tiles_per_level = Vec::new();
        let mut points_per_level = Vec::new();
        self.west.collect_stats(&mut tiles_per_level, &mut points_per_level);
        self.east.collect_stats(&mut tiles_per_level, &mut points_per_level);
        (tiles_per_level, points_per_level)
    }

    pub fn roots(&self) -> [&Tile; 2] {
        [&self.west, &self.east]
    }

    /// The backing table, so persistence layers can read the dimension
    /// layout every emitted view shares.
    pub fn table(&self) -> &Rc<RefCell<RawPointTable>> {
        &self.table
    }

    /// Every non-empty [`PointView`] in the tree, in the pre-order
    /// west-then-east walk that also drives the file-tree writer, giving
    /// the `PointViewSet` the tiler stage emits.
    pub fn emitted_views(&self) -> Vec<&PointView> {
        let mut out = Vec::new();
        for root in self.roots() {
            root.visit_preorder(&mut |tile| {
                if let Some(view) = tile.view() {
                    out.push(view);
                }
            });
        }
        out
    }
}
