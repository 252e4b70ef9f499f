use std::cell::RefCell;
use std::rc::Rc;

use geotile_core::containers::{PointId, PointView, RawPointTable};
use geotile_core::geometry::{Quadrant, Rectangle};

/// The child-array slot a quadrant is stored under.
///
/// This is *not* `Quadrant::index()` — the tile's children (and therefore
/// its `mask` bits) are ordered `Sw, Se, Ne, Nw` walking the rectangle's
/// perimeter, not by the quadrant enum's own bit-packed discriminant.
fn child_slot(q: Quadrant) -> usize {
    match q {
        Quadrant::Sw => 0,
        Quadrant::Se => 1,
        Quadrant::Ne => 2,
        Quadrant::Nw => 3,
    }
}

fn east_bit(q: Quadrant) -> u32 {
    matches!(q, Quadrant::Se | Quadrant::Ne) as u32
}

fn south_bit(q: Quadrant) -> u32 {
    matches!(q, Quadrant::Sw | Quadrant::Se) as u32
}

/// One quadtree cell.
///
/// Owns a [`PointView`] holding only the points "kept" at this node by the
/// skip cascade (spec.md §4.E, Invariant 3), up to 4 lazily-created
/// children, and a 4-bit `mask` of which child slots are populated
/// (Invariant 2), set by [`Tile::set_masks`].
pub struct Tile {
    level: u32,
    tile_x: u32,
    tile_y: u32,
    rect: Rectangle,
    children: [Option<Box<Tile>>; 4],
    view: Option<PointView>,
    mask: u8,
    table: Rc<RefCell<RawPointTable>>,
}

impl Tile {
    pub(crate) fn new(level: u32, tile_x: u32, tile_y: u32, rect: Rectangle, table: Rc<RefCell<RawPointTable>>) -> Self {
        Self {
            level,
            tile_x,
            tile_y,
            rect,
            children: [None, None, None, None],
            view: None,
            mask: 0,
            table,
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn tile_x(&self) -> u32 {
        self.tile_x
    }

    pub fn tile_y(&self) -> u32 {
        self.tile_y
    }

    pub fn rectangle(&self) -> Rectangle {
        self.rect
    }

    pub fn mask(&self) -> u8 {
        self.mask
    }

    /// The points kept at this node, if any have been added yet.
    pub fn view(&self) -> Option<&PointView> {
        self.view.as_ref()
    }

    /// Children indexed by [`child_slot`]; `None` where no point has
    /// reached that quadrant yet.
    pub fn children(&self) -> [Option<&Tile>; 4] {
        let mut out: [Option<&Tile>; 4] = [None, None, None, None];
        for (i, child) in self.children.iter().enumerate() {
            out[i] = child.as_deref();
        }
        out
    }

    fn own_view_mut(&mut self) -> &mut PointView {
        let table = Rc::clone(&self.table);
        self.view.get_or_insert_with(|| PointView::new(table))
    }

    /// The cascade insertion algorithm (spec.md §4.F): a point is kept in a
    /// node's own view iff its *original* point id is a multiple of
    /// `4^(maxLevel-level)` — at the leaf that power is `4^0=1`, so every
    /// point is kept there unconditionally, and the rule is the same
    /// formula at every level rather than a special case. This keeps the
    /// decision a pure function of `pid`, not a per-node counter: a point's
    /// fate never depends on what else has passed through this node.
    pub(crate) fn add(&mut self, source_view: &PointView, pid: PointId, lon: f64, lat: f64, max_level: u32) {
        if pid as u64 % 4u64.pow(max_level - self.level) == 0 {
            self.own_view_mut().append_from(source_view, pid);
        }

        if self.level == max_level {
            return;
        }

        let q = self.rect.quadrant_of(lon, lat);
        let slot = child_slot(q);
        if self.children[slot].is_none() {
            let child_rect = self.rect.child(q);
            let child_tx = self.tile_x * 2 + east_bit(q);
            let child_ty = self.tile_y * 2 + south_bit(q);
            self.children[slot] = Some(Box::new(Tile::new(
                self.level + 1,
                child_tx,
                child_ty,
                child_rect,
                Rc::clone(&self.table),
            )));
        }
        self.children[slot].as_mut().unwrap().add(source_view, pid, lon, lat, max_level);
    }

    /// In-order walk accumulating tile/point counts per level.
    pub fn collect_stats(&self, tiles_per_level: &mut Vec<u32>, points_per_level: &mut Vec<u64>) {
        let level = self.level as usize;
        if tiles_per_level.len() <= level {
            tiles_per_level.resize(level + 1, 0);
            points_per_level.resize(level + 1, 0);
        }
        tiles_per_level[level] += 1;
        points_per_level[level] += self.view.as_ref().map(|v| v.len() as u64).unwrap_or(0);

        for child in self.children.iter().flatten() {
            child.collect_stats(tiles_per_level, points_per_level);
        }
    }

    /// Post-order walk: children are masked before their parent, so a
    /// node's `mask` always reflects exactly its populated child slots
    /// (Invariant 2), bit `i` set iff `child_slot` `i` is populated.
    pub fn set_masks(&mut self) -> u8 {
        let mut mask = 0u8;
        for (i, child) in self.children.iter_mut().enumerate() {
            if let Some(child) = child {
                child.set_masks();
                mask |= 1 << i;
            }
        }
        self.mask = mask;
        self.mask
    }

    /// Pre-order walk: visits this tile, then each child in ascending
    /// slot order. This is the order the file-tree writer writes patches
    /// in (spec.md §4.E: "writes this node's patch ... then each child").
    pub fn visit_preorder<'a>(&'a self, visitor: &mut dyn FnMut(&'a Tile)) {
        visitor(self);
        for child in self.children.iter().flatten() {
            child.visit_preorder(visitor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geotile_core::layout::{DataType, Dimension, PointLayout};

    fn fresh_table() -> Rc<RefCell<RawPointTable>> {
        let mut layout = PointLayout::new();
        layout.register(Dimension::new("X", DataType::F64)).unwrap();
        layout.register(Dimension::new("Y", DataType::F64)).unwrap();
        layout.register(Dimension::new("Z", DataType::F64)).unwrap();
        Rc::new(RefCell::new(RawPointTable::new(layout)))
    }

    #[test]
    fn first_point_is_always_kept_at_an_internal_tile() {
        let table = fresh_table();
        let mut source = PointView::new(Rc::clone(&table));
        source.append_raw();

        let mut tile = Tile::new(0, 0, 0, Rectangle::new(-180.0, -90.0, 180.0, 90.0), table);
        tile.add(&source, 0, -179.0, 89.0, 2);
        assert_eq!(tile.view().map(|v| v.len()), Some(1));
    }

    #[test]
    fn keep_decision_is_a_pure_function_of_point_id() {
        let table = fresh_table();
        let mut source = PointView::new(Rc::clone(&table));
        for _ in 0..5 {
            source.append_raw();
        }

        // At level 0 with maxLevel 2, only pids that are multiples of 4^2=16
        // are kept, so just pid 0 lands in the root's own view.
        let mut root = Tile::new(0, 0, 0, Rectangle::new(-180.0, -90.0, 180.0, 90.0), Rc::clone(&table));
        for pid in 0..5u64 {
            root.add(&source, pid, -179.0, 89.0, 2);
        }
        assert_eq!(root.view().map(|v| v.len()), Some(1));

        // The same points routed into a leaf tile (level == maxLevel) are all kept.
        let mut leaf = Tile::new(2, 0, 0, Rectangle::new(-180.0, -90.0, 180.0, 90.0), table);
        for pid in 0..5u64 {
            leaf.add(&source, pid, -179.0, 89.0, 2);
        }
        assert_eq!(leaf.view().map(|v| v.len()), Some(5));
    }
}
