use std::cell::RefCell;
use std::rc::Rc;

use geotile_core::containers::{PointView, RawPointTable};
use geotile_core::error::{Error, Result};
use geotile_core::layout::well_known;

use crate::metadata::MetadataNode;
use crate::tile_set::TileSet;

/// Required option: the quadtree depth. Valid range is `0..=30`
/// ([`TileSet::new`] rejects anything larger).
#[derive(Debug, Clone, Copy)]
pub struct TilerOptions {
    pub max_level: u32,
}

/// Lifecycle of one tiler run.
///
/// `Created -> Prepared -> Running -> Done`, with a fatal `Running -> Failed`
/// transition on any error; a failed run emits no output view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageState {
    Created,
    Prepared,
    Running,
    Done,
    Failed,
}

/// Every non-empty view the tiler produced, as the quadtree that owns them:
/// the views live inside their `Tile` nodes for the tree's lifetime, so this
/// set takes ownership of the finished [`TileSet`] rather than copying rows
/// out of it.
pub struct PointViewSet {
    tile_set: TileSet,
}

impl PointViewSet {
    /// All non-empty views, in the same pre-order (west root, then east
    /// root; each tile before its children) the file-tree writer walks.
    pub fn views(&self) -> Vec<&PointView> {
        self.tile_set.emitted_views()
    }

    pub fn len(&self) -> usize {
        self.views().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn tile_set(&self) -> &TileSet {
        &self.tile_set
    }
}

/// Adapts one streaming input [`PointView`] to a [`TileSet`], driving it
/// through `Created -> Prepared -> Running -> Done/Failed`.
pub struct Tiler {
    state: StageState,
    options: TilerOptions,
    tile_set: Option<TileSet>,
    metadata: Option<MetadataNode>,
}

impl Tiler {
    pub fn new(options: TilerOptions) -> Self {
        Self {
            state: StageState::Created,
            options,
            tile_set: None,
            metadata: None,
        }
    }

    pub fn state(&self) -> StageState {
        self.state
    }

    pub fn options(&self) -> TilerOptions {
        self.options
    }

    /// Requires a layout with `X`, `Y` and `Z` registered. Builds the
    /// `"tileSet"` metadata subtree (`maxLevel`, grid shape, world bbox, one
    /// child per input dimension) and a fresh `TileSet` bound to `table`.
    pub fn ready(&mut self, table: Rc<RefCell<RawPointTable>>) -> Result<()> {
        if !table.borrow().layout().has_xyz() {
            return Err(Error::MissingXyz("X/Y/Z"));
        }

        let mut tile_set_node = MetadataNode::branch(
            "tileSet",
            vec![
                MetadataNode::leaf("maxLevel", self.options.max_level),
                MetadataNode::leaf("numCols", 2),
                MetadataNode::leaf("numRows", 1),
                MetadataNode::leaf("minx", -180.0),
                MetadataNode::leaf("miny", -90.0),
                MetadataNode::leaf("maxx", 180.0),
                MetadataNode::leaf("maxy", 90.0),
            ],
        );
        for dim in table.borrow().layout().dimensions() {
            tile_set_node.push(MetadataNode::leaf(dim.name(), dim.datatype().to_string()));
        }

        self.tile_set = Some(TileSet::new(table, self.options.max_level)?);
        self.metadata = Some(tile_set_node);
        self.state = StageState::Prepared;
        log::info!("tiler prepared, maxLevel={}", self.options.max_level);
        Ok(())
    }

    pub fn metadata(&self) -> Option<&MetadataNode> {
        self.metadata.as_ref()
    }

    /// Iterates `view` in index order, reading `X`/`Y` as `f64` and handing
    /// each row to [`TileSet::add_point`]. On success, computes masks, then
    /// walks the finished tree pre-order and attaches one `"tile"` metadata
    /// child per node (`level`, `tileX`, `tileY`, `mask`, and `pointView`
    /// when the tile owns a non-empty view) to the `"tileSet"` node, and
    /// returns the set of every non-empty view in the tree. Any failure is
    /// fatal: transitions to `Failed` and emits nothing.
    pub fn run(&mut self, view: &PointView) -> Result<PointViewSet> {
        if self.state != StageState::Prepared && self.state != StageState::Running {
            return Err(Error::StageNotReady("tiler must be ready() before run()"));
        }
        self.state = StageState::Running;

        let tile_set = self.tile_set.as_mut().expect("ready() sets tile_set before Running");
        for row in 0..view.len() {
            let result = (|| -> Result<()> {
                let lon = view.get_field_as::<f64>(well_known::x(), row)?;
                let lat = view.get_field_as::<f64>(well_known::y(), row)?;
                tile_set.add_point(view, row, lon, lat)
            })();
            if let Err(err) = result {
                self.state = StageState::Failed;
                return Err(err);
            }
        }

        tile_set.set_masks();
        if let Some(metadata) = &mut self.metadata {
            for root in tile_set.roots() {
                root.visit_preorder(&mut |tile| {
                    let mut fields = vec![
                        MetadataNode::leaf("level", tile.level()),
                        MetadataNode::leaf("tileX", tile.tile_x()),
                        MetadataNode::leaf("tileY", tile.tile_y()),
                        MetadataNode::leaf("mask", tile.mask()),
                    ];
                    if let Some(view) = tile.view() {
                        fields.push(MetadataNode::leaf("pointView", view.id()));
                    }
                    metadata.push(MetadataNode::branch("tile", fields));
                });
            }
        }

        let tile_set = self.tile_set.take().expect("checked above");
        self.state = StageState::Done;
        log::info!("tiler done, {} input rows consumed", view.len());
        Ok(PointViewSet { tile_set })
    }
}
