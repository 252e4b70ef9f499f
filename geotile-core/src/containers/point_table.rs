use crate::layout::PointLayout;

/// Dense row address into a [`RawPointTable`]. Stable for the table's
/// lifetime; rows are never relocated once allocated.
pub type PointId = usize;

/// Rows are grown this many at a time, so `add_point` amortizes to O(1)
/// without reallocating on every single point.
const GROWTH_BLOCK_ROWS: usize = 4096;

/// A growable, contiguous byte arena addressed by [`PointId`], the single
/// owner of all raw point bytes for a tile set (spec.md §3, §4.B; §9 "arena +
/// handles").
///
/// Freed only on `Drop`. `add_point` zero-initializes the new row. Field
/// access is a raw, unchecked byte copy of `dim.datatype().size()` bytes at
/// `id * point_size() + dim.offset` — narrowing and range-checking is
/// [`crate::containers::PointView`]'s job, not this layer's.
pub struct RawPointTable {
    layout: PointLayout,
    data: Vec<u8>,
    len: usize,
}

impl RawPointTable {
    pub fn new(layout: PointLayout) -> Self {
        Self {
            layout,
            data: Vec::new(),
            len: 0,
        }
    }

    pub fn layout(&self) -> &PointLayout {
        &self.layout
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn point_size(&self) -> usize {
        self.layout.point_size()
    }

    /// Allocates the next dense row, freezing the layout on the very first
    /// call, and returns its zero-initialized id.
    pub fn add_point(&mut self) -> PointId {
        if !self.layout.is_frozen() {
            self.layout.freeze();
        }
        let point_size = self.point_size();
        let id = self.len;
        let required = (id + 1) * point_size;
        if required > self.data.len() {
            let block_bytes = GROWTH_BLOCK_ROWS * point_size.max(1);
            let new_len = self.data.len() + block_bytes.max(required - self.data.len());
            self.data.resize(new_len, 0);
        }
        self.len += 1;
        id
    }

    fn row_range(&self, id: PointId, offset: usize, size: usize) -> std::ops::Range<usize> {
        debug_assert!(id < self.len, "PointId {id} out of range (len={})", self.len);
        let base = id * self.point_size() + offset;
        base..base + size
    }

    /// Copies `size` raw bytes at `id`'s `offset` into `out`. `out` must be
    /// exactly `size` bytes long.
    pub fn get_field(&self, id: PointId, offset: usize, size: usize, out: &mut [u8]) {
        out.copy_from_slice(&self.data[self.row_range(id, offset, size)]);
    }

    /// Overwrites `size` raw bytes at `id`'s `offset` with `value`. `value`
    /// must be exactly `size` bytes long.
    pub fn set_field(&mut self, id: PointId, offset: usize, size: usize, value: &[u8]) {
        let range = self.row_range(id, offset, size);
        self.data[range].copy_from_slice(value);
    }
}
