use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::containers::point_table::{PointId, RawPointTable};
use crate::error::{Error, Result};
use crate::geometry::{Box2D, Box3D};
use crate::layout::{read_as_f64, well_known, write_from_f64, DimensionId, FieldScalar};

/// The bounds returned by [`PointView::calculate_bounds`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bounds {
    TwoD(Box2D),
    ThreeD(Box3D),
}

fn next_view_id() -> u64 {
    static NEXT: AtomicU64 = AtomicU64::new(0);
    NEXT.fetch_add(1, Ordering::Relaxed)
}

/// An ordered sequence of row-id references into a shared [`RawPointTable`].
///
/// Multiple views may alias the same underlying rows; appending either
/// requests a brand new raw row (`append_raw`, writer semantics) or copies a
/// row-id reference from another view (`append_from`, projection semantics).
/// A temporary-row free list supports scratch rows appended past the
/// committed size without disturbing it (spec.md §3, §4.C).
pub struct PointView {
    table: Rc<RefCell<RawPointTable>>,
    index: Vec<PointId>,
    committed_size: usize,
    temp_free_list: Vec<usize>,
    offset: usize,
    id: u64,
}

impl PointView {
    pub fn new(table: Rc<RefCell<RawPointTable>>) -> Self {
        Self {
            table,
            index: Vec::new(),
            committed_size: 0,
            temp_free_list: Vec::new(),
            offset: 0,
            id: next_view_id(),
        }
    }

    /// Creates an empty sibling view over the same backing table.
    pub fn make_new(&self) -> Self {
        Self::new(Rc::clone(&self.table))
    }

    pub fn table(&self) -> &Rc<RefCell<RawPointTable>> {
        &self.table
    }

    /// This view's unique, monotonically-assigned handle, used to reference
    /// it from emitted metadata.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Number of committed rows. Entries in `index` beyond this are scratch
    /// (temporary) rows only (Invariant 5).
    pub fn len(&self) -> usize {
        self.committed_size
    }

    pub fn is_empty(&self) -> bool {
        self.committed_size == 0
    }

    fn assert_no_outstanding_temps(&self) {
        assert!(
            self.temp_free_list.is_empty() && self.index.len() == self.committed_size,
            "cannot append a committed row while temporary rows are outstanding on this view"
        );
    }

    /// Allocates a brand new raw row in the backing table and appends its id
    /// (writer semantics).
    pub fn append_raw(&mut self) -> PointId {
        self.assert_no_outstanding_temps();
        let raw_id = self.table.borrow_mut().add_point();
        self.index.push(raw_id);
        self.committed_size += 1;
        raw_id
    }

    /// Appends `other.index[other_row]` without copying any bytes
    /// (projection semantics). `self` and `other` must share the same
    /// backing table.
    pub fn append_from(&mut self, other: &PointView, other_row: usize) {
        self.assert_no_outstanding_temps();
        debug_assert!(
            Rc::ptr_eq(&self.table, &other.table),
            "append_from requires both views to share the same backing table"
        );
        let raw_id = other.index[other_row];
        self.index.push(raw_id);
        self.committed_size += 1;
    }

    fn dim_detail(&self, dim: DimensionId) -> crate::layout::DimensionDetail {
        self.table
            .borrow()
            .layout()
            .dim_detail(dim)
            .unwrap_or_else(|| panic!("dimension {:?} is not registered in this view's point layout", dim))
    }

    /// Reads the raw bytes of `dim` at `row` with no conversion or checks.
    pub fn get_raw(&self, dim: DimensionId, row: usize, out: &mut [u8]) {
        let detail = self.dim_detail(dim);
        let raw_id = self.index[row];
        self.table.borrow().get_field(raw_id, detail.offset, detail.datatype.size(), out);
    }

    /// Writes `value` as the raw bytes of `dim` at `row` with no conversion
    /// or checks. `value` must be exactly `dim`'s storage size.
    pub fn set_raw(&mut self, dim: DimensionId, row: usize, value: &[u8]) {
        let detail = self.dim_detail(dim);
        let raw_id = self.index[row];
        self.table.borrow_mut().set_field(raw_id, detail.offset, detail.datatype.size(), value);
    }

    /// Walks `dims` in order, concatenating each dimension's raw bytes into
    /// `out`. `out` must be exactly the sum of the dimensions' sizes.
    pub fn get_packed(&self, dims: &[DimensionId], row: usize, out: &mut [u8]) {
        let mut cursor = 0;
        for &dim in dims {
            let detail = self.dim_detail(dim);
            let size = detail.datatype.size();
            self.get_raw(dim, row, &mut out[cursor..cursor + size]);
            cursor += size;
        }
    }

    /// Walks `dims` in order, writing each dimension's raw bytes out of the
    /// corresponding slice of `value`.
    pub fn set_packed(&mut self, dims: &[DimensionId], row: usize, value: &[u8]) {
        let mut cursor = 0;
        for &dim in dims {
            let detail = self.dim_detail(dim);
            let size = detail.datatype.size();
            self.set_raw(dim, row, &value[cursor..cursor + size]);
            cursor += size;
        }
    }

    /// Reads `dim` at `row`, converting from the dimension's storage type to
    /// `T` with range-checked, round-to-even/`lround` conversion (equal
    /// types skip conversion entirely).
    pub fn get_field_as<T: FieldScalar>(&self, dim: DimensionId, row: usize) -> Result<T> {
        let detail = self.dim_detail(dim);
        let raw_id = self.index[row];
        let mut buf = vec![0u8; detail.datatype.size()];
        self.table.borrow().get_field(raw_id, detail.offset, detail.datatype.size(), &mut buf);

        if T::NATIVE == detail.datatype {
            return Ok(T::from_ne_bytes_exact(&buf));
        }

        let widened = read_as_f64(detail.datatype, &buf);
        T::narrow_from_f64(widened).ok_or_else(|| Error::ConversionRangeError {
            dim_name: dim.name(),
            source: detail.datatype,
            target_type: T::NATIVE,
            value: widened,
        })
    }

    /// Writes `value` at `dim`/`row`, converting from `T` to the dimension's
    /// storage type with the same conversion rule as [`Self::get_field_as`].
    pub fn set_field<T: FieldScalar>(&mut self, dim: DimensionId, row: usize, value: T) -> Result<()> {
        let detail = self.dim_detail(dim);
        let raw_id = self.index[row];

        let bytes = if T::NATIVE == detail.datatype {
            value.to_ne_bytes_vec()
        } else {
            let widened = value.widen_to_f64();
            write_from_f64(detail.datatype, widened).ok_or_else(|| Error::ConversionRangeError {
                dim_name: dim.name(),
                source: T::NATIVE,
                target_type: detail.datatype,
                value: widened,
            })?
        };

        self.table.borrow_mut().set_field(raw_id, detail.offset, detail.datatype.size(), &bytes);
        Ok(())
    }

    /// Reuses a row from the temp free list if any, else appends a scratch
    /// row past the committed size. Returns an id usable for comparison;
    /// release it with [`Self::free_temp`].
    pub fn temp_row(&mut self, src: PointId) -> usize {
        if let Some(reused) = self.temp_free_list.pop() {
            self.index[reused] = src;
            reused
        } else {
            let new_id = self.index.len();
            self.index.push(src);
            new_id
        }
    }

    pub fn free_temp(&mut self, id: usize) {
        self.temp_free_list.push(id);
    }

    /// For purely-streaming readers: asserts `index` is the identity mapping
    /// starting at the current offset, advances the offset, and drops all
    /// indices. Fails with [`Error::NonIdentityView`] if the mapping isn't
    /// 1:1.
    pub fn clear(&mut self) -> Result<()> {
        self.temp_free_list.clear();
        for &raw_id in &self.index {
            if raw_id != self.offset {
                return Err(Error::NonIdentityView);
            }
            self.offset += 1;
        }
        self.index.clear();
        self.committed_size = 0;
        Ok(())
    }

    /// Cumulated bounds of all committed points, read via `X`/`Y`(/`Z`).
    /// Fails with [`Error::MissingXyz`] if the required dimensions aren't in
    /// this view's layout.
    pub fn calculate_bounds(&self, is_3d: bool) -> Result<Bounds> {
        let table = self.table.borrow();
        let layout = table.layout();
        if !layout.has_dim(well_known::x()) {
            return Err(Error::MissingXyz("X"));
        }
        if !layout.has_dim(well_known::y()) {
            return Err(Error::MissingXyz("Y"));
        }
        if is_3d && !layout.has_dim(well_known::z()) {
            return Err(Error::MissingXyz("Z"));
        }
        drop(table);

        if is_3d {
            let mut bounds = Box3D::empty();
            for row in 0..self.committed_size {
                let x = self.get_field_as::<f64>(well_known::x(), row)?;
                let y = self.get_field_as::<f64>(well_known::y(), row)?;
                let z = self.get_field_as::<f64>(well_known::z(), row)?;
                bounds.grow(x, y, z);
            }
            Ok(Bounds::ThreeD(bounds))
        } else {
            let mut bounds = Box2D::empty();
            for row in 0..self.committed_size {
                let x = self.get_field_as::<f64>(well_known::x(), row)?;
                let y = self.get_field_as::<f64>(well_known::y(), row)?;
                bounds.grow(x, y);
            }
            Ok(Bounds::TwoD(bounds))
        }
    }
}
