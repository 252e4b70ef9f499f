use std::cell::Cell;

use crate::error::{Error, Result};
use crate::layout::{well_known, DataType, Dimension, DimensionId};

/// Details about one dimension as registered in a [`PointLayout`]: its
/// storage type and its byte offset within a packed record.
#[derive(Debug, Clone, Copy)]
pub struct DimensionDetail {
    pub datatype: DataType,
    pub offset: usize,
}

/// An ordered sequence of registered dimensions with a computed per-record
/// byte offset table and total `point_size`.
///
/// A `PointLayout` is immutable after the first row of its owning
/// [`crate::containers::RawPointTable`] is allocated (Invariant 4 of the
/// tiling engine: `point_size` and the offsets never change once a row
/// exists). The table sets [`PointLayout::freeze`] itself; callers never
/// need to call it directly.
#[derive(Debug, Default)]
pub struct PointLayout {
    dimensions: Vec<Dimension>,
    offsets: Vec<usize>,
    point_size: usize,
    frozen: Cell<bool>,
}

impl Clone for PointLayout {
    fn clone(&self) -> Self {
        Self {
            dimensions: self.dimensions.clone(),
            offsets: self.offsets.clone(),
            point_size: self.point_size,
            frozen: Cell::new(self.frozen.get()),
        }
    }
}

impl PointLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `dimension` if a dimension with the same name is not already
    /// registered. Duplicate registration is idempotent and does not change
    /// `point_size` (Testable property 6).
    pub fn register(&mut self, dimension: Dimension) -> Result<()> {
        if self.frozen.get() {
            return Err(Error::LayoutFrozen {
                name: dimension.name().to_string(),
            });
        }
        if self.get_by_name(dimension.name()).is_some() {
            return Ok(());
        }
        self.offsets.push(self.point_size);
        self.point_size += dimension.datatype().size();
        self.dimensions.push(dimension);
        Ok(())
    }

    /// Marks this layout as frozen; further `register` calls fail with
    /// [`Error::LayoutFrozen`]. Called once by the owning `RawPointTable`
    /// when its first row is allocated.
    pub(crate) fn freeze(&self) {
        self.frozen.set(true);
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.get()
    }

    pub fn point_size(&self) -> usize {
        self.point_size
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.name() == name)
    }

    pub fn get_by_id(&self, id: DimensionId) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.id() == id)
    }

    pub fn has_dim(&self, id: DimensionId) -> bool {
        self.get_by_id(id).is_some()
    }

    /// Storage type and byte offset for `id`, or `None` if not registered.
    pub fn dim_detail(&self, id: DimensionId) -> Option<DimensionDetail> {
        let index = self.dimensions.iter().position(|d| d.id() == id)?;
        Some(DimensionDetail {
            datatype: self.dimensions[index].datatype(),
            offset: self.offsets[index],
        })
    }

    /// True if `X`, `Y` and `Z` are all registered, which the tiler stage
    /// requires before it can enter its `Prepared` state.
    pub fn has_xyz(&self) -> bool {
        self.has_dim(well_known::x()) && self.has_dim(well_known::y()) && self.has_dim(well_known::z())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idempotent_registration_does_not_grow_point_size() {
        let mut layout = PointLayout::new();
        layout.register(Dimension::new("X", DataType::F64)).unwrap();
        let size_after_first = layout.point_size();
        layout.register(Dimension::new("X", DataType::F64)).unwrap();
        assert_eq!(layout.point_size(), size_after_first);
        assert_eq!(layout.dimensions().len(), 1);
    }

    #[test]
    fn registering_on_frozen_layout_fails() {
        let mut layout = PointLayout::new();
        layout.register(Dimension::new("X", DataType::F64)).unwrap();
        layout.freeze();
        let err = layout.register(Dimension::new("Y", DataType::F64));
        assert!(matches!(err, Err(Error::LayoutFrozen { .. })));
    }

    #[test]
    fn offsets_are_cumulative_sizes() {
        let mut layout = PointLayout::new();
        layout.register(Dimension::new("X", DataType::F64)).unwrap();
        layout.register(Dimension::new("Intensity", DataType::U16)).unwrap();
        assert_eq!(layout.dim_detail(layout.get_by_name("X").unwrap().id()).unwrap().offset, 0);
        assert_eq!(
            layout
                .dim_detail(layout.get_by_name("Intensity").unwrap().id())
                .unwrap()
                .offset,
            8
        );
        assert_eq!(layout.point_size(), 10);
    }
}
