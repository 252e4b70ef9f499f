use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use super::DataType;

/// A stable, interned handle to a dimension name.
///
/// `DimensionId`s are handed out from a process-wide intern table keyed by
/// name, so two [`super::PointLayout`]s built independently (for instance in
/// different threads, or one read back from a `header.json`) agree on the id
/// for a dimension with the same name. This is the open-ended alternative to
/// a fixed `Dimension::Id` enum: user-defined dimensions get the same
/// stability guarantee as the builtins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DimensionId(u32);

struct Intern {
    by_name: HashMap<String, DimensionId>,
    names: Vec<String>,
}

fn intern_table() -> &'static Mutex<Intern> {
    static TABLE: OnceLock<Mutex<Intern>> = OnceLock::new();
    TABLE.get_or_init(|| {
        Mutex::new(Intern {
            by_name: HashMap::new(),
            names: Vec::new(),
        })
    })
}

impl DimensionId {
    /// Interns `name`, returning the same id on every call with an equal name.
    pub fn intern(name: &str) -> Self {
        let mut table = intern_table().lock().expect("dimension intern table poisoned");
        if let Some(id) = table.by_name.get(name) {
            return *id;
        }
        let id = DimensionId(table.names.len() as u32);
        table.names.push(name.to_string());
        table.by_name.insert(name.to_string(), id);
        id
    }

    /// Returns the interned name for this id.
    pub fn name(self) -> String {
        let table = intern_table().lock().expect("dimension intern table poisoned");
        table.names[self.0 as usize].clone()
    }
}

/// One registered dimension: a stable id, its display name, storage type and
/// an optional (scale, offset) pair used only by readers/writers that need
/// to map stored integers back to physical units.
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    id: DimensionId,
    name: String,
    datatype: DataType,
    scale_offset: Option<(f64, f64)>,
}

impl Dimension {
    pub fn new(name: &str, datatype: DataType) -> Self {
        Self {
            id: DimensionId::intern(name),
            name: name.to_string(),
            datatype,
            scale_offset: None,
        }
    }

    pub fn with_scale_offset(mut self, scale: f64, offset: f64) -> Self {
        self.scale_offset = Some((scale, offset));
        self
    }

    pub fn id(&self) -> DimensionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn datatype(&self) -> DataType {
        self.datatype
    }

    pub fn scale_offset(&self) -> Option<(f64, f64)> {
        self.scale_offset
    }
}

/// The mandatory dimensions every tiler input layout must carry.
pub mod well_known {
    use super::DimensionId;
    use std::sync::OnceLock;

    pub fn x() -> DimensionId {
        static ID: OnceLock<DimensionId> = OnceLock::new();
        *ID.get_or_init(|| DimensionId::intern("X"))
    }

    pub fn y() -> DimensionId {
        static ID: OnceLock<DimensionId> = OnceLock::new();
        *ID.get_or_init(|| DimensionId::intern("Y"))
    }

    pub fn z() -> DimensionId {
        static ID: OnceLock<DimensionId> = OnceLock::new();
        *ID.get_or_init(|| DimensionId::intern("Z"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_stable_across_calls() {
        let a = DimensionId::intern("Intensity");
        let b = DimensionId::intern("Intensity");
        assert_eq!(a, b);
        assert_eq!(a.name(), "Intensity");
    }

    #[test]
    fn distinct_names_get_distinct_ids() {
        let a = DimensionId::intern("Classification");
        let b = DimensionId::intern("GpsTime");
        assert_ne!(a, b);
    }
}
