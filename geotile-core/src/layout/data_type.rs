use std::fmt;

/// The storage type of a single dimension's value.
///
/// This is a closed sum type rather than a trait object: every accessor in
/// [`crate::containers::point_view::PointView`] dispatches on it once
/// instead of repeating a hand-written switch per call site (see
/// [`crate::layout::conversion`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    F32,
    F64,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
}

impl DataType {
    /// Size in bytes of one value of this type.
    pub fn size(self) -> usize {
        match self {
            DataType::F32 => 4,
            DataType::F64 => 8,
            DataType::I8 => 1,
            DataType::I16 => 2,
            DataType::I32 => 4,
            DataType::I64 => 8,
            DataType::U8 => 1,
            DataType::U16 => 2,
            DataType::U32 => 4,
            DataType::U64 => 8,
        }
    }

    /// True if this type is an integer type (as opposed to a floating-point type).
    pub fn is_integer(self) -> bool {
        !matches!(self, DataType::F32 | DataType::F64)
    }

    /// Parses the name produced by this type's `Display` impl, the inverse
    /// used when reading a `header.json` back in.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "float" => DataType::F32,
            "double" => DataType::F64,
            "int8" => DataType::I8,
            "int16" => DataType::I16,
            "int32" => DataType::I32,
            "int64" => DataType::I64,
            "uint8" => DataType::U8,
            "uint16" => DataType::U16,
            "uint32" => DataType::U32,
            "uint64" => DataType::U64,
            _ => return None,
        })
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::F32 => "float",
            DataType::F64 => "double",
            DataType::I8 => "int8",
            DataType::I16 => "int16",
            DataType::I32 => "int32",
            DataType::I64 => "int64",
            DataType::U8 => "uint8",
            DataType::U16 => "uint16",
            DataType::U32 => "uint32",
            DataType::U64 => "uint64",
        };
        write!(f, "{name}")
    }
}
