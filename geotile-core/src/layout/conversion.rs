//! Safe, range-checked numeric conversion between a dimension's storage
//! [`DataType`] and the concrete Rust type a caller reads or writes.
//!
//! Mirrors the `layout::conversion` module of the teacher crate, which
//! dispatches a generic numeric operation over a closed type tag instead of
//! repeating a hand-written switch at every call site (spec.md §9): here the
//! tag is [`DataType`] and the generic operation is "narrow an `f64` into a
//! concrete numeric type, or widen a concrete numeric type into `f64`".
//!
//! Whichever side of a conversion is the *destination* representation
//! decides the rounding rule: narrowing into a floating-point destination
//! rounds to the nearest representable value (ties to even, the same
//! behaviour as a plain `as` cast between float widths); narrowing into an
//! integer destination rounds to the nearest integer away from zero
//! (`f64::round`, equivalent to C's `lround`) and then range-checks before
//! converting.

use crate::layout::DataType;

/// Implemented for every concrete numeric type that can back a dimension.
pub trait FieldScalar: Copy + 'static {
    /// The storage type this Rust type corresponds to when types match exactly.
    const NATIVE: DataType;

    fn widen_to_f64(self) -> f64;

    /// Narrow `value` into `Self`, per the rounding/range-check rule above.
    /// Returns `None` on overflow.
    fn narrow_from_f64(value: f64) -> Option<Self>;

    /// Reinterprets `bytes` (exactly `Self::NATIVE.size()` long, native
    /// endian) as `Self` with no conversion. Used on the equal-type fast
    /// path, which Testable property 1 requires to be exact.
    fn from_ne_bytes_exact(bytes: &[u8]) -> Self;

    /// The native-endian byte encoding of `self`.
    fn to_ne_bytes_vec(self) -> Vec<u8>;
}

macro_rules! impl_field_scalar_int {
    ($ty:ty, $datatype:expr) => {
        impl FieldScalar for $ty {
            const NATIVE: DataType = $datatype;

            fn widen_to_f64(self) -> f64 {
                self as f64
            }

            fn narrow_from_f64(value: f64) -> Option<Self> {
                let rounded = value.round();
                if rounded < <$ty>::MIN as f64 || rounded > <$ty>::MAX as f64 || rounded.is_nan() {
                    None
                } else {
                    Some(rounded as $ty)
                }
            }

            fn from_ne_bytes_exact(bytes: &[u8]) -> Self {
                let mut buf = [0u8; std::mem::size_of::<$ty>()];
                buf.copy_from_slice(bytes);
                <$ty>::from_ne_bytes(buf)
            }

            fn to_ne_bytes_vec(self) -> Vec<u8> {
                self.to_ne_bytes().to_vec()
            }
        }
    };
}

macro_rules! impl_field_scalar_float {
    ($ty:ty, $datatype:expr) => {
        impl FieldScalar for $ty {
            const NATIVE: DataType = $datatype;

            fn widen_to_f64(self) -> f64 {
                self as f64
            }

            fn narrow_from_f64(value: f64) -> Option<Self> {
                let narrowed = value as $ty;
                if narrowed.is_infinite() && !value.is_infinite() {
                    None
                } else {
                    Some(narrowed)
                }
            }

            fn from_ne_bytes_exact(bytes: &[u8]) -> Self {
                let mut buf = [0u8; std::mem::size_of::<$ty>()];
                buf.copy_from_slice(bytes);
                <$ty>::from_ne_bytes(buf)
            }

            fn to_ne_bytes_vec(self) -> Vec<u8> {
                self.to_ne_bytes().to_vec()
            }
        }
    };
}

impl_field_scalar_float!(f32, DataType::F32);
impl_field_scalar_float!(f64, DataType::F64);
impl_field_scalar_int!(i8, DataType::I8);
impl_field_scalar_int!(i16, DataType::I16);
impl_field_scalar_int!(i32, DataType::I32);
impl_field_scalar_int!(i64, DataType::I64);
impl_field_scalar_int!(u8, DataType::U8);
impl_field_scalar_int!(u16, DataType::U16);
impl_field_scalar_int!(u32, DataType::U32);
impl_field_scalar_int!(u64, DataType::U64);

/// Reads a raw, native-endian encoded value of `datatype` out of `bytes` and
/// widens it to `f64`. `bytes` must be exactly `datatype.size()` long.
pub fn read_as_f64(datatype: DataType, bytes: &[u8]) -> f64 {
    macro_rules! read {
        ($ty:ty) => {{
            let mut buf = [0u8; std::mem::size_of::<$ty>()];
            buf.copy_from_slice(bytes);
            <$ty>::from_ne_bytes(buf) as f64
        }};
    }
    match datatype {
        DataType::F32 => read!(f32),
        DataType::F64 => read!(f64),
        DataType::I8 => read!(i8),
        DataType::I16 => read!(i16),
        DataType::I32 => read!(i32),
        DataType::I64 => read!(i64),
        DataType::U8 => read!(u8),
        DataType::U16 => read!(u16),
        DataType::U32 => read!(u32),
        DataType::U64 => read!(u64),
    }
}

/// Narrows `value` into a raw, native-endian encoding of `datatype`, per the
/// same rounding rule as [`FieldScalar::narrow_from_f64`]. Returns `None` on
/// overflow.
pub fn write_from_f64(datatype: DataType, value: f64) -> Option<Vec<u8>> {
    macro_rules! write_int {
        ($ty:ty) => {{
            let rounded = value.round();
            if rounded < <$ty>::MIN as f64 || rounded > <$ty>::MAX as f64 || rounded.is_nan() {
                None
            } else {
                Some((rounded as $ty).to_ne_bytes().to_vec())
            }
        }};
    }
    match datatype {
        DataType::F32 => {
            let narrowed = value as f32;
            if narrowed.is_infinite() && !value.is_infinite() {
                None
            } else {
                Some(narrowed.to_ne_bytes().to_vec())
            }
        }
        DataType::F64 => Some(value.to_ne_bytes().to_vec()),
        DataType::I8 => write_int!(i8),
        DataType::I16 => write_int!(i16),
        DataType::I32 => write_int!(i32),
        DataType::I64 => write_int!(i64),
        DataType::U8 => write_int!(u8),
        DataType::U16 => write_int!(u16),
        DataType::U32 => write_int!(u32),
        DataType::U64 => write_int!(u64),
    }
}
