//! Little-endian scalar encoding shared by the file-tree and SQLite patch
//! formats, and the per-dimension summary statistics both `header.json` and
//! the `Dimensions` table carry.
//!
//! Point storage in `geotile-core` is native-endian (it never leaves
//! memory); every persisted byte stream is little-endian regardless of host
//! architecture, so every value is decoded out of its native encoding and
//! re-encoded explicitly here rather than written as a raw `memcpy`.

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use geotile_core::containers::RawPointTable;
use geotile_core::layout::{read_as_f64, DataType, Dimension};

/// Appends `native` (exactly `datatype.size()` bytes, host endian, as
/// returned by `PointView::get_raw`) to `out` as little-endian.
pub fn encode_value_le(datatype: DataType, native: &[u8], out: &mut Vec<u8>) {
    match datatype {
        DataType::F32 => out
            .write_f32::<LittleEndian>(f32::from_ne_bytes(native.try_into().unwrap()))
            .unwrap(),
        DataType::F64 => out
            .write_f64::<LittleEndian>(f64::from_ne_bytes(native.try_into().unwrap()))
            .unwrap(),
        DataType::I8 => out.write_i8(i8::from_ne_bytes(native.try_into().unwrap())).unwrap(),
        DataType::U8 => out.write_u8(native[0]).unwrap(),
        DataType::I16 => out
            .write_i16::<LittleEndian>(i16::from_ne_bytes(native.try_into().unwrap()))
            .unwrap(),
        DataType::U16 => out
            .write_u16::<LittleEndian>(u16::from_ne_bytes(native.try_into().unwrap()))
            .unwrap(),
        DataType::I32 => out
            .write_i32::<LittleEndian>(i32::from_ne_bytes(native.try_into().unwrap()))
            .unwrap(),
        DataType::U32 => out
            .write_u32::<LittleEndian>(u32::from_ne_bytes(native.try_into().unwrap()))
            .unwrap(),
        DataType::I64 => out
            .write_i64::<LittleEndian>(i64::from_ne_bytes(native.try_into().unwrap()))
            .unwrap(),
        DataType::U64 => out
            .write_u64::<LittleEndian>(u64::from_ne_bytes(native.try_into().unwrap()))
            .unwrap(),
    }
}

/// Inverse of [`encode_value_le`]: decodes `le` (exactly `datatype.size()`
/// little-endian bytes) back into host-endian bytes for `PointView::set_raw`.
pub fn decode_value_le(datatype: DataType, le: &[u8]) -> Vec<u8> {
    let mut cursor = Cursor::new(le);
    match datatype {
        DataType::F32 => cursor.read_f32::<LittleEndian>().unwrap().to_ne_bytes().to_vec(),
        DataType::F64 => cursor.read_f64::<LittleEndian>().unwrap().to_ne_bytes().to_vec(),
        DataType::I8 => cursor.read_i8().unwrap().to_ne_bytes().to_vec(),
        DataType::U8 => cursor.read_u8().unwrap().to_ne_bytes().to_vec(),
        DataType::I16 => cursor.read_i16::<LittleEndian>().unwrap().to_ne_bytes().to_vec(),
        DataType::U16 => cursor.read_u16::<LittleEndian>().unwrap().to_ne_bytes().to_vec(),
        DataType::I32 => cursor.read_i32::<LittleEndian>().unwrap().to_ne_bytes().to_vec(),
        DataType::U32 => cursor.read_u32::<LittleEndian>().unwrap().to_ne_bytes().to_vec(),
        DataType::I64 => cursor.read_i64::<LittleEndian>().unwrap().to_ne_bytes().to_vec(),
        DataType::U64 => cursor.read_u64::<LittleEndian>().unwrap().to_ne_bytes().to_vec(),
    }
}

/// `(minimum, mean, maximum)` of one dimension's values across every row in
/// `table`, the statistics recorded in `header.json` and the `Dimensions`
/// table. Computed directly off the raw arena rather than through any
/// single `PointView`, since a point appears in several emitted views (once
/// per ancestor the cascade kept it at) but each row in the backing table
/// exists exactly once.
pub fn dimension_stats(table: &RawPointTable, dim: &Dimension) -> (f64, f64, f64) {
    let detail = table
        .layout()
        .dim_detail(dim.id())
        .expect("dimension_stats called with a dimension not in this table's layout");

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    let mut buf = vec![0u8; detail.datatype.size()];

    for id in 0..table.len() {
        table.get_field(id, detail.offset, detail.datatype.size(), &mut buf);
        let value = read_as_f64(detail.datatype, &buf);
        min = min.min(value);
        max = max.max(value);
        sum += value;
    }

    let mean = if table.is_empty() { 0.0 } else { sum / table.len() as f64 };
    (min, mean, max)
}
