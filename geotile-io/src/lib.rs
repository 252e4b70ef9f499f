//! Persistence for a finished tile set: a directory tree of binary patches
//! plus a `header.json`, or a single SQLite database (spec.md §6).
//!
//! Both formats share the little-endian scalar codec and summary-statistics
//! computation in [`codec`]; everything else is specific to one format.

mod codec;
mod error;
pub mod filetree;
pub mod sqlite;

pub use error::{Error, Result};
