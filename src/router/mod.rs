//! First-match path routing.
//!
//! A [`RouteTable`] is built once from an ordered list of patterns and handlers,
//! then [resolves](`RouteTable::resolve`) paths to the first structurally matching entry.

mod pattern;
mod table;

pub use pattern::{split_path, Params, PatternError, RoutePattern, Segment};
pub use table::{NoRoute, ReverseError, RouteEntry, RouteMatch, RouteTable, RouteTableBuilder, RouteTableError};
