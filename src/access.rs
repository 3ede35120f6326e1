//! Access layer for typed SQL values.
//!
//! - **ValueType**: the closed set of SQL scalar types and their wire codes
//! - **Value**: one datum of a given type, including typed NULL
//!
//! Values are what expression trees produce and consume. The comparison
//! contract lives here so every evaluation path orders values the same way.

pub mod value;

pub use value::{Value, ValueType};
