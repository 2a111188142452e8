//! Domain model types for tours and properties.
//!
//! Every record that crosses the repository boundary is a typed struct with
//! named fields; the JSON wire format and the database rows are mapped to
//! and from these types at the edges.

pub mod property;
pub mod tour;

pub use property::*;
pub use tour::*;
