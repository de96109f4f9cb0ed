//! High-level entry points that turn molecule names into JSON records.
//!
//! - [`generate`] drives the external tools for every molecule of a worklist and writes the
//!   per-molecule and aggregate datasets.
//! - [`assemble`] builds a record from tool outputs already on disk, and is also the final
//!   half of the generate pipeline.

pub mod assemble;
pub mod generate;
