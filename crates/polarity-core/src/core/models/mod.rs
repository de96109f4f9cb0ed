//! Plain data types shared by the parsers, the physics helpers and the workflows.
//!
//! Every type here is a value: parsers produce them, calculators consume them, and the
//! final [`record::MoleculeRecord`] is assembled once and never mutated afterwards.

pub mod atom;
pub mod dipole;
pub mod mesh;
pub mod record;
