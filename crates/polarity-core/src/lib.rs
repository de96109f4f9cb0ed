//! # Molecule Polarity Data Library
//!
//! An offline pipeline that turns molecule structure files into the data set consumed by the
//! Molecule Polarity simulation: atoms and bonds, Mulliken-charge bond dipoles, the molecular
//! dipole, and a solvent-excluded surface annotated with electrostatic potential and electron
//! density samples.
//!
//! ## Architectural Philosophy
//!
//! The library keeps the same three-layer split throughout:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Atom`, `MoleculeRecord`), pure text
//!   parsers for every file format the pipeline touches, the physics helpers (bond dipoles,
//!   Van-der-Waals radii) and the `ScalarField` sampler.
//!
//! - **[`engine`]: The Machinery.** Pipeline configuration, the error taxonomy, progress
//!   reporting, the scoped scratch directory and the `ToolRunner` abstraction over external
//!   programs.
//!
//! - **[`workflows`]: The Public API.** Drives the per-molecule stages in order and runs the
//!   batch over the configured worklist, persisting per-molecule and aggregate JSON output.

pub mod core;
pub mod engine;
pub mod workflows;
