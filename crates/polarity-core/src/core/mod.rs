//! # Core Module
//!
//! The stateless foundation of the pipeline. Nothing in this module touches the filesystem
//! except the thin `read_*` conveniences in [`io`]; every parser operates on text and every
//! calculator on plain values.
//!
//! - **Data Models** ([`models`]) - Atoms, bonds, dipoles, surface meshes and molecule records
//! - **File Formats** ([`io`]) - XYZ, SDF V2000, Psi4 output, Gaussian cube and MSMS files
//! - **Physics** ([`physics`]) - Unit constants, bond dipoles and Van-der-Waals radii
//! - **Volumetric Fields** ([`field`]) - Grid-backed scalar fields with trilinear sampling

pub mod field;
pub mod io;
pub mod models;
pub mod physics;
